use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamRow {
    pub team_id: i64,
    pub event_id: i64,
    pub team_name: String,
}

// One row per (team, member); the profile page groups them by team_name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserTeamRow {
    pub team_id: i64,
    pub team_name: String,
    pub event_id: i64,
    pub name: String,
    pub member_name: String,
    pub college_roll: Option<String>,
    pub is_current_user: bool,
}
