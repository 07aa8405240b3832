use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ParticipantRow {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub dept: Option<String>,
    pub college_roll: Option<String>,
    pub contact_no: Option<String>,
    pub year: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl ParticipantRow {
    /// First whitespace-separated part of the name, used to address mail.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
