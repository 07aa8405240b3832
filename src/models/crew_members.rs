use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CrewMemberRow {
    pub name: String,
    pub role: Option<String>,
    pub event_id: Option<i64>,
    pub img_url: Option<String>,
    pub linkedin: Option<String>,
    pub insta: Option<String>,
    pub github: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    100
}
