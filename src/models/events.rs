use serde::{Deserialize, Serialize};

// Events are managed out-of-band (seed binary); the API only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRow {
    pub event_id: i64,
    pub name: String,
    // The frontend reads this field as `catagory`.
    #[serde(rename = "catagory", alias = "category")]
    pub category: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: Option<String>,
    #[serde(default)]
    pub is_team_event: bool,
    pub min_team_size: Option<i64>,
    pub max_team_size: Option<i64>,
    pub rules: Option<String>,
    pub details: Option<String>,
    pub coordinator_names: Option<String>,
    pub contact_no: Option<String>,
    pub event_img_url: Option<String>,
    pub grp_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventDetailsRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: EventRow,
    pub registration_count: i64,
    pub team_count: i64,
}
