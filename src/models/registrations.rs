use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserEventNameRow {
    pub event_id: i64,
    pub name: String,
}
