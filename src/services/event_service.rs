use sqlx::SqlitePool;

use crate::database::event_repo;
use crate::error::{AppError, AppResult};
use crate::models::{EventDetailsRow, EventRow};

pub async fn list_events(pool: &SqlitePool) -> AppResult<Vec<EventRow>> {
    Ok(event_repo::list_events(pool).await?)
}

pub fn parse_event_id(raw: Option<&str>) -> AppResult<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Event ID is required"))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::validation("Event ID must be a number"))
}

pub async fn load_event_details(pool: &SqlitePool, event_id: i64) -> AppResult<EventDetailsRow> {
    event_repo::load_event_details(pool, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))
}
