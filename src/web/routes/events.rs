use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::services::event_service;
use crate::state::AppState;

pub async fn all_events_handler(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let events = event_service::list_events(&state.pool).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Events data fetched successfully",
        "data": events,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EventDetailsQuery {
    pub event_id: Option<String>,
}

pub async fn event_details_handler(
    State(state): State<AppState>,
    Query(query): Query<EventDetailsQuery>,
) -> AppResult<impl IntoResponse> {
    let event_id = event_service::parse_event_id(query.event_id.as_deref())?;
    let details = event_service::load_event_details(&state.pool, event_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Event details fetched successfully",
        "data": details,
    })))
}
