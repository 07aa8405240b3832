use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use super::id_from_number_or_string;
use crate::error::{AppError, AppResult};
use crate::services::team_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamBody {
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub event_id: Option<i64>,
    pub team_name: Option<String>,
}

pub async fn create_team_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateTeamBody>,
) -> AppResult<impl IntoResponse> {
    let (Some(event_id), Some(team_name)) = (body.event_id, body.team_name.as_deref()) else {
        return Err(AppError::validation("Event ID and team name are required"));
    };

    let _write = state.write_gate.lock().await;
    let team_id = team_service::create_team(&state.pool, event_id, team_name).await?;
    Ok(Json(json!({ "success": true, "team_id": team_id })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteTeamBody {
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub event_id: Option<i64>,
}

pub async fn delete_team_handler(
    State(state): State<AppState>,
    Json(body): Json<DeleteTeamBody>,
) -> AppResult<impl IntoResponse> {
    let team_name = body.team_name.as_deref().unwrap_or_default();

    let _write = state.write_gate.lock().await;
    team_service::delete_team(&state.pool, team_name, body.event_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Team deleted successfully",
    })))
}

pub async fn crew_handler(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let crew = team_service::list_crew(&state.pool).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Members data fetched successfully",
        "data": crew,
    })))
}
