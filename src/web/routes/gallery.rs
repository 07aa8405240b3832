use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::AppResult;
use crate::services::gallery_service;
use crate::state::AppState;

pub async fn gallery_year_handler(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> AppResult<impl IntoResponse> {
    let images = gallery_service::list_year_images(&state.storage, &year).await?;
    Ok(Json(json!({ "images": images })))
}
