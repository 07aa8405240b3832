use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::services::participant_service::{self, ImageUpload, ProfileForm};
use crate::state::AppState;
use crate::web::middleware::auth::Session;

#[derive(Debug, Deserialize)]
pub struct IdentityProfile {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddUserBody {
    pub user: Option<IdentityProfile>,
}

pub async fn add_user_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AddUserBody>,
) -> AppResult<impl IntoResponse> {
    let Some(IdentityProfile {
        email: Some(email),
        name: Some(name),
    }) = body.user
    else {
        return Err(AppError::validation("User data missing"));
    };
    if !session.owns_email(&email) {
        return Err(AppError::Forbidden);
    }

    let outcome = {
        let _write = state.write_gate.lock().await;
        participant_service::add_user(
            &state.pool,
            &state.config.college_email_domain,
            &name,
            &email,
        )
        .await?
    };

    let message = if outcome.created {
        "Data inserted successfully"
    } else {
        "User already exists"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "created": outcome.created,
        "data": outcome.participant,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ParticipantQuery {
    pub email: Option<String>,
}

pub async fn participant_details_handler(
    State(state): State<AppState>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<impl IntoResponse> {
    let email = query.email.unwrap_or_default();
    let participant = participant_service::load_participant(&state.pool, &email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Data fetched successfully",
        "data": participant,
    })))
}

// A body cut off by the request limit is an oversized image, not a bad form.
fn form_error(err: MultipartError, max_image_bytes: usize, message: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            limit: max_image_bytes,
        };
    }
    warn!("Malformed profile form: {}", err);
    AppError::validation(message)
}

async fn read_profile_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> AppResult<ProfileForm> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, max_image_bytes, "Malformed form data"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| form_error(e, max_image_bytes, "Could not read image"))?;
            if !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| form_error(e, max_image_bytes, "Malformed form data"))?;
        match name.as_str() {
            "email" => form.email = value,
            "phone" => form.phone = Some(value),
            "name" => form.name = Some(value),
            "department" => form.department = Some(value),
            "classRoll" => form.class_roll = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_profile_form(multipart, state.config.max_image_bytes).await?;
    if form.email.trim().is_empty() {
        return Err(AppError::validation("User email is required"));
    }
    if !session.owns_email(&form.email) {
        return Err(AppError::Forbidden);
    }

    let updated = participant_service::update_profile(
        &state.pool,
        &state.storage,
        state.config.max_image_bytes,
        form,
    )
    .await?;

    let message = if updated {
        "Profile updated successfully"
    } else {
        "Nothing to update"
    };
    Ok(Json(json!({ "success": true, "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct UserUuidQuery {
    pub user_uuid: Option<String>,
}

pub async fn user_event_names_handler(
    State(state): State<AppState>,
    Query(query): Query<UserUuidQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = query.user_uuid.unwrap_or_default();
    let events = participant_service::list_user_event_names(&state.pool, &user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Data fetched successfully",
        "data": events,
    })))
}

pub async fn user_teams_handler(
    State(state): State<AppState>,
    Query(query): Query<UserUuidQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = query.user_uuid.unwrap_or_default();
    let teams = participant_service::list_user_teams(&state.pool, &user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Team details fetched successfully",
        "data": teams,
    })))
}
