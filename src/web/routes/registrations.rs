use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::id_from_number_or_string;
use crate::error::{AppError, AppResult};
use crate::services::participant_service;
use crate::services::registration_service::{self, RegistrationRequest};
use crate::state::AppState;
use crate::web::middleware::auth::Session;

#[derive(Debug, Deserialize)]
pub struct TeamMemberBody {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationBody {
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub event_id: Option<i64>,
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMemberBody>,
}

impl RegistrationBody {
    fn into_request(self) -> AppResult<RegistrationRequest> {
        let user_id = self.user_id.filter(|u| !u.trim().is_empty());
        let (Some(user_id), Some(event_id)) = (user_id, self.event_id) else {
            return Err(AppError::validation("Missing required fields"));
        };

        Ok(RegistrationRequest {
            user_id,
            event_id,
            team_id: self.team_id,
            team_name: self.team_name,
            team_members: self
                .team_members
                .into_iter()
                .map(|m| m.email.unwrap_or_default())
                .collect(),
        })
    }
}

pub async fn registration_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<RegistrationBody>,
) -> AppResult<impl IntoResponse> {
    let request = body.into_request()?;

    let principal =
        participant_service::load_participant_by_id(&state.pool, &request.user_id).await?;
    if !session.owns_email(&principal.email) {
        return Err(AppError::Forbidden);
    }

    let outcome = {
        let _write = state.write_gate.lock().await;
        registration_service::write_registration(&state.pool, &request).await?
    };
    let email_sent = registration_service::confirm_by_mail(
        &state.pool,
        state.mailer.as_ref(),
        &state.config.mail.from,
        &request,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "registration_id": outcome.registration_id,
            "team_id": outcome.team_id,
            "email_sent": email_sent,
        })),
    ))
}
