use std::collections::{HashMap, HashSet};

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::database::{event_repo, participant_repo, registration_repo, team_repo};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{EventRow, ParticipantRow};
use crate::services::mail_service::{self, Mailer};

const ALREADY_REGISTERED: &str = "You are already registered for this event!";

#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub user_id: String,
    pub event_id: i64,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub team_members: Vec<String>,
}

impl RegistrationRequest {
    fn new_team_name(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn has_team_payload(&self) -> bool {
        self.team_id.is_some()
            || self.new_team_name().is_some()
            || self.team_members.iter().any(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommittedRegistration {
    pub registration_id: i64,
    pub team_id: Option<i64>,
}

/// All checks and inserts share one transaction; the unique constraints on
/// `registrations(user_id, event_id)` and `team_members(event_id, user_id)`
/// turn a lost race into `AlreadyRegistered`.
pub async fn write_registration(
    pool: &SqlitePool,
    request: &RegistrationRequest,
) -> AppResult<CommittedRegistration> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::validation("Missing required fields"));
    }

    let mut tx = pool.begin().await?;

    let principal = participant_repo::find_by_id(&mut *tx, request.user_id.trim())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let event = event_repo::find_event(&mut *tx, request.event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let members = if event.is_team_event {
        if request.team_id.is_none() && request.new_team_name().is_none() {
            return Err(AppError::validation(
                "Team details are required for this event",
            ));
        }
        let members = resolve_members(&mut *tx, &principal, &request.team_members).await?;
        check_team_size(&event, members.len() + 1)?;
        members
    } else {
        if request.has_team_payload() {
            return Err(AppError::validation(
                "This event does not take team registrations",
            ));
        }
        Vec::new()
    };

    for member in &members {
        if registration_repo::is_engaged_in_event(&mut *tx, &member.user_id, event.event_id).await?
        {
            return Err(AppError::AlreadyRegistered(format!(
                "Team member {} is already registered for this event!",
                member.email
            )));
        }
    }
    if registration_repo::is_engaged_in_event(&mut *tx, &principal.user_id, event.event_id).await?
    {
        return Err(AppError::AlreadyRegistered(ALREADY_REGISTERED.to_string()));
    }

    let team_id = match (request.team_id, request.new_team_name()) {
        (Some(team_id), _) => {
            let team = team_repo::find_team(&mut *tx, team_id)
                .await?
                .ok_or_else(|| AppError::not_found("Team not found"))?;
            if team.event_id != event.event_id {
                return Err(AppError::validation("Team does not belong to this event"));
            }
            // A team carries exactly one registration; its roster is fixed by it.
            if team_repo::count_team_registrations(&mut *tx, team.team_id).await? > 0 {
                return Err(AppError::AlreadyRegistered(
                    "This team is already registered for this event!".to_string(),
                ));
            }
            Some(team.team_id)
        }
        (None, Some(team_name)) if event.is_team_event => Some(
            team_repo::insert_team(&mut *tx, event.event_id, team_name)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::validation("Team name already taken for this event")
                    } else {
                        AppError::Database(e)
                    }
                })?,
        ),
        _ => None,
    };

    let registration_id =
        registration_repo::insert_registration(&mut *tx, &principal.user_id, event.event_id, team_id)
            .await
            .map_err(|e| duplicate_or_database(e, ALREADY_REGISTERED))?;

    if let Some(team_id) = team_id {
        let leader = TeamMember {
            user_id: principal.user_id.clone(),
            email: principal.email.clone(),
        };
        for member in members.iter().chain(std::iter::once(&leader)) {
            let inserted = team_repo::insert_team_member(
                &mut *tx,
                team_id,
                event.event_id,
                &member.user_id,
            )
            .await;

            if let Err(e) = inserted {
                warn!(
                    "Team member insert failed for team {}; rolling back registration {}: {}",
                    team_id, registration_id, e
                );
                tx.rollback().await?;
                return Err(duplicate_or_database(
                    e,
                    "A team member is already registered for this event!",
                ));
            }
        }
    }

    tx.commit().await?;
    info!(
        "Registration {} stored for user {} on event {}",
        registration_id, principal.user_id, event.event_id
    );

    Ok(CommittedRegistration {
        registration_id,
        team_id,
    })
}

fn duplicate_or_database(err: sqlx::Error, message: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::AlreadyRegistered(message.to_string())
    } else {
        AppError::Database(err)
    }
}

fn check_team_size(event: &EventRow, size: usize) -> AppResult<()> {
    let size = size as i64;
    if let Some(min) = event.min_team_size.filter(|min| size < *min) {
        return Err(AppError::validation(format!(
            "This event needs at least {} participants per team",
            min
        )));
    }
    if let Some(max) = event.max_team_size.filter(|max| size > *max) {
        return Err(AppError::validation(format!(
            "This event allows at most {} participants per team",
            max
        )));
    }
    Ok(())
}

async fn resolve_members(
    conn: &mut SqliteConnection,
    principal: &ParticipantRow,
    submitted: &[String],
) -> AppResult<Vec<TeamMember>> {
    let emails: Vec<String> = submitted
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();

    let known: HashMap<String, String> = participant_repo::find_ids_by_emails(&mut *conn, &emails)
        .await?
        .into_iter()
        .map(|row| (row.email.to_lowercase(), row.user_id))
        .collect();

    match_members(&principal.user_id, submitted, &known)
}

/// Maps submitted emails to participant ids. Blank entries are skipped but
/// still count towards the member number (the leader is member 1), so error
/// messages line up with the form fields.
pub fn match_members(
    principal_id: &str,
    submitted: &[String],
    known: &HashMap<String, String>,
) -> AppResult<Vec<TeamMember>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut members = Vec::new();

    for (offset, raw) in submitted.iter().enumerate() {
        let email = raw.trim();
        if email.is_empty() {
            continue;
        }
        let Some(user_id) = known.get(&email.to_lowercase()) else {
            return Err(AppError::validation(format!(
                "Member {} ({}) is not registered!",
                offset + 2,
                email
            )));
        };
        if user_id == principal_id || !seen.insert(user_id.as_str()) {
            continue;
        }
        members.push(TeamMember {
            user_id: user_id.clone(),
            email: email.to_string(),
        });
    }

    Ok(members)
}

/// Mails the confirmation using rows read after the registration committed.
/// Failures are logged and reported as `false`; the registration stands.
pub async fn confirm_by_mail(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    mail_from: &str,
    request: &RegistrationRequest,
) -> bool {
    let user_id = request.user_id.trim();
    let event_id = request.event_id;
    let rows = tokio::try_join!(
        participant_repo::find_by_id(pool, user_id),
        event_repo::find_event(pool, event_id)
    );
    let (participant, event) = match rows {
        Ok((Some(participant), Some(event))) => (participant, event),
        Ok(_) => {
            warn!(
                "Confirmation skipped: user {} or event {} vanished after commit",
                user_id, event_id
            );
            return false;
        }
        Err(e) => {
            warn!("Confirmation lookup failed for user {}: {}", user_id, e);
            return false;
        }
    };

    let mail = match mail_service::registration_confirmation(mail_from, &participant, &event) {
        Ok(mail) => mail,
        Err(e) => {
            warn!("Confirmation mail could not be built: {}", e);
            return false;
        }
    };

    match mailer.send(&mail).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Confirmation mail to {} failed: {}", participant.email, e);
            false
        }
    }
}
