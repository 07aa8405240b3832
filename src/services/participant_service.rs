use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::participant_repo::{self, NewParticipant, ProfileUpdate};
use crate::database::{registration_repo, team_repo};
use crate::error::{AppError, AppResult};
use crate::models::{ParticipantRow, UserEventNameRow, UserTeamRow};
use crate::services::storage_service::ObjectStorage;

pub const PARTICIPANT_BUCKET: &str = "participants";
const MAX_ACADEMIC_YEAR: i64 = 4;

/// Identity derived from an institutional address such as
/// `cse2021001@college.example`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollegeIdentity {
    pub department: String,
    pub college_roll: String,
    pub admission_year: i64,
    pub academic_year: i64,
}

fn college_roll_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-zA-Z]+)\d+@").expect("static regex"))
}

// Admission year sits right before the 3-digit serial at the end of the roll.
fn email_admission_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})\d{3}@").expect("static regex"))
}

fn admission_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").expect("static regex"))
}

pub fn is_college_email(email: &str, domain: &str) -> bool {
    email
        .to_lowercase()
        .ends_with(&format!("@{}", domain.to_lowercase()))
}

pub fn parse_college_email(email: &str, current_year: i64) -> Option<CollegeIdentity> {
    let email = email.trim();
    let roll = college_roll_re().captures(email)?;
    let department = roll.get(1)?.as_str().to_uppercase();
    let college_roll = roll.get(0)?.as_str().trim_end_matches('@').to_uppercase();
    let admission_year: i64 = email_admission_year_re()
        .captures(email)?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;

    Some(CollegeIdentity {
        department,
        college_roll,
        admission_year,
        academic_year: current_year - admission_year,
    })
}

/// Academic year implied by the first 4-digit run of a class roll, kept only
/// when it is a plausible year of study.
pub fn academic_year_from_roll(class_roll: &str, current_year: i64) -> Option<i64> {
    let admission: i64 = admission_year_re().find(class_roll)?.as_str().parse().ok()?;
    let year = current_year - admission;
    (0..=MAX_ACADEMIC_YEAR).contains(&year).then_some(year)
}

pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

pub struct AddUserOutcome {
    pub participant: ParticipantRow,
    pub created: bool,
}

/// Creates the participant on first sign-in; later calls return the stored row.
pub async fn add_user(
    pool: &SqlitePool,
    college_domain: &str,
    name: &str,
    email: &str,
) -> AppResult<AddUserOutcome> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::validation("User data missing"));
    }

    let identity = if is_college_email(email, college_domain) {
        let identity = parse_college_email(email, current_year())
            .ok_or_else(|| AppError::validation("Invalid email format"))?;
        Some(identity)
    } else {
        None
    };

    let user_id = Uuid::new_v4().to_string();
    let inserted = participant_repo::insert_if_absent(
        pool,
        NewParticipant {
            user_id: &user_id,
            name,
            email,
            dept: identity.as_ref().map(|i| i.department.as_str()),
            college_roll: identity.as_ref().map(|i| i.college_roll.as_str()),
            year: identity.as_ref().map(|i| i.academic_year),
        },
    )
    .await?;

    let participant = participant_repo::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if inserted > 0 {
        info!("Participant created: {}", participant.user_id);
    }

    Ok(AddUserOutcome {
        participant,
        created: inserted > 0,
    })
}

pub async fn load_participant(pool: &SqlitePool, email: &str) -> AppResult<ParticipantRow> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    participant_repo::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn load_participant_by_id(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<ParticipantRow> {
    participant_repo::find_by_id(pool, user_id.trim())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub email: String,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub class_roll: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Size and type checks run before any storage or database work.
pub fn check_image(image: &ImageUpload, max_bytes: usize) -> AppResult<()> {
    if image.bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge { limit: max_bytes });
    }
    if !image.content_type.starts_with("image/") {
        return Err(AppError::validation("Only image uploads are accepted"));
    }
    Ok(())
}

pub fn build_profile_update(form: &ProfileForm, current_year: i64) -> ProfileUpdate {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let class_roll = non_blank(&form.class_roll);
    ProfileUpdate {
        name: non_blank(&form.name),
        contact_no: non_blank(&form.phone),
        dept: non_blank(&form.department).map(|d| d.to_uppercase()),
        year: class_roll
            .as_deref()
            .and_then(|roll| academic_year_from_roll(roll, current_year)),
        college_roll: class_roll.map(|r| r.to_uppercase()),
        image_url: None,
    }
}

pub async fn update_profile(
    pool: &SqlitePool,
    storage: &ObjectStorage,
    max_image_bytes: usize,
    form: ProfileForm,
) -> AppResult<bool> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(AppError::validation("User email is required"));
    }
    if let Some(image) = &form.image {
        check_image(image, max_image_bytes)?;
    }

    let existing = participant_repo::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut update = build_profile_update(&form, current_year());
    let mut uploaded_key = None;

    if let Some(image) = &form.image {
        let key = format!(
            "participants/file_{}_{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        storage
            .upload(PARTICIPANT_BUCKET, &key, &image.bytes)
            .await?;
        update.image_url = Some(storage.public_url(PARTICIPANT_BUCKET, &key));
        uploaded_key = Some(key);
    }

    if update.is_empty() {
        return Ok(false);
    }

    if let Err(e) = participant_repo::update_profile(pool, email, &update).await {
        if let Some(key) = uploaded_key {
            match storage.remove(PARTICIPANT_BUCKET, &key).await {
                Ok(_) => info!("Removed orphaned upload: {}", key),
                Err(remove_err) => {
                    warn!("Failed to remove orphaned upload {}: {}", key, remove_err)
                }
            }
        }
        return Err(e.into());
    }

    if update.image_url.is_some() {
        if let Some(old_key) = existing
            .image_url
            .as_deref()
            .and_then(|url| storage.key_from_public_url(PARTICIPANT_BUCKET, url))
        {
            match storage.remove(PARTICIPANT_BUCKET, &old_key).await {
                Ok(_) => info!("Deleted previous image: {}", old_key),
                Err(e) => warn!("Failed to delete old image {}: {}", old_key, e),
            }
        }
    }

    Ok(true)
}

pub async fn list_user_event_names(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<Vec<UserEventNameRow>> {
    if user_id.trim().is_empty() {
        return Err(AppError::validation("user_uuid is required"));
    }
    Ok(registration_repo::list_user_event_names(pool, user_id.trim()).await?)
}

pub async fn list_user_teams(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<UserTeamRow>> {
    if user_id.trim().is_empty() {
        return Err(AppError::validation("user_uuid is required"));
    }
    Ok(team_repo::list_user_teams(pool, user_id.trim()).await?)
}
