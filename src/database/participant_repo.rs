use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::ParticipantRow;

const SQL_FIND_BY_EMAIL: &str = r#"
SELECT
    user_id,
    name,
    email,
    dept,
    college_roll,
    contact_no,
    year,
    image_url,
    created_at
FROM participants
WHERE email = ?1
LIMIT 1
"#;

const SQL_FIND_BY_ID: &str = r#"
SELECT
    user_id,
    name,
    email,
    dept,
    college_roll,
    contact_no,
    year,
    image_url,
    created_at
FROM participants
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn find_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
) -> sqlx::Result<Option<ParticipantRow>> {
    sqlx::query_as::<_, ParticipantRow>(SQL_FIND_BY_EMAIL)
        .bind(email.trim())
        .fetch_optional(db)
        .await
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
) -> sqlx::Result<Option<ParticipantRow>> {
    sqlx::query_as::<_, ParticipantRow>(SQL_FIND_BY_ID)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

#[derive(Debug, sqlx::FromRow)]
pub struct ParticipantIdRow {
    pub user_id: String,
    pub email: String,
}

/// Batch lookup of participant ids for a set of emails (case-insensitive).
pub async fn find_ids_by_emails<'e>(
    db: impl SqliteExecutor<'e>,
    emails: &[String],
) -> sqlx::Result<Vec<ParticipantIdRow>> {
    if emails.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT user_id, email FROM participants WHERE email IN (");
    let mut separated = qb.separated(", ");
    for email in emails {
        separated.push_bind(email.as_str());
    }
    separated.push_unseparated(")");

    qb.build_query_as::<ParticipantIdRow>().fetch_all(db).await
}

pub struct NewParticipant<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub dept: Option<&'a str>,
    pub college_roll: Option<&'a str>,
    pub year: Option<i64>,
}

const SQL_INSERT_PARTICIPANT_IF_ABSENT: &str = r#"
INSERT INTO participants (user_id, name, email, dept, college_roll, year)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT(email) DO NOTHING
"#;

/// Returns the number of inserted rows: 0 when the email is already known.
pub async fn insert_if_absent<'e>(
    db: impl SqliteExecutor<'e>,
    p: NewParticipant<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PARTICIPANT_IF_ABSENT)
        .bind(p.user_id)
        .bind(p.name)
        .bind(p.email)
        .bind(p.dept)
        .bind(p.college_roll)
        .bind(p.year)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub contact_no: Option<String>,
    pub dept: Option<String>,
    pub college_roll: Option<String>,
    pub year: Option<i64>,
    pub image_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

const SQL_UPDATE_PROFILE: &str = r#"
UPDATE participants
SET name = COALESCE(?, name),
    contact_no = COALESCE(?, contact_no),
    dept = COALESCE(?, dept),
    college_roll = COALESCE(?, college_roll),
    year = COALESCE(?, year),
    image_url = COALESCE(?, image_url)
WHERE email = ?
"#;

pub async fn update_profile<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
    update: &ProfileUpdate,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PROFILE)
        .bind(update.name.as_deref())
        .bind(update.contact_no.as_deref())
        .bind(update.dept.as_deref())
        .bind(update.college_roll.as_deref())
        .bind(update.year)
        .bind(update.image_url.as_deref())
        .bind(email.trim())
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
