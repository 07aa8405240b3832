use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::UserEventNameRow;

// A participant counts as registered for an event when they hold a
// registration row or sit on one of the event's teams.
const SQL_IS_ENGAGED_IN_EVENT: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM registrations WHERE user_id = ?1 AND event_id = ?2
    UNION ALL
    SELECT 1 FROM team_members WHERE user_id = ?1 AND event_id = ?2
)
"#;

pub async fn is_engaged_in_event<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    event_id: i64,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(SQL_IS_ENGAGED_IN_EVENT)
        .bind(user_id)
        .bind(event_id)
        .fetch_one(db)
        .await
}

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (user_id, event_id, team_id)
VALUES (?, ?, ?)
"#;

pub async fn insert_registration<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: &str,
    event_id: i64,
    team_id: Option<i64>,
) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(user_id)
        .bind(event_id)
        .bind(team_id)
        .execute(db)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_LIST_USER_EVENT_NAMES: &str = r#"
SELECT e.event_id, e.name
FROM events e
WHERE e.event_id IN (
    SELECT event_id FROM registrations WHERE user_id = ?1
    UNION
    SELECT event_id FROM team_members WHERE user_id = ?1
)
ORDER BY e.date IS NULL, e.date ASC, e.event_id ASC
"#;

pub async fn list_user_event_names(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<UserEventNameRow>> {
    sqlx::query_as::<_, UserEventNameRow>(SQL_LIST_USER_EVENT_NAMES)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
