use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::{EventDetailsRow, EventRow};

const SQL_LIST_EVENTS: &str = r#"
SELECT
    event_id,
    name,
    category,
    date,
    start_time,
    end_time,
    venue,
    is_team_event,
    min_team_size,
    max_team_size,
    rules,
    details,
    coordinator_names,
    contact_no,
    event_img_url,
    grp_link
FROM events
ORDER BY date IS NULL, date ASC, start_time ASC, event_id ASC
"#;

pub async fn list_events(pool: &SqlitePool) -> sqlx::Result<Vec<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_LIST_EVENTS)
        .fetch_all(pool)
        .await
}

const SQL_FIND_EVENT: &str = r#"
SELECT
    event_id,
    name,
    category,
    date,
    start_time,
    end_time,
    venue,
    is_team_event,
    min_team_size,
    max_team_size,
    rules,
    details,
    coordinator_names,
    contact_no,
    event_img_url,
    grp_link
FROM events
WHERE event_id = ?1
LIMIT 1
"#;

pub async fn find_event<'e>(
    db: impl SqliteExecutor<'e>,
    event_id: i64,
) -> sqlx::Result<Option<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_FIND_EVENT)
        .bind(event_id)
        .fetch_optional(db)
        .await
}

const SQL_LOAD_EVENT_DETAILS: &str = r#"
SELECT
    e.event_id,
    e.name,
    e.category,
    e.date,
    e.start_time,
    e.end_time,
    e.venue,
    e.is_team_event,
    e.min_team_size,
    e.max_team_size,
    e.rules,
    e.details,
    e.coordinator_names,
    e.contact_no,
    e.event_img_url,
    e.grp_link,
    (SELECT COUNT(*) FROM registrations r WHERE r.event_id = e.event_id) AS registration_count,
    (SELECT COUNT(*) FROM teams t WHERE t.event_id = e.event_id) AS team_count
FROM events e
WHERE e.event_id = ?1
LIMIT 1
"#;

pub async fn load_event_details(
    pool: &SqlitePool,
    event_id: i64,
) -> sqlx::Result<Option<EventDetailsRow>> {
    sqlx::query_as::<_, EventDetailsRow>(SQL_LOAD_EVENT_DETAILS)
        .bind(event_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_EVENT: &str = r#"
INSERT INTO events (
    event_id,
    name,
    category,
    date,
    start_time,
    end_time,
    venue,
    is_team_event,
    min_team_size,
    max_team_size,
    rules,
    details,
    coordinator_names,
    contact_no,
    event_img_url,
    grp_link
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(event_id) DO UPDATE SET
    name = excluded.name,
    category = excluded.category,
    date = excluded.date,
    start_time = excluded.start_time,
    end_time = excluded.end_time,
    venue = excluded.venue,
    is_team_event = excluded.is_team_event,
    min_team_size = excluded.min_team_size,
    max_team_size = excluded.max_team_size,
    rules = excluded.rules,
    details = excluded.details,
    coordinator_names = excluded.coordinator_names,
    contact_no = excluded.contact_no,
    event_img_url = excluded.event_img_url,
    grp_link = excluded.grp_link
"#;

pub async fn upsert_event<'e>(db: impl SqliteExecutor<'e>, event: &EventRow) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_EVENT)
        .bind(event.event_id)
        .bind(&event.name)
        .bind(&event.category)
        .bind(&event.date)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.venue)
        .bind(event.is_team_event)
        .bind(event.min_team_size)
        .bind(event.max_team_size)
        .bind(&event.rules)
        .bind(&event.details)
        .bind(&event.coordinator_names)
        .bind(&event.contact_no)
        .bind(&event.event_img_url)
        .bind(&event.grp_link)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
