use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::{TeamRow, UserTeamRow};

const SQL_INSERT_TEAM: &str = r#"
INSERT INTO teams (event_id, team_name)
VALUES (?, ?)
"#;

pub async fn insert_team<'e>(
    db: impl SqliteExecutor<'e>,
    event_id: i64,
    team_name: &str,
) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_TEAM)
        .bind(event_id)
        .bind(team_name)
        .execute(db)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_FIND_TEAM: &str = r#"
SELECT team_id, event_id, team_name
FROM teams
WHERE team_id = ?1
LIMIT 1
"#;

pub async fn find_team<'e>(db: impl SqliteExecutor<'e>, team_id: i64) -> sqlx::Result<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(SQL_FIND_TEAM)
        .bind(team_id)
        .fetch_optional(db)
        .await
}

const SQL_FIND_TEAMS_BY_NAME: &str = r#"
SELECT team_id, event_id, team_name
FROM teams
WHERE team_name = ?1
  AND (?2 IS NULL OR event_id = ?2)
ORDER BY team_id ASC
"#;

pub async fn find_teams_by_name<'e>(
    db: impl SqliteExecutor<'e>,
    team_name: &str,
    event_id: Option<i64>,
) -> sqlx::Result<Vec<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(SQL_FIND_TEAMS_BY_NAME)
        .bind(team_name)
        .bind(event_id)
        .fetch_all(db)
        .await
}

const SQL_COUNT_TEAM_REGISTRATIONS: &str = r#"
SELECT COUNT(*) FROM registrations WHERE team_id = ?1
"#;

pub async fn count_team_registrations<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: i64,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_TEAM_REGISTRATIONS)
        .bind(team_id)
        .fetch_one(db)
        .await
}

const SQL_DELETE_TEAM: &str = r#"
DELETE FROM teams WHERE team_id = ?1
"#;

pub async fn delete_team<'e>(db: impl SqliteExecutor<'e>, team_id: i64) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_TEAM)
        .bind(team_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

const SQL_INSERT_TEAM_MEMBER: &str = r#"
INSERT INTO team_members (team_id, event_id, user_id)
VALUES (?, ?, ?)
"#;

pub async fn insert_team_member<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: i64,
    event_id: i64,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_TEAM_MEMBER)
        .bind(team_id)
        .bind(event_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_USER_TEAMS: &str = r#"
SELECT
    t.team_id,
    t.team_name,
    t.event_id,
    e.name AS name,
    p.name AS member_name,
    p.college_roll,
    (p.user_id = ?1) AS is_current_user
FROM team_members mine
JOIN teams t ON t.team_id = mine.team_id
JOIN events e ON e.event_id = t.event_id
JOIN team_members tm ON tm.team_id = t.team_id
JOIN participants p ON p.user_id = tm.user_id
WHERE mine.user_id = ?1
ORDER BY t.team_id ASC, is_current_user DESC, p.name ASC
"#;

pub async fn list_user_teams(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<UserTeamRow>> {
    sqlx::query_as::<_, UserTeamRow>(SQL_LIST_USER_TEAMS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
