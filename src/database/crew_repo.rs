use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::CrewMemberRow;

const SQL_LIST_CREW: &str = r#"
SELECT
    name,
    role,
    event_id,
    img_url,
    linkedin,
    insta,
    github,
    priority
FROM crew_members
ORDER BY priority ASC, name ASC
"#;

pub async fn list_crew(pool: &SqlitePool) -> sqlx::Result<Vec<CrewMemberRow>> {
    sqlx::query_as::<_, CrewMemberRow>(SQL_LIST_CREW)
        .fetch_all(pool)
        .await
}

const SQL_UPSERT_CREW_MEMBER: &str = r#"
INSERT INTO crew_members (name, role, event_id, img_url, linkedin, insta, github, priority)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(name) DO UPDATE SET
    role = excluded.role,
    event_id = excluded.event_id,
    img_url = excluded.img_url,
    linkedin = excluded.linkedin,
    insta = excluded.insta,
    github = excluded.github,
    priority = excluded.priority
"#;

pub async fn upsert_crew_member<'e>(
    db: impl SqliteExecutor<'e>,
    member: &CrewMemberRow,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_CREW_MEMBER)
        .bind(&member.name)
        .bind(&member.role)
        .bind(member.event_id)
        .bind(&member.img_url)
        .bind(&member.linkedin)
        .bind(&member.insta)
        .bind(&member.github)
        .bind(member.priority)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
