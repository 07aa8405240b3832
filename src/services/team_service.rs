use sqlx::SqlitePool;
use tracing::info;

use crate::database::{crew_repo, event_repo, team_repo};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::CrewMemberRow;

pub async fn create_team(pool: &SqlitePool, event_id: i64, team_name: &str) -> AppResult<i64> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Err(AppError::validation("Team name is required"));
    }

    let event = event_repo::find_event(pool, event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    if !event.is_team_event {
        return Err(AppError::validation("This event does not take teams"));
    }

    let team_id = team_repo::insert_team(pool, event_id, team_name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::validation("Team name already taken for this event")
            } else {
                AppError::Database(e)
            }
        })?;

    info!("Team {} created for event {}: {}", team_id, event_id, team_name);
    Ok(team_id)
}

/// Removes a team that never got registered. Membership rows go with it.
pub async fn delete_team(
    pool: &SqlitePool,
    team_name: &str,
    event_id: Option<i64>,
) -> AppResult<()> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Err(AppError::validation("Team name is required"));
    }

    let mut tx = pool.begin().await?;
    let teams = team_repo::find_teams_by_name(&mut *tx, team_name, event_id).await?;
    let team = match teams.as_slice() {
        [] => return Err(AppError::not_found("Team not found")),
        [team] => team.clone(),
        _ => {
            return Err(AppError::validation(
                "Team name is used by several events; event_id is required",
            ))
        }
    };

    if team_repo::count_team_registrations(&mut *tx, team.team_id).await? > 0 {
        return Err(AppError::validation(
            "Team is already registered and cannot be deleted",
        ));
    }

    team_repo::delete_team(&mut *tx, team.team_id).await?;
    tx.commit().await?;

    info!("Team {} deleted ({})", team.team_id, team.team_name);
    Ok(())
}

pub async fn list_crew(pool: &SqlitePool) -> AppResult<Vec<CrewMemberRow>> {
    Ok(crew_repo::list_crew(pool).await?)
}
