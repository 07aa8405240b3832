use std::env;
use std::error::Error;

use dotenvy::dotenv;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use festival::database::{self, crew_repo, event_repo};
use festival::models::{CrewMemberRow, EventRow};
use festival::Config;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    events: Vec<EventRow>,
    #[serde(default)]
    crew: Vec<CrewMemberRow>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: festival-seed <seed.json>");
        std::process::exit(2);
    };

    let config = Config::from_env()?;
    let pool = database::connect(&config.database_url).await?;

    let raw = tokio::fs::read_to_string(&path).await?;
    let seed: SeedFile = serde_json::from_str(&raw)?;

    let mut tx = pool.begin().await?;
    for event in &seed.events {
        event_repo::upsert_event(&mut *tx, event).await?;
    }
    for member in &seed.crew {
        crew_repo::upsert_crew_member(&mut *tx, member).await?;
    }
    tx.commit().await?;

    info!(
        "seed: events={}, crew={} from {}",
        seed.events.len(),
        seed.crew.len(),
        path
    );
    Ok(())
}
