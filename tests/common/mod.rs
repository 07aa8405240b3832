#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use sqlx::SqlitePool;
use tempfile::TempDir;

use festival::config::{Config, MailConfig, DEFAULT_MAX_IMAGE_BYTES};
use festival::database::{self, event_repo};
use festival::models::{EventRow, ParticipantRow};
use festival::services::mail_service::{MailError, Mailer, OutgoingMail};
use festival::services::participant_service;
use festival::services::storage_service::ObjectStorage;
use festival::{build_router, AppState};

pub const COLLEGE_DOMAIN: &str = "college.example";
pub const SOLO_EVENT: i64 = 1;
pub const TEAM_EVENT: i64 = 2;

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected(502));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_dir.path().to_path_buf()
    }
}

pub fn test_config(storage_root: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: "http://localhost:5173".to_string(),
        storage_root,
        public_base_url: "http://festival.test".to_string(),
        college_email_domain: COLLEGE_DOMAIN.to_string(),
        mail: MailConfig {
            relay_url: None,
            relay_key: None,
            from: "fest@college.example".to_string(),
        },
        max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
    }
}

pub async fn test_app_with(mailer: RecordingMailer) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("tempdir");
    let pool = database::connect_in_memory().await.expect("in-memory db");
    let config = test_config(storage_dir.path().to_path_buf());
    let storage = ObjectStorage::new(storage_dir.path(), &config.public_base_url);
    let mailer = Arc::new(mailer);

    let state = AppState::new(pool, config, storage, mailer.clone());
    seed_events(&state.pool).await;

    TestApp {
        state,
        mailer,
        storage_dir,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(RecordingMailer::default()).await
}

pub fn event(event_id: i64, name: &str, is_team_event: bool) -> EventRow {
    EventRow {
        event_id,
        name: name.to_string(),
        category: "technical".to_string(),
        date: Some(format!("2025-03-1{}", event_id)),
        start_time: Some("10:00".to_string()),
        end_time: None,
        venue: Some("Main Hall".to_string()),
        is_team_event,
        min_team_size: None,
        max_team_size: if is_team_event { Some(4) } else { None },
        rules: None,
        details: None,
        coordinator_names: None,
        contact_no: None,
        event_img_url: None,
        grp_link: Some("https://chat.example/group".to_string()),
    }
}

async fn seed_events(pool: &SqlitePool) {
    event_repo::upsert_event(pool, &event(SOLO_EVENT, "Treasure Hunt", false))
        .await
        .expect("seed solo event");
    event_repo::upsert_event(pool, &event(TEAM_EVENT, "Code Relay", true))
        .await
        .expect("seed team event");
}

pub async fn participant(pool: &SqlitePool, name: &str, email: &str) -> ParticipantRow {
    participant_service::add_user(pool, COLLEGE_DOMAIN, name, email)
        .await
        .expect("add participant")
        .participant
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count rows")
}

pub async fn registration_ids(pool: &SqlitePool, event_id: i64) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT registration_id FROM registrations WHERE event_id = ?1 ORDER BY registration_id",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
    .expect("list registrations")
}

pub fn token_for(email: &str) -> String {
    let claims = serde_json::json!({ "sub": format!("idp|{}", email), "email": email });
    format!(
        "{}.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#),
        general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes())
    )
}

/// Serves the full router on an ephemeral port and returns its base URL.
pub async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("addr");
    let app = build_router(state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve") });
    format!("http://{}", addr)
}
