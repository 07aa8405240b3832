use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::services::mail_service::Mailer;
use crate::services::storage_service::ObjectStorage;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub storage: Arc<ObjectStorage>,
    pub mailer: Arc<dyn Mailer>,
    // SQLite has a single writer; multi-statement write transactions queue
    // here instead of failing with SQLITE_BUSY on lock upgrade.
    pub write_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: Config,
        storage: ObjectStorage,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            storage: Arc::new(storage),
            mailer,
            write_gate: Arc::new(Mutex::new(())),
        }
    }
}
