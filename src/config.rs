use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub storage_root: PathBuf,
    pub public_base_url: String,
    pub college_email_domain: String,
    pub mail: MailConfig,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub relay_url: Option<String>,
    pub relay_key: Option<String>,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://festival.db?mode=rwc")?,
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "3412")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:5173")?,
            storage_root: try_load("STORAGE_ROOT", "storage")?,
            public_base_url: try_load::<String>("PUBLIC_BASE_URL", "http://localhost:3412")?
                .trim_end_matches('/')
                .to_string(),
            college_email_domain: try_load("COLLEGE_EMAIL_DOMAIN", "rcciit.org.in")?,
            mail: MailConfig {
                relay_url: optional("MAIL_RELAY_URL"),
                relay_key: optional("MAIL_RELAY_KEY"),
                from: try_load("MAIL_FROM", "noreply@localhost")?,
            },
            max_image_bytes: try_load("MAX_IMAGE_BYTES", &DEFAULT_MAX_IMAGE_BYTES.to_string())?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => {
            info!("{key} not set");
            None
        }
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}
