use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::MailConfig;
use crate::models::{EventRow, ParticipantRow};

pub const REGISTRATION_SUBJECT: &str = "Registration successful !";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail relay unreachable: {0}")]
    Relay(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),

    #[error("Mail template failed: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct RelayMailer {
    client: reqwest::Client,
    url: String,
    key: Option<String>,
}

impl RelayMailer {
    pub fn new(url: &str, key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            key,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = self
            .key
            .as_deref()
            .and_then(|key| HeaderValue::from_str(&format!("Bearer {}", key)).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let resp = self
            .client
            .post(&self.url)
            .headers(self.headers())
            .json(mail)
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!("Mail relay non-OK for {}: {}", mail.to, resp.status());
            return Err(MailError::Rejected(resp.status().as_u16()));
        }
        info!("Mail sent to {}", mail.to);
        Ok(())
    }
}

/// Used when no relay is configured: the message only reaches the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(
            "Mail relay not configured; would send {:?} to {}",
            mail.subject, mail.to
        );
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config.relay_url.as_deref() {
        Some(url) => Arc::new(RelayMailer::new(url, config.relay_key.clone())),
        None => Arc::new(LogMailer),
    }
}

#[derive(Template)]
#[template(path = "registration_email.html")]
pub struct RegistrationEmailTemplate<'a> {
    pub first_name: &'a str,
    pub event_name: &'a str,
    pub group_link: Option<&'a str>,
}

pub fn registration_confirmation(
    from: &str,
    participant: &ParticipantRow,
    event: &EventRow,
) -> Result<OutgoingMail, MailError> {
    let html = RegistrationEmailTemplate {
        first_name: participant.first_name(),
        event_name: &event.name,
        group_link: event.grp_link.as_deref().filter(|l| !l.trim().is_empty()),
    }
    .render()?;

    Ok(OutgoingMail {
        from: from.to_string(),
        to: participant.email.clone(),
        subject: REGISTRATION_SUBJECT.to_string(),
        html,
    })
}
