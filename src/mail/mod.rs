//! Outbound mail for Credo.
//!
//! Mail is a best-effort notifier: sends are detached from the calling
//! operation and failures are logged, never propagated.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::MailConfig;
use crate::{CredoError, Result};

/// Upper bound on a detached send, including connection setup.
const DETACHED_SEND_TIMEOUT_SECS: u64 = 30;

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a message to a single recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Mailer backed by a SendGrid-style HTTP API.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
    from_name: String,
}

impl HttpMailer {
    /// Create a mailer from configuration. Returns an error if the
    /// HTTP client cannot be constructed.
    pub fn new(config: &MailConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CredoError::Mail(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_address, "name": self.from_name },
            "subject": subject,
            "content": [{ "type": "text/html", "value": body }],
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CredoError::Mail(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CredoError::Mail(format!(
                "mail provider returned status {}",
                response.status()
            )));
        }

        debug!(to = %to, "Mail sent");
        Ok(())
    }
}

/// Mailer that only logs messages. Used when no provider API key is
/// configured (development and tests).
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        info!(to = %to, subject = %subject, "Mail provider not configured; logging message only");
        Ok(())
    }
}

/// Build a mailer from configuration. Falls back to [`LogMailer`] when
/// no API key is set.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config.api_key.clone() {
        Some(api_key) if !api_key.is_empty() => match HttpMailer::new(config, api_key) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                warn!("Failed to build HTTP mailer ({e}); falling back to log-only mail");
                Arc::new(LogMailer)
            }
        },
        _ => {
            warn!("No mail API key configured; messages will be logged, not delivered");
            Arc::new(LogMailer)
        }
    }
}

/// Fire-and-forget send.
///
/// Spawns the send on the runtime with a bounded timeout. The enclosing
/// operation never blocks on delivery and never observes a failure.
pub fn send_detached(mailer: Arc<dyn Mailer>, to: String, subject: String, body: String) {
    tokio::spawn(async move {
        let send = mailer.send(&to, &subject, &body);
        match tokio::time::timeout(Duration::from_secs(DETACHED_SEND_TIMEOUT_SECS), send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(to = %to, "Mail delivery failed: {e}"),
            Err(_) => warn!(to = %to, "Mail delivery timed out"),
        }
    });
}
