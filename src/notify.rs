//! Outbound notification delivery with bounded retry.
//!
//! One channel, best-effort: a Telegram Bot API text push. Delivery failures
//! are retried with linear backoff and then dropped; nothing here ever
//! surfaces an error to the watch loop.

use crate::config::NotifyConfig;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Failure of one delivery attempt. Every variant is retried identically;
/// there is no retryable/permanent distinction.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// One operation: send text to the fixed destination.
pub trait MessageTransport: Send + Sync {
    fn send_text(&self, text: &str) -> Result<(), TransportError>;
}

/// Telegram Bot API transport. Credentials come from the environment and are
/// validated at construction, so a send never fails on configuration.
pub struct TelegramTransport {
    agent: ureq::Agent,
    bot_token: String,
    chat_id: String,
}

impl TelegramTransport {
    pub fn from_env(timeout: Duration) -> anyhow::Result<Self> {
        let bot_token =
            std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID must be set")?;

        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self {
            agent,
            bot_token,
            chat_id,
        })
    }
}

impl MessageTransport for TelegramTransport {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        match self
            .agent
            .post(&url)
            .send_form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(TransportError::Rejected { status, body })
            }
            Err(e) => Err(TransportError::Transport(e.to_string())),
        }
    }
}

/// Transport that only logs. Used in dry-run mode.
pub struct NullTransport;

impl MessageTransport for NullTransport {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        info!("[dry-run] notification: {text}");
        Ok(())
    }
}

/// Create the transport for the selected mode. Missing credentials are a
/// startup failure, never a per-send one.
pub fn create_transport(
    config: &NotifyConfig,
    dry_run: bool,
) -> anyhow::Result<Arc<dyn MessageTransport>> {
    if dry_run {
        Ok(Arc::new(NullTransport))
    } else {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        Ok(Arc::new(TelegramTransport::from_env(timeout)?))
    }
}

/// Best-effort notifier. [`Notifier::send`] never raises: failures are
/// retried up to the attempt budget with linearly increasing backoff, and a
/// message that exhausts its budget is dropped with a log entry.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MessageTransport>,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl Notifier {
    pub fn new(config: &NotifyConfig, transport: Arc<dyn MessageTransport>) -> Self {
        Self {
            transport,
            max_attempts: config.max_attempts.max(2),
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
        }
    }

    pub async fn send(&self, message: &str) {
        let max_attempts = self.max_attempts;

        for attempt in 1..=max_attempts {
            let transport = Arc::clone(&self.transport);
            let text = message.to_string();

            // The transport is blocking (fixed per-call timeout); hop off
            // the worker so the loop's runtime stays responsive while we
            // await the attempt inline.
            let result = tokio::task::spawn_blocking(move || transport.send_text(&text)).await;

            match result {
                Ok(Ok(())) => return,
                Ok(Err(e)) => {
                    error!("notification send failed (attempt {attempt}/{max_attempts}): {e}")
                }
                Err(e) => {
                    error!("notification task failed (attempt {attempt}/{max_attempts}): {e}")
                }
            }

            tokio::time::sleep(self.backoff_unit * attempt).await;
        }

        error!("notification dropped after {max_attempts} attempts: {message}");
    }
}
