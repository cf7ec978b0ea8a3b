//! # Spreadsheet Sink
//!
//! Fire-and-forget delivery of [`SinkRecord`]s to the spreadsheet web-app
//! webhook.
//!
//! Delivery never blocks a response: [`SheetsSink::dispatch`] spawns the
//! request on tokio and logs the outcome. A missing webhook URL is not an
//! error; the record is logged and skipped.

use crate::config::SheetsConfig;
use execsys_core::SinkRecord;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Errors from the webhook client.
#[derive(Debug)]
pub enum SinkError {
    /// The HTTP client could not be built.
    ClientBuild(String),
    /// Cannot reach the webhook (includes timeouts).
    ConnectionFailed(String),
    /// The webhook answered with a non-success status.
    Http(u16, String),
    /// The script answered `{"status":"error"}`.
    Rejected(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientBuild(msg) => write!(f, "Cannot build webhook client: {msg}"),
            Self::ConnectionFailed(msg) => write!(f, "Cannot reach webhook: {msg}"),
            Self::Http(status, body) => write!(f, "Webhook returned {status}: {body}"),
            Self::Rejected(msg) => write!(f, "Webhook rejected record: {msg}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// What happened to a submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    Delivered,
    /// No webhook configured.
    Skipped,
}

/// Client for the spreadsheet webhook.
#[derive(Debug, Clone)]
pub struct SheetsSink {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl SheetsSink {
    /// Build a sink from configuration.
    pub fn new(config: &SheetsConfig) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.effective_timeout_secs()))
            .build()
            .map_err(|e| SinkError::ClientBuild(e.to_string()))?;

        let webhook_url = config.effective_webhook_url().map(str::to_string);
        if webhook_url.is_none() {
            tracing::warn!("Spreadsheet webhook not configured, records will be logged only");
        }

        Ok(Self { http, webhook_url })
    }

    /// A sink with no webhook. Every record is skipped.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: None,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// POST one record and interpret the reply.
    pub async fn submit(&self, record: &SinkRecord) -> Result<SinkOutcome, SinkError> {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::warn!(kind = record.kind(), "Webhook not configured, record not sent");
            tracing::debug!(?record, "Unsent record");
            return Ok(SinkOutcome::Skipped);
        };

        let resp = self
            .http
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(|e| SinkError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SinkError::Http(status.as_u16(), body));
        }

        check_reply(&body)?;
        Ok(SinkOutcome::Delivered)
    }

    /// Submit in the background. Failures are logged and swallowed.
    pub fn dispatch(&self, record: SinkRecord) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move {
            match sink.submit(&record).await {
                Ok(SinkOutcome::Delivered) => {
                    tracing::info!(kind = record.kind(), "Record delivered to spreadsheet");
                }
                Ok(SinkOutcome::Skipped) => {}
                Err(e) => {
                    tracing::error!(kind = record.kind(), "Spreadsheet submission failed: {}", e);
                }
            }
        })
    }
}

/// The script replies `{"status":"ok"}` or
/// `{"status":"error","message":...}`. Non-JSON replies count as delivered.
fn check_reply(body: &str) -> Result<(), SinkError> {
    let Ok(reply) = serde_json::from_str::<Value>(body) else {
        return Ok(());
    };
    if reply.get("status").and_then(Value::as_str) == Some("error") {
        let message = reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(SinkError::Rejected(message));
    }
    Ok(())
}
