//! Destination resolution: per-source Discord webhook sinks.
//!
//! Chat and report destinations are bound separately; a source with no
//! binding resolves to `None` and the caller decides whether to retain
//! (chat) or drop (suggestions).

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;

use crate::config::AppConfig;

// A stuck send must not stall the flush cycle for other sources.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook delivery error.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook error (status {status}): {message}")]
    ApiError { status: u16, message: String },
}

/// Plain-text output seam. The flusher is written against this so tests
/// can substitute a recording sink for the webhook.
pub(crate) trait Sink {
    async fn send(&self, content: &str) -> Result<(), SinkError>;
}

/// Resolves a source key to its chat sink, if one is bound.
pub(crate) trait ResolveChat {
    type Sink: Sink;

    fn chat_sink(&self, source_key: &str) -> Option<Self::Sink>;
}

/// A single resolved output sink.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl Sink for WebhookSink {
    async fn send(&self, content: &str) -> Result<(), SinkError> {
        WebhookSink::send(self, content).await
    }
}

impl WebhookSink {
    /// Send one plain-text message.
    pub async fn send(&self, content: &str) -> Result<(), SinkError> {
        self.post(&json!({
            "content": content,
            "allowed_mentions": { "parse": [] },
        }))
        .await
    }

    /// Send one embed.
    pub async fn send_embed(&self, embed: serde_json::Value) -> Result<(), SinkError> {
        self.post(&json!({
            "embeds": [embed],
            "allowed_mentions": { "parse": [] },
        }))
        .await
    }

    async fn post(&self, body: &serde_json::Value) -> Result<(), SinkError> {
        let resp = self
            .http
            .post(&self.url)
            .timeout(SEND_TIMEOUT)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SinkError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Maps a source key to its chat and report sinks.
pub struct DestinationRegistry {
    http: reqwest::Client,
    chat: HashMap<String, String>,
    report: HashMap<String, String>,
}

impl DestinationRegistry {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            chat: config.chat_webhooks.clone(),
            report: config.report_webhooks.clone(),
        }
    }

    /// Resolve the chat sink for a source, if bound.
    pub fn resolve_chat(&self, source_key: &str) -> Option<WebhookSink> {
        self.chat.get(source_key).map(|url| WebhookSink {
            http: self.http.clone(),
            url: url.clone(),
        })
    }

    /// Resolve the moderation-report sink for a source, if bound.
    pub fn resolve_report(&self, source_key: &str) -> Option<WebhookSink> {
        self.report.get(source_key).map(|url| WebhookSink {
            http: self.http.clone(),
            url: url.clone(),
        })
    }
}

impl ResolveChat for DestinationRegistry {
    type Sink = WebhookSink;

    fn chat_sink(&self, source_key: &str) -> Option<WebhookSink> {
        self.resolve_chat(source_key)
    }
}
