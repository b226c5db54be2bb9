//! WebSocket client for the game event feed.
//!
//! Connects to the relay gateway, subscribes to the chat and suggestion
//! topics, and delivers topic-tagged JSON payloads over an mpsc channel.
//! Manages automatic reconnection with exponential backoff.

mod connection;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(30);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Feed client error.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed protocol error: {0}")]
    Protocol(String),

    #[error("connection timeout")]
    Timeout,

    #[error("connection closed by server")]
    Closed,
}

/// An event received from the feed.
#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Feed client configuration.
pub struct FeedConfig {
    pub url: String,
    pub topics: Vec<String>,
}

impl FeedConfig {
    /// Subscribe to the two topic classes the relay consumes.
    pub fn with_default_topics(url: String) -> Self {
        Self {
            url,
            topics: vec![
                relay_core::event::TOPIC_CHAT.into(),
                relay_core::event::TOPIC_SUGGESTION.into(),
            ],
        }
    }
}

/// Feed WebSocket client with auto-reconnect.
///
/// Events are delivered via `mpsc::Receiver<FeedEvent>`.
pub struct FeedClient;

impl FeedClient {
    /// Start the feed loop. Returns an event receiver and shutdown sender.
    pub fn connect(config: FeedConfig) -> (mpsc::Receiver<FeedEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, event_tx, shutdown_rx));
        (event_rx, shutdown_tx)
    }

    async fn run_loop(
        config: FeedConfig,
        event_tx: mpsc::Sender<FeedEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Feed shutdown requested");
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Feed failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&config, &event_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Feed connection closed cleanly");
                    return;
                }
                Err(e) => {
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Feed connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Feed shutdown requested during reconnect backoff");
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}
