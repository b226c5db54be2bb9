//! Core chat relay pipeline logic: event decoding, per-source buffering,
//! line rendering, and size-bounded segment chunking.
//!
//! This crate is I/O-free; transport (feed subscription, translation API,
//! webhook delivery) lives in the application crate.

pub mod event;
pub mod queue;
pub mod render;
pub mod segment;

pub use event::{ChatEvent, ChatTimestamp, RelayEvent, SuggestionEvent};
pub use queue::ChatQueues;

/// Unified error type for the relay-core crate.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown event topic: {0}")]
    UnknownTopic(String),
}
