//! Inbound event payloads and topic classification.
//!
//! The feed delivers JSON payloads tagged by topic. Topics fall into two
//! classes: `chat` events are buffered for the batch flusher, `suggestion`
//! events are forwarded immediately. Classification is an exhaustive enum
//! match so a new topic class is a compile-time-checked addition.

use serde::Deserialize;

use crate::RelayError;

/// Topic class for buffered chat lines, published as `chat` or `chat:<key>`.
pub const TOPIC_CHAT: &str = "chat";
/// Topic class for moderation reports, published as `suggestion` or
/// `suggestion:<key>` (`suggestions` is accepted for compatibility).
pub const TOPIC_SUGGESTION: &str = "suggestion";

/// One relayed chat line from a game backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEvent {
    pub source_key: String,
    pub steam_id: i64,
    pub name: String,
    pub text: String,
    pub time: ChatTimestamp,
    #[serde(default)]
    pub anon: bool,
    #[serde(default)]
    pub supporter_level: Option<i64>,
}

/// Chat timestamps arrive either pre-formatted as display-ready text or as
/// epoch seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatTimestamp {
    Literal(String),
    Epoch(f64),
}

/// A moderation report, relayed one-by-one without batching.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionEvent {
    pub source_key: String,
    pub steam_id: i64,
    pub text: String,
    #[serde(default)]
    pub match_id: Option<i64>,
    #[serde(default)]
    pub supporter_level: Option<i64>,
}

/// A decoded feed event, ready for dispatch.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Chat(ChatEvent),
    Suggestion(SuggestionEvent),
}

impl RelayEvent {
    /// Decode a raw payload according to its topic.
    ///
    /// The topic class is the part before the first `:`, so `chat` and
    /// `chat:emberfall` classify the same way.
    pub fn classify(topic: &str, payload: &serde_json::Value) -> Result<Self, RelayError> {
        let class = topic.split(':').next().unwrap_or(topic);
        match class {
            TOPIC_CHAT => Ok(Self::Chat(ChatEvent::deserialize(payload)?)),
            TOPIC_SUGGESTION | "suggestions" => {
                Ok(Self::Suggestion(SuggestionEvent::deserialize(payload)?))
            }
            other => Err(RelayError::UnknownTopic(other.to_string())),
        }
    }
}
