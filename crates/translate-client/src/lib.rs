//! Google Cloud Translation v2 client.
//!
//! Provides batched text translation with per-item source language
//! detection, plus a single-item convenience wrapper.

mod client;
#[cfg(test)]
mod tests;

pub use client::TranslateClient;

/// Sentinel for an undetermined language, returned when the API omits a
/// detection result. Defined once, next to the rendering that keys on it.
pub use relay_core::render::UNDETERMINED_LANG;

/// One translation result, positionally aligned with the request batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
    pub detected_language_code: String,
}

/// Unified error type for the translate-client crate.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Translation API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Translation API returned {got} results for {expected} inputs")]
    Misaligned { expected: usize, got: usize },
}
