//! Runtime configuration loaded from the environment.
//!
//! The set of source keys is fixed at startup; per-source webhook bindings
//! use the uppercased key as an env suffix, e.g.
//! `RELAY_CHAT_WEBHOOK_EMBERFALL` for the `emberfall` source.

use std::collections::HashMap;

use anyhow::Context;

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed_url: String,
    pub source_keys: Vec<String>,
    pub chat_webhooks: HashMap<String, String>,
    pub report_webhooks: HashMap<String, String>,
    pub backend_urls: HashMap<String, String>,
    pub flush_interval_secs: u64,
    pub max_segment_chars: usize,
    pub source_lang: String,
    pub target_lang: String,
    pub translate_api_key: String,
    pub steam_webapi_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            source_keys: Vec::new(),
            chat_webhooks: HashMap::new(),
            report_webhooks: HashMap::new(),
            backend_urls: HashMap::new(),
            flush_interval_secs: 10,
            max_segment_chars: 1800,
            source_lang: "en".into(),
            target_lang: "en".into(),
            translate_api_key: String::new(),
            steam_webapi_key: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { std::env::var(key).unwrap_or_default() };

        let feed_url = g("RELAY_FEED_URL");
        if feed_url.is_empty() {
            anyhow::bail!("RELAY_FEED_URL is not set");
        }

        let source_keys = split_keys(&g("RELAY_SOURCE_KEYS"));
        if source_keys.is_empty() {
            anyhow::bail!("RELAY_SOURCE_KEYS is not set");
        }

        let mut chat_webhooks = HashMap::new();
        let mut report_webhooks = HashMap::new();
        let mut backend_urls = HashMap::new();
        for key in &source_keys {
            let suffix = env_suffix(key);
            let chat = g(&format!("RELAY_CHAT_WEBHOOK_{suffix}"));
            if !chat.is_empty() {
                chat_webhooks.insert(key.clone(), chat);
            }
            let report = g(&format!("RELAY_REPORT_WEBHOOK_{suffix}"));
            if !report.is_empty() {
                report_webhooks.insert(key.clone(), report);
            }
            let backend = g(&format!("RELAY_BACKEND_URL_{suffix}"));
            if !backend.is_empty() {
                backend_urls.insert(key.clone(), backend);
            }
        }

        let defaults = Self::default();
        Ok(Self {
            feed_url,
            source_keys,
            chat_webhooks,
            report_webhooks,
            backend_urls,
            flush_interval_secs: parse_u64(
                &g("RELAY_FLUSH_INTERVAL_SECS"),
                defaults.flush_interval_secs,
            )
            .max(1),
            max_segment_chars: parse_usize(
                &g("RELAY_MAX_SEGMENT_CHARS"),
                defaults.max_segment_chars,
            ),
            source_lang: non_empty_or(g("RELAY_SOURCE_LANG"), defaults.source_lang),
            target_lang: non_empty_or(g("RELAY_TARGET_LANG"), defaults.target_lang),
            translate_api_key: g("GOOGLE_TRANSLATE_API_KEY"),
            steam_webapi_key: g("STEAM_WEBAPI_KEY"),
        })
    }

    /// Load config after applying a `.env` file, if present.
    pub fn load_with_dotenv() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::load().context("failed to load relay configuration")
    }

    pub fn translation_configured(&self) -> bool {
        !self.translate_api_key.is_empty()
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_suffix(key: &str) -> String {
    key.to_uppercase().replace(['-', ':', '.'], "_")
}

fn non_empty_or(value: String, default: String) -> String {
    if value.is_empty() { default } else { value }
}

fn parse_u64(s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn parse_usize(s: &str, default: usize) -> usize {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
