//! Suggestion sink: immediate, non-batched relay of moderation reports.
//!
//! Each report is translated on its own (these are rare compared to chat),
//! enriched with the sender's Steam profile when possible, rendered as one
//! embed, and sent to the report destination for its source. Reports for
//! sources with no bound destination are dropped, unlike chat buffers
//! which are retained.

use serde_json::json;
use translate_client::Translation;

use relay_core::SuggestionEvent;
use relay_core::render::{LEGACY_ID_OFFSET, UNDETERMINED_LANG};

use crate::app::SharedState;

/// Reports shorter than this after trimming are discarded as noise.
const MIN_REPORT_CHARS: usize = 3;

/// Sender identity resolved from the Steam Web API.
#[derive(Debug, Clone)]
struct SteamProfile {
    persona_name: String,
    avatar_url: String,
}

/// Relay one suggestion report.
pub async fn handle(state: &SharedState, report: &SuggestionEvent) -> Result<(), String> {
    let text = report.text.trim();
    if text.len() < MIN_REPORT_CHARS {
        return Ok(());
    }

    tracing::info!(
        source_key = %report.source_key,
        steam_id = report.steam_id,
        "Suggestion received"
    );

    let (source_lang, target_lang, translation_configured, steam_key, backend_url) = {
        let config = state.config().await;
        (
            config.source_lang.clone(),
            config.target_lang.clone(),
            config.translation_configured(),
            config.steam_webapi_key.clone(),
            config.backend_urls.get(&report.source_key).cloned(),
        )
    };

    let translation = if translation_configured {
        match state.translator().translate_single(text, &target_lang).await {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion translation failed; sending untranslated");
                None
            }
        }
    } else {
        None
    };

    let Some(sink) = state.destinations().resolve_report(&report.source_key) else {
        tracing::warn!(
            source_key = %report.source_key,
            "No report destination bound; dropping suggestion"
        );
        return Ok(());
    };

    // Best-effort enrichment; a failed lookup falls back to placeholders.
    let profile = if steam_key.is_empty() {
        None
    } else {
        fetch_steam_profile(state, &steam_key, report.steam_id).await
    };

    let embed = build_embed(
        report,
        text,
        translation.as_ref(),
        profile.as_ref(),
        &source_lang,
        backend_url.as_deref(),
    );
    sink.send_embed(embed)
        .await
        .map_err(|e| format!("webhook send failed: {e}"))
}

async fn fetch_steam_profile(
    state: &SharedState,
    api_key: &str,
    steam_id: i64,
) -> Option<SteamProfile> {
    let url = format!(
        "http://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002/?key={api_key}&steamids={steam_id}"
    );
    let resp = match state
        .http()
        .get(&url)
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(steam_id, error = %e, "Steam profile lookup failed");
            return None;
        }
    };
    if !resp.status().is_success() {
        tracing::warn!(steam_id, status = resp.status().as_u16(), "Steam profile lookup rejected");
        return None;
    }
    let body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(steam_id, error = %e, "Steam profile response unreadable");
            return None;
        }
    };
    let player = body.get("response")?.get("players")?.get(0)?;
    Some(SteamProfile {
        persona_name: player
            .get("personaname")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        avatar_url: player
            .get("avatarmedium")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}

fn build_embed(
    report: &SuggestionEvent,
    text: &str,
    translation: Option<&Translation>,
    profile: Option<&SteamProfile>,
    source_lang: &str,
    backend_url: Option<&str>,
) -> serde_json::Value {
    let persona = profile
        .map(|p| p.persona_name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("[{}]", report.steam_id - LEGACY_ID_OFFSET));
    let author_name = match report.supporter_level {
        Some(level) => format!("{{{level}}}  {persona}"),
        None => persona,
    };

    let mut embed = json!({
        "description": format!("```{text}```"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "author": {
            "name": author_name,
            "url": format!("https://steamcommunity.com/profiles/{}", report.steam_id),
            "icon_url": profile.map(|p| p.avatar_url.clone()).unwrap_or_default(),
        },
    });

    let mut fields = Vec::new();
    if let Some(t) = translation {
        let code = t.detected_language_code.as_str();
        if code != source_lang && code != UNDETERMINED_LANG && t.translated_text.trim() != text {
            fields.push(json!({
                "name": format!("Translation from **{}**", code.to_uppercase()),
                "value": format!("```{}```", t.translated_text),
            }));
        }
    }
    if let Some(backend) = backend_url {
        let mut links = format!(
            "[Player Profile]({backend}/players/{})",
            report.steam_id
        );
        if let Some(match_id) = report.match_id {
            links.push_str(&format!(" | [Match]({backend}/matches/details/{match_id})"));
        }
        fields.push(json!({ "name": "Links", "value": links }));
    }
    if !fields.is_empty() {
        embed["fields"] = serde_json::Value::Array(fields);
    }
    embed
}
