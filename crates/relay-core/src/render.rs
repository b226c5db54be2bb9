//! Chat line rendering for Discord-flavored markdown output.

use crate::event::{ChatEvent, ChatTimestamp};

/// SteamID64 base offset; subtracting it recovers the legacy 32-bit id
/// shown in-game.
pub const LEGACY_ID_OFFSET: i64 = 76561197960265728;

/// BCP-47 code for an undetermined language. Used as the detection result
/// when translation was unavailable; never produces a translation suffix.
pub const UNDETERMINED_LANG: &str = "und";

/// Render one chat line.
///
/// Identity is bold for normal senders and italic for anonymous ones, with
/// the supporter level as an optional `{n}` annotation. The translation
/// suffix is appended only when the detected language is neither the
/// configured source language nor the undetermined sentinel.
pub fn render_line(
    msg: &ChatEvent,
    detected_lang: &str,
    translated_text: &str,
    source_lang: &str,
) -> String {
    let identity = match msg.supporter_level {
        Some(level) if !msg.anon => format!("**<{} {{{level}}}>**", msg.name),
        Some(level) => format!("*<{} {{{level}}}>*", msg.name),
        None if !msg.anon => format!("**<{}>**", msg.name),
        None => format!("*<{}>*", msg.name),
    };

    let time = render_timestamp(&msg.time);
    let legacy_id = msg.steam_id - LEGACY_ID_OFFSET;

    let mut line = format!("{time} [{legacy_id}] {identity} **:** {}", msg.text);
    if detected_lang != source_lang && detected_lang != UNDETERMINED_LANG {
        line.push_str(&format!(" \t (TL [**{detected_lang}**]: {translated_text})"));
    }
    line
}

/// Literal timestamps pass through; epoch seconds become a Discord
/// relative timestamp.
pub fn render_timestamp(time: &ChatTimestamp) -> String {
    match time {
        ChatTimestamp::Literal(text) => text.clone(),
        ChatTimestamp::Epoch(secs) => format!("<t:{}:R>", *secs as i64),
    }
}
