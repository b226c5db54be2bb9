//! Batch flusher and flush scheduler.
//!
//! Once per tick, every configured source with a bound destination has its
//! buffer detached, translated in one batched call, rendered, chunked into
//! size-bounded segments, and sent in original order.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use translate_client::{TranslateClient, TranslateError, Translation};

use relay_core::render::{UNDETERMINED_LANG, render_line};
use relay_core::segment::chunk_lines;

use crate::app::SharedState;
use crate::destination::{ResolveChat, Sink};

/// Batched translation seam, implemented by the real client and by fakes
/// in tests.
pub(crate) trait BatchTranslate {
    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Vec<Translation>, TranslateError>;
}

impl BatchTranslate for TranslateClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Vec<Translation>, TranslateError> {
        TranslateClient::translate_batch(self, texts, target_lang).await
    }
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Fixed-period flush scheduler.
///
/// Ticks are serialized by construction: the loop awaits the full flush
/// before sleeping again, so two flushes never overlap. The per-source
/// atomic detach would make an overlap safe regardless, but one discipline
/// has to be picked and this is it.
pub async fn run(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();
    loop {
        let interval = state.config().await.flush_interval_secs;
        if sleep_or_cancel(&shutdown_token, Duration::from_secs(interval)).await {
            tracing::info!("Flush loop stopped (shutdown)");
            return;
        }
        flush_all(&state).await;
    }
}

/// Flush every configured source once. Failures are contained per source.
pub async fn flush_all(state: &SharedState) {
    let keys = state.config().await.source_keys.clone();
    for key in &keys {
        flush_source(state, key, state.destinations(), state.translator()).await;
    }
}

async fn flush_source<R, T>(state: &SharedState, key: &str, destinations: &R, translator: &T)
where
    R: ResolveChat,
    T: BatchTranslate,
{
    // No destination: leave the buffer attached so nothing is lost while
    // the binding is missing. It grows until one is configured.
    let Some(sink) = destinations.chat_sink(key) else {
        let pending = state.queues().len(key);
        if pending > 0 {
            tracing::debug!(
                source_key = key,
                pending,
                "No chat destination bound; retaining buffer"
            );
        }
        return;
    };

    let batch = state.queues().detach(key);
    if batch.is_empty() {
        return;
    }

    let (source_lang, target_lang, max_chars, translation_configured) = {
        let config = state.config().await;
        (
            config.source_lang.clone(),
            config.target_lang.clone(),
            config.max_segment_chars,
            config.translation_configured(),
        )
    };

    let texts: Vec<String> = batch.iter().map(|m| m.text.clone()).collect();
    let translations = if translation_configured {
        match translator.translate_batch(&texts, &target_lang).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(
                    source_key = key,
                    error = %e,
                    "Translation failed; relaying untranslated"
                );
                identity_translations(&texts)
            }
        }
    } else {
        identity_translations(&texts)
    };

    let lines: Vec<String> = batch
        .iter()
        .zip(&translations)
        .map(|(msg, t)| render_line(msg, &t.detected_language_code, &t.translated_text, &source_lang))
        .collect();
    let segments = chunk_lines(&lines, max_chars);

    tracing::info!(
        source_key = key,
        messages = batch.len(),
        segments = segments.len(),
        "Flushing chat batch"
    );

    // Sequential sends keep segment order; a failed segment is logged and
    // skipped, later segments and other sources still go out.
    for segment in &segments {
        if let Err(e) = sink.send(segment).await {
            tracing::error!(source_key = key, error = %e, "Failed to send chat segment");
        }
    }
}

/// Identity passthrough used when translation is unavailable. The
/// undetermined sentinel suppresses the translation suffix downstream.
fn identity_translations(texts: &[String]) -> Vec<Translation> {
    texts
        .iter()
        .map(|text| Translation {
            translated_text: text.clone(),
            detected_language_code: UNDETERMINED_LANG.into(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::AppConfig;
    use crate::destination::SinkError;
    use relay_core::event::{ChatEvent, ChatTimestamp};

    fn msg(key: &str, text: &str) -> ChatEvent {
        ChatEvent {
            source_key: key.into(),
            steam_id: 1,
            name: "p".into(),
            text: text.into(),
            time: ChatTimestamp::Epoch(1700000000.0),
            anon: false,
            supporter_level: None,
        }
    }

    /// Records every send instead of posting anywhere.
    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Sink for RecordingSink {
        async fn send(&self, content: &str) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    struct FakeResolver {
        sink: RecordingSink,
    }

    impl ResolveChat for FakeResolver {
        type Sink = RecordingSink;

        fn chat_sink(&self, _source_key: &str) -> Option<RecordingSink> {
            Some(self.sink.clone())
        }
    }

    /// Returns the given detection codes, or fails outright.
    struct FakeTranslator {
        codes: Vec<&'static str>,
        fail: bool,
    }

    impl BatchTranslate for FakeTranslator {
        async fn translate_batch(
            &self,
            texts: &[String],
            _target_lang: &str,
        ) -> Result<Vec<Translation>, TranslateError> {
            if self.fail {
                return Err(TranslateError::ApiError {
                    status: 503,
                    message: "backend unavailable".into(),
                });
            }
            Ok(texts
                .iter()
                .zip(&self.codes)
                .map(|(text, code)| Translation {
                    translated_text: format!("{text} (translated)"),
                    detected_language_code: (*code).into(),
                })
                .collect())
        }
    }

    fn state_with_translation(key: &str) -> SharedState {
        let config = AppConfig {
            source_keys: vec![key.into()],
            translate_api_key: "test-key".into(),
            ..AppConfig::default()
        };
        SharedState::new(config)
    }

    #[test]
    fn identity_translations_use_the_sentinel() {
        let texts = vec!["one".to_string(), "two".to_string()];
        let translations = identity_translations(&texts);
        assert_eq!(translations.len(), 2);
        assert_eq!(translations[0].translated_text, "one");
        assert!(
            translations
                .iter()
                .all(|t| t.detected_language_code == UNDETERMINED_LANG)
        );
    }

    #[tokio::test]
    async fn long_batch_is_sent_as_ordered_segments() {
        let state = state_with_translation("emberfall");
        state.queues().append(msg("emberfall", &"a".repeat(500)));
        state.queues().append(msg("emberfall", &"b".repeat(500)));
        state.queues().append(msg("emberfall", &"c".repeat(900)));

        let resolver = FakeResolver {
            sink: RecordingSink::default(),
        };
        let translator = FakeTranslator {
            codes: vec!["en", "en", "en"],
            fail: false,
        };
        flush_source(&state, "emberfall", &resolver, &translator).await;

        // First two lines share a segment, the third overflows into its own.
        let sent = resolver.sink.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains(&"a".repeat(500)));
        assert!(sent[0].contains(&"b".repeat(500)));
        assert!(!sent[0].contains(&"c".repeat(900)));
        assert!(sent[1].contains(&"c".repeat(900)));
        assert!(state.queues().is_empty("emberfall"));
    }

    #[tokio::test]
    async fn foreign_line_carries_suffix_in_sent_segment() {
        let state = state_with_translation("emberfall");
        state.queues().append(msg("emberfall", "hello"));
        state.queues().append(msg("emberfall", "bonjour"));

        let resolver = FakeResolver {
            sink: RecordingSink::default(),
        };
        let translator = FakeTranslator {
            codes: vec!["en", "fr"],
            fail: false,
        };
        flush_source(&state, "emberfall", &resolver, &translator).await;

        let sent = resolver.sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("(TL [**fr**]: bonjour (translated))"));
        assert_eq!(sent[0].matches("(TL").count(), 1);
    }

    #[tokio::test]
    async fn translator_outage_relays_every_message_untranslated() {
        let state = state_with_translation("emberfall");
        for text in ["one", "two", "three"] {
            state.queues().append(msg("emberfall", text));
        }

        let resolver = FakeResolver {
            sink: RecordingSink::default(),
        };
        let translator = FakeTranslator {
            codes: vec![],
            fail: true,
        };
        flush_source(&state, "emberfall", &resolver, &translator).await;

        let sent = resolver.sink.sent();
        assert_eq!(sent.len(), 1);
        let first = sent[0].find("one").unwrap();
        let second = sent[0].find("two").unwrap();
        let third = sent[0].find("three").unwrap();
        assert!(first < second && second < third);
        assert!(!sent[0].contains("(TL"));
        assert!(state.queues().is_empty("emberfall"));
    }

    #[tokio::test]
    async fn unbound_destination_retains_the_buffer() {
        let config = AppConfig {
            source_keys: vec!["emberfall".into()],
            ..AppConfig::default()
        };
        let state = SharedState::new(config);
        state.queues().append(msg("emberfall", "one"));
        state.queues().append(msg("emberfall", "two"));

        flush_all(&state).await;

        assert_eq!(state.queues().len("emberfall"), 2);
    }

    #[tokio::test]
    async fn empty_buffer_sends_nothing() {
        let mut config = AppConfig {
            source_keys: vec!["emberfall".into()],
            ..AppConfig::default()
        };
        config
            .chat_webhooks
            .insert("emberfall".into(), "https://example.invalid/hook".into());
        let state = SharedState::new(config);

        // Bound destination but nothing buffered: returns before any I/O.
        flush_all(&state).await;
        assert!(state.queues().is_empty("emberfall"));
    }
}
