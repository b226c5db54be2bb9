//! Event reader: demultiplexes feed events into the chat queue or the
//! suggestion sink.

use tokio::sync::mpsc;

use relay_core::RelayEvent;

use crate::app::SharedState;
use crate::feed::FeedEvent;
use crate::suggestion;

/// Process events from the feed channel until it closes.
///
/// Chat events are buffered for the batch flusher; suggestion events are
/// forwarded immediately, one-by-one. A malformed payload is dropped with
/// a warning and never terminates the loop.
pub async fn run(state: SharedState, mut events: mpsc::Receiver<FeedEvent>) {
    while let Some(event) = events.recv().await {
        match RelayEvent::classify(&event.topic, &event.payload) {
            Ok(RelayEvent::Chat(chat)) => {
                tracing::debug!(
                    source_key = %chat.source_key,
                    steam_id = chat.steam_id,
                    "Buffered chat message"
                );
                state.queues().append(chat);
            }
            Ok(RelayEvent::Suggestion(report)) => {
                if let Err(e) = suggestion::handle(&state, &report).await {
                    tracing::warn!(
                        source_key = %report.source_key,
                        error = %e,
                        "Failed to relay suggestion"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(topic = %event.topic, error = %e, "Dropping malformed feed event");
            }
        }
    }
    tracing::info!("Feed event stream ended");
}
