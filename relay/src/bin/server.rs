//! Chat relay server binary.
//!
//! Starts the feed subscription, the event reader, and the flush
//! scheduler, then waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use chat_relay_lib::app::SharedState;
use chat_relay_lib::config::AppConfig;
use chat_relay_lib::feed::{FeedClient, FeedConfig};
use chat_relay_lib::{flush, reader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load_with_dotenv()?;
    tracing::info!(
        sources = config.source_keys.len(),
        flush_interval_secs = config.flush_interval_secs,
        "Starting chat relay"
    );
    if !config.translation_configured() {
        tracing::warn!("Translation API key not set; relaying without translation");
    }

    let feed_config = FeedConfig::with_default_topics(config.feed_url.clone());
    let state = SharedState::new(config);

    let (event_rx, feed_shutdown_tx) = FeedClient::connect(feed_config);

    let reader_state = state.clone();
    let reader_handle = tokio::spawn(async move { reader::run(reader_state, event_rx).await });

    let flush_state = state.clone();
    tokio::spawn(async move { flush::run(flush_state).await });

    tracing::info!("Chat relay running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    // Stop intake first, then run one final flush so buffered chat is not
    // lost on shutdown.
    let _ = feed_shutdown_tx.send(()).await;
    state.shutdown_token().cancel();
    reader_handle.abort();
    flush::flush_all(&state).await;

    tracing::info!("Chat relay stopped");
    Ok(())
}
