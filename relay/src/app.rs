use std::sync::Arc;

use relay_core::ChatQueues;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use translate_client::TranslateClient;

use crate::config::AppConfig;
use crate::destination::DestinationRegistry;

/// Application shared state, cloned into every task.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration
    config: RwLock<AppConfig>,
    /// Per-source chat buffers shared by reader and flusher
    queues: ChatQueues,
    /// Source key -> webhook sink bindings
    destinations: DestinationRegistry,
    /// Translation API client
    translator: TranslateClient,
    /// HTTP client for profile enrichment
    http: reqwest::Client,
    /// Cancellation for background loops
    shutdown: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let queues = ChatQueues::new(config.source_keys.iter().cloned());
        let destinations = DestinationRegistry::from_config(&config);
        let translator = TranslateClient::new(config.translate_api_key.clone());

        Self {
            inner: Arc::new(SharedStateInner {
                config: RwLock::new(config),
                queues,
                destinations,
                translator,
                http: reqwest::Client::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    pub fn queues(&self) -> &ChatQueues {
        &self.inner.queues
    }

    pub fn destinations(&self) -> &DestinationRegistry {
        &self.inner.destinations
    }

    pub fn translator(&self) -> &TranslateClient {
        &self.inner.translator
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
