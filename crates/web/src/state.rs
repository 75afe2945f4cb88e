//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::WebConfig;
use crate::storage::AvatarStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the avatar store and the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
    avatars: AvatarStore,
}

impl AppState {
    /// Create a new application state from loaded configuration.
    #[must_use]
    pub fn new(config: WebConfig) -> Self {
        let api = ApiClient::new(&config.api_url);
        let avatars = AvatarStore::new(&config.data_dir);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                avatars,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the avatar store.
    #[must_use]
    pub fn avatars(&self) -> &AvatarStore {
        &self.inner.avatars
    }
}
