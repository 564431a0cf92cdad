//! Shared application state for the back office.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::images::MediaClient;
use crate::services::provider::ProviderAdminClient;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    provider: ProviderAdminClient,
    media: MediaClient,
}

impl AppState {
    /// Build state from configuration and an established pool.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let provider = ProviderAdminClient::new(&config.auth);
        let media = MediaClient::new(&config.media);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                provider,
                media,
            }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Identity provider admin client.
    #[must_use]
    pub fn provider(&self) -> &ProviderAdminClient {
        &self.inner.provider
    }

    /// Image CDN client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }
}
