//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::auth::AuthProviderClient;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogCache;
use crate::services::checkout::CheckoutService;
use crate::services::shipping::{ShippingClient, ShippingError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogCache,
    shipping: ShippingClient,
    auth_provider: AuthProviderClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, ShippingError> {
        let catalog = CatalogCache::new(pool.clone());
        let shipping = ShippingClient::new(config.shipping.as_ref())?;
        let auth_provider = AuthProviderClient::new(&config.auth);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                shipping,
                auth_provider,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog read-through cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    /// Get a reference to the courier rate client.
    #[must_use]
    pub fn shipping(&self) -> &ShippingClient {
        &self.inner.shipping
    }

    /// Get a reference to the identity provider client.
    #[must_use]
    pub fn auth_provider(&self) -> &AuthProviderClient {
        &self.inner.auth_provider
    }

    /// Build a cart service bound to this state's pool and catalog.
    #[must_use]
    pub fn cart_service(&self) -> CartService<'_> {
        CartService::new(&self.inner.pool, &self.inner.catalog)
    }

    /// Build a checkout service bound to this state's pool and catalog.
    #[must_use]
    pub fn checkout_service(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.inner.pool, &self.inner.catalog, &self.inner.shipping)
    }
}
