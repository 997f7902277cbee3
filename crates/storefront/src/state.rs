//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the Madstore API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` pool backing the session store, checked by the
    ///   readiness probe; `None` when sessions live elsewhere (tests)
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: Option<PgPool>) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        Self {
            inner: Arc::new(AppStateInner { config, api, pool }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Madstore API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
