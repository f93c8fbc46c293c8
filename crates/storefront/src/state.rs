//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AuthConfig, PricingConfig, StorefrontConfig};
use crate::db::{Repositories, memory::MemoryStore};
use crate::services::auth::TokenService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repos: Repositories,
    tokens: TokenService,
    pricing: PricingConfig,
    pool: Option<PgPool>,
}

impl AppState {
    /// State backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: &StorefrontConfig, pool: PgPool) -> Self {
        Self::from_parts(
            Repositories::postgres(&pool),
            &config.auth,
            config.pricing,
            Some(pool),
        )
    }

    /// State backed by the in-memory store, for tests and local demos.
    #[must_use]
    pub fn in_memory(store: &Arc<MemoryStore>, auth: &AuthConfig, pricing: PricingConfig) -> Self {
        Self::from_parts(Repositories::memory(store), auth, pricing, None)
    }

    fn from_parts(
        repos: Repositories,
        auth: &AuthConfig,
        pricing: PricingConfig,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                repos,
                tokens: TokenService::new(auth),
                pricing,
                pool,
            }),
        }
    }

    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn pricing(&self) -> &PricingConfig {
        &self.inner.pricing
    }

    /// The database pool, absent for in-memory state.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
