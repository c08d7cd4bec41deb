//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::config::StorefrontConfig;
use crate::db::{CategoryRepository, RepositoryError};
use crate::models::Category;

/// Categories change rarely and appear on every page.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300);

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
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
            }),
        }
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

    /// All categories, served from a five-minute cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(categories) = self.inner.categories.get(&()).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(self.pool()).list().await?);
        self.inner.categories.insert((), Arc::clone(&categories)).await;
        Ok(categories)
    }
}
