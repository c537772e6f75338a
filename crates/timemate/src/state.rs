//! Application state shared by every handler.
//!
//! Handlers see repositories and the cache only as trait objects. The
//! concrete backends are picked by feature flags when the state is built.

use std::sync::Arc;
use std::time::Duration;

use timemate_core::cache::Cache;
use timemate_core::query::PageSettings;
use timemate_core::storage::{TaskRepository, TimeEntryRepository, UserRepository};

use crate::cache::{CacheInvalidator, Generations};
use crate::config::Config;
use crate::storage::NotifyingRepository;

/// Shared application state, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    /// Task repository. Writes invalidate the owner's cached views.
    pub tasks: Arc<dyn TaskRepository>,
    /// Time entry repository. Writes invalidate the owner's cached views.
    pub time_entries: Arc<dyn TimeEntryRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Rendered list responses.
    pub cache: Arc<dyn Cache>,
    /// Advanced by the invalidator on every write.
    pub generations: Arc<Generations>,
    pub cache_ttl: Duration,
    pub page_settings: PageSettings,
}

impl AppState {
    /// Wires a storage backend and a cache together.
    ///
    /// Task and time entry writes go through a [`NotifyingRepository`] whose
    /// only listener is the [`CacheInvalidator`].
    pub fn build<R>(repository: Arc<R>, cache: Arc<dyn Cache>, config: &Config) -> Self
    where
        R: TaskRepository + TimeEntryRepository + UserRepository + 'static,
    {
        let generations = Arc::new(Generations::new());
        let notifying = Arc::new(
            NotifyingRepository::new(repository.clone()).with_listener(Arc::new(
                CacheInvalidator::new(cache.clone(), generations.clone()),
            )),
        );

        Self {
            tasks: notifying.clone(),
            time_entries: notifying,
            users: repository,
            cache,
            generations,
            cache_ttl: config.cache_ttl(),
            page_settings: config.page_settings(),
        }
    }

    /// Opens the backends selected at compile time.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let repository = open_storage(config).await?;
        let cache = open_cache(config).await?;
        Ok(Self::build(repository, cache, config))
    }
}

#[cfg(feature = "inmemory")]
async fn open_storage(_config: &Config) -> anyhow::Result<Arc<crate::storage::InMemoryRepository>> {
    tracing::info!("Using in-memory storage");
    Ok(Arc::new(crate::storage::InMemoryRepository::new()))
}

#[cfg(feature = "sqlite")]
async fn open_storage(config: &Config) -> anyhow::Result<Arc<crate::storage::SqliteRepository>> {
    tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
    Ok(Arc::new(
        crate::storage::SqliteRepository::new(&config.sqlite_path).await?,
    ))
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(Arc::new(crate::cache::MemoryCache::new(
        config.cache_max_entries,
    )))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!(url = %config.redis_url, "Using Redis cache");
    Ok(Arc::new(
        crate::cache::RedisCache::new(&config.redis_url).await?,
    ))
}

#[cfg(test)]
impl AppState {
    /// In-memory state for tests, regardless of the enabled backends.
    pub fn for_tests() -> (Self, Arc<crate::storage::InMemoryRepository>) {
        let repository = Arc::new(crate::storage::InMemoryRepository::new());
        let cache = Arc::new(crate::cache::MemoryCache::new(1_000));
        let config = Config {
            cache_ttl_seconds: 300,
            cache_max_entries: 1_000,
            sqlite_path: String::new(),
            redis_url: String::new(),
            default_page_size: 10,
            max_page_size: 100,
        };
        (Self::build(repository.clone(), cache, &config), repository)
    }
}
