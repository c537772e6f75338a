use std::{env, str::FromStr, time::Duration};

use timemate_core::query::PageSettings;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "timemate.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Page size when the request does not ask for one (default: 10)
    pub default_page_size: usize,
    /// Largest page size a request may ask for (default: 100)
    pub max_page_size: usize,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "timemate.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `DEFAULT_PAGE_SIZE` - Default list page size (default: 10)
    /// - `MAX_PAGE_SIZE` - Maximum list page size (default: 100)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env_or("CACHE_TTL_SECONDS", 300),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", 10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "timemate.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", 10),
            max_page_size: env_or("MAX_PAGE_SIZE", 100),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Page size limits for list views.
    pub fn page_settings(&self) -> PageSettings {
        let max_size = self.max_page_size.max(1);
        PageSettings {
            default_size: self.default_page_size.clamp(1, max_size),
            max_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
