//! Redis cache implementation.
//!
//! Owner keys are recorded in a Redis set (`user:{id}:_keys`) so an owner's
//! responses can be dropped with SMEMBERS + DEL instead of SCAN. The set
//! gets the same expiry as the newest key it tracks.
//!
//! None of this is atomic. A crash between commands leaves either a stale
//! member in the tracking set (DEL of a missing key is a no-op) or an
//! untracked key that still expires on its own TTL.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use timemate_core::cache::{
    extract_owner_id_from_key, extract_owner_id_from_pattern, owner_tracking_key,
    pattern_matches, Cache, Result,
};

use super::error::map_redis_error;

/// Redis cache backend using a connection manager.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis at `url` (e.g. `redis://localhost:6379`).
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.map(|d| d.as_secs().max(1));

        match seconds {
            Some(seconds) => conn
                .set_ex::<_, _, ()>(key, value, seconds)
                .await
                .map_err(map_redis_error)?,
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(map_redis_error)?,
        }

        if let Some(owner_id) = extract_owner_id_from_key(key) {
            let tracking_key = owner_tracking_key(owner_id);
            conn.sadd::<_, _, ()>(&tracking_key, key)
                .await
                .map_err(map_redis_error)?;
            if let Some(seconds) = seconds {
                conn.expire::<_, ()>(&tracking_key, seconds as i64)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        if let Some(owner_id) = extract_owner_id_from_key(key) {
            conn.srem::<_, _, ()>(owner_tracking_key(owner_id), key)
                .await
                .map_err(map_redis_error)?;
        }

        conn.del::<_, ()>(key).await.map_err(map_redis_error)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let Some(owner_id) = extract_owner_id_from_pattern(pattern) else {
            // Only owner keys are tracked.
            tracing::debug!(pattern, "ignoring untracked cache pattern");
            return Ok(());
        };

        let mut conn = self.conn.clone();
        let tracking_key = owner_tracking_key(owner_id);

        let tracked: Vec<String> = conn
            .smembers(&tracking_key)
            .await
            .map_err(map_redis_error)?;
        let keys: Vec<&String> = tracked
            .iter()
            .filter(|k| pattern_matches(pattern, k))
            .collect();

        if !keys.is_empty() {
            conn.del::<_, ()>(&keys).await.map_err(map_redis_error)?;
        }
        conn.del::<_, ()>(&tracking_key)
            .await
            .map_err(map_redis_error)?;

        tracing::trace!(owner_id = %owner_id, keys = keys.len(), "dropped owner cache keys");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timemate_core::cache::{list_key, owner_pattern, CachedView};
    use uuid::Uuid;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    #[tokio::test]
    async fn test_redis_set_get_delete() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("test:redis_cache:{}", Uuid::new_v4());
        let value: Vec<u8> = (0..=255).collect();

        cache.set(&key, &value, None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(value));

        cache.delete(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = list_key(CachedView::TaskList, Uuid::new_v4(), None);
        cache
            .set(&key, b"page", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_owner_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let alice_tasks = list_key(CachedView::TaskList, alice, None);
        let alice_entries = list_key(CachedView::TimeEntryList, alice, Some("page=2"));
        let bob_tasks = list_key(CachedView::TaskList, bob, None);

        cache.set(&alice_tasks, b"1", None).await.unwrap();
        cache.set(&alice_entries, b"2", None).await.unwrap();
        cache.set(&bob_tasks, b"3", None).await.unwrap();

        cache.delete_pattern(&owner_pattern(alice)).await.unwrap();

        assert!(cache.get(&alice_tasks).await.unwrap().is_none());
        assert!(cache.get(&alice_entries).await.unwrap().is_none());
        assert!(cache.get(&bob_tasks).await.unwrap().is_some());

        let mut conn = cache.conn.clone();
        let tracked: Vec<String> = conn.smembers(owner_tracking_key(alice)).await.unwrap();
        assert!(tracked.is_empty());

        cache.delete_pattern(&owner_pattern(bob)).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_delete_untracks_key() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let owner = Uuid::new_v4();
        let key = list_key(CachedView::TimeEntriesByDay, owner, None);
        let tracking_key = owner_tracking_key(owner);

        cache.set(&key, b"days", None).await.unwrap();
        let mut conn = cache.conn.clone();
        let tracked: Vec<String> = conn.smembers(&tracking_key).await.unwrap();
        assert!(tracked.contains(&key));

        cache.delete(&key).await.unwrap();

        let tracked: Vec<String> = conn.smembers(&tracking_key).await.unwrap();
        assert!(!tracked.contains(&key));
    }
}
