//! In-memory cache implementation with LRU eviction.
//!
//! Keys that belong to an owner (see `timemate_core::cache::list_key`) are
//! also recorded in a per-owner index, so dropping everything for an owner
//! touches only that owner's keys instead of scanning the store.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use uuid::Uuid;

use timemate_core::cache::{
    extract_owner_id_from_key, extract_owner_id_from_pattern, pattern_matches, Cache, Result,
};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// The LRU store and its per-owner index. Both live behind one lock so a
/// key present in the store is always present in the index.
#[derive(Debug)]
struct CacheState {
    store: LruCache<String, CacheEntry>,
    /// owner_id -> keys cached for that owner.
    tracking: HashMap<Uuid, HashSet<String>>,
}

impl CacheState {
    fn track(&mut self, key: &str) {
        if let Some(owner_id) = extract_owner_id_from_key(key) {
            self.tracking.entry(owner_id).or_default().insert(key.to_string());
        }
    }

    fn untrack(&mut self, key: &str) {
        let Some(owner_id) = extract_owner_id_from_key(key) else {
            return;
        };
        if let Some(tracked) = self.tracking.get_mut(&owner_id) {
            tracked.remove(key);
            if tracked.is_empty() {
                self.tracking.remove(&owner_id);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        self.store.pop(key);
        self.untrack(key);
    }
}

/// In-memory cache with lazy TTL expiry and LRU eviction.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    state: Arc<RwLock<CacheState>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values. Zero is treated as one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(RwLock::new(CacheState {
                store: LruCache::new(capacity),
                tracking: HashMap::new(),
            })),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut state = self.state.write().await;
        let expired = match state.store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            state.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut state = self.state.write().await;
        let evicted = state
            .store
            .push(key.to_string(), CacheEntry::new(value.to_vec(), ttl));

        // push returns the evicted LRU entry (or the old value for this key).
        if let Some((evicted_key, _)) = evicted.filter(|(k, _)| k != key) {
            state.untrack(&evicted_key);
        }
        state.track(key);

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.state.write().await.remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut state = self.state.write().await;

        let Some(owner_id) = extract_owner_id_from_pattern(pattern) else {
            // Not an owner pattern: full scan.
            let keys: Vec<String> = state
                .store
                .iter()
                .filter(|(key, _)| pattern_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &keys {
                state.remove(key);
            }
            return Ok(());
        };

        let tracked = state.tracking.remove(&owner_id).unwrap_or_default();
        for key in &tracked {
            state.store.pop(key);
        }

        tracing::trace!(owner_id = %owner_id, keys = tracked.len(), "dropped owner cache keys");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timemate_core::cache::{list_key, owner_pattern, CachedView};

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("health", b"ok", None).await.unwrap();

        assert_eq!(cache.get("health").await.unwrap(), Some(b"ok".to_vec()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiration_untracks_key() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let owner = Uuid::new_v4();
        let key = list_key(CachedView::TaskList, owner, None);

        cache
            .set(&key, b"page", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.state.read().await.tracking.get(&owner).is_none());
    }

    #[tokio::test]
    async fn test_owner_pattern_drops_only_that_owner() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let alice_tasks = list_key(CachedView::TaskList, alice, None);
        let alice_days = list_key(CachedView::TimeEntriesByDay, alice, Some("ordering=day"));
        let bob_tasks = list_key(CachedView::TaskList, bob, None);

        cache.set(&alice_tasks, b"1", None).await.unwrap();
        cache.set(&alice_days, b"2", None).await.unwrap();
        cache.set(&bob_tasks, b"3", None).await.unwrap();

        cache.delete_pattern(&owner_pattern(alice)).await.unwrap();

        assert!(cache.get(&alice_tasks).await.unwrap().is_none());
        assert!(cache.get(&alice_days).await.unwrap().is_none());
        assert!(cache.get(&bob_tasks).await.unwrap().is_some());
        assert!(cache.state.read().await.tracking.get(&alice).is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_from_tracking() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let owner = Uuid::new_v4();
        let key = list_key(CachedView::TimeEntryList, owner, None);

        cache.set(&key, b"page", None).await.unwrap();
        assert!(cache.state.read().await.tracking[&owner].contains(&key));

        cache.delete(&key).await.unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.state.read().await.tracking.get(&owner).is_none());
    }

    #[tokio::test]
    async fn test_non_owner_pattern_falls_back_to_scan() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let owner = Uuid::new_v4();
        let tasks = list_key(CachedView::TaskList, owner, None);
        let entries = list_key(CachedView::TimeEntryList, owner, None);

        cache.set(&tasks, b"1", None).await.unwrap();
        cache.set(&entries, b"2", None).await.unwrap();

        cache.delete_pattern("task_list:*").await.unwrap();

        assert!(cache.get(&tasks).await.unwrap().is_none());
        assert!(cache.get(&entries).await.unwrap().is_some());
        assert!(!cache.state.read().await.tracking[&owner].contains(&tasks));
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("k", b"first", None).await.unwrap();
        cache.set("k", b"second", None).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction_untracks_evicted_key() {
        let cache = MemoryCache::new(2);
        let owner = Uuid::new_v4();
        let first = list_key(CachedView::TaskList, owner, Some("page=1"));
        let second = list_key(CachedView::TaskList, owner, Some("page=2"));
        let third = list_key(CachedView::TaskList, owner, Some("page=3"));

        cache.set(&first, b"1", None).await.unwrap();
        cache.set(&second, b"2", None).await.unwrap();
        // Touch first so second is least recently used.
        cache.get(&first).await.unwrap();
        cache.set(&third, b"3", None).await.unwrap();

        assert!(cache.get(&first).await.unwrap().is_some());
        assert!(cache.get(&second).await.unwrap().is_none());
        assert!(cache.get(&third).await.unwrap().is_some());
        assert!(!cache.state.read().await.tracking[&owner].contains(&second));
    }

    #[tokio::test]
    async fn test_zero_max_entries_holds_one_value() {
        let cache = MemoryCache::new(0);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_expiry_and_set_keep_live_keys_tracked() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let owner = Uuid::new_v4();
        let keys: Vec<String> = (0..16)
            .map(|i| list_key(CachedView::TaskList, owner, Some(format!("page={i}").as_str())))
            .collect();

        for key in &keys {
            cache.set(key, b"old", Some(Duration::from_millis(1))).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Readers drop the expired keys while writers repopulate them.
        let mut handles = Vec::new();
        for key in keys.clone() {
            let reader = cache.clone();
            let reader_key = key.clone();
            handles.push(tokio::spawn(async move {
                reader.get(&reader_key).await.unwrap();
            }));
            let writer = cache.clone();
            handles.push(tokio::spawn(async move {
                writer.set(&key, b"new", None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        {
            let state = cache.state.read().await;
            for key in &keys {
                assert!(state.store.contains(key));
                assert!(state.tracking[&owner].contains(key), "{key} lost its tracking entry");
            }
        }

        cache.delete_pattern(&owner_pattern(owner)).await.unwrap();
        for key in &keys {
            assert!(cache.get(key).await.unwrap().is_none());
        }
    }
}
