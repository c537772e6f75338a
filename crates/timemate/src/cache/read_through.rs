//! Read-through memoization of rendered responses.

use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use timemate_core::cache::Cache;

use super::Generations;

/// Returns the payload cached under `key`, rendering and storing it on a miss.
///
/// A hit is returned verbatim. Render errors are passed through and never
/// cached. Cache failures are logged and the payload is rendered as if the
/// cache were empty.
///
/// If `owner_id` was invalidated while rendering, the stored payload may
/// predate the write; it is deleted again so the next read renders afresh.
pub async fn read_through<F, Fut, E>(
    cache: &dyn Cache,
    generations: &Generations,
    owner_id: Uuid,
    key: &str,
    ttl: Duration,
    render: F,
) -> Result<Vec<u8>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>, E>>,
{
    match cache.get(key).await {
        Ok(Some(bytes)) => {
            tracing::trace!(key, "Cache hit");
            return Ok(bytes);
        }
        Ok(None) => tracing::trace!(key, "Cache miss"),
        Err(err) => tracing::warn!(key, error = %err, "Cache read failed"),
    }

    let generation = generations.current(owner_id).await;
    let bytes = render().await?;

    if let Err(err) = cache.set(key, &bytes, Some(ttl)).await {
        tracing::warn!(key, error = %err, "Failed to cache response");
        return Ok(bytes);
    }

    // Checked after the set: an invalidation that advanced the generation
    // earlier is caught here, a later one deletes the entry itself.
    if generations.current(owner_id).await != generation {
        tracing::debug!(key, "Owner changed while rendering, dropping cached response");
        if let Err(err) = cache.delete(key).await {
            tracing::warn!(key, error = %err, "Failed to drop stale response");
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = MemoryCache::new(10);
        let generations = Generations::new();
        let owner = Uuid::new_v4();
        let renders = AtomicUsize::new(0);
        let render = || async {
            renders.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(b"payload".to_vec())
        };

        let first = read_through(&cache, &generations, owner, "k", TTL, render)
            .await
            .unwrap();
        let second = read_through(&cache, &generations, owner, "k", TTL, render)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_render_error_is_not_cached() {
        let cache = MemoryCache::new(10);
        let generations = Generations::new();

        let result = read_through(&cache, &generations, Uuid::new_v4(), "k", TTL, || async {
            Err::<Vec<u8>, _>("boom")
        })
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_during_render_is_not_cached() {
        let cache = MemoryCache::new(10);
        let generations = Generations::new();
        let owner = Uuid::new_v4();

        // The owner's data changes after the render read it.
        let bytes = read_through(&cache, &generations, owner, "k", TTL, || async {
            generations.advance(owner).await;
            Ok::<_, ()>(b"before the write".to_vec())
        })
        .await
        .unwrap();

        assert_eq!(bytes, b"before the write".to_vec());
        assert_eq!(cache.get("k").await.unwrap(), None);

        read_through(&cache, &generations, owner, "k", TTL, || async {
            Ok::<_, ()>(b"after the write".to_vec())
        })
        .await
        .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"after the write".to_vec()));
    }
}
