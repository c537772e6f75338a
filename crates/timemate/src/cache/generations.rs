//! Per-owner invalidation counters.
//!
//! A response rendered while one of its owner's writes commits must not
//! outlive that write's invalidation. Readers note the owner's generation
//! before rendering and drop their own entry if it moved. Counters are
//! process-local; with a shared Redis cache, writes served by another
//! instance can still leave such an entry until its TTL runs out.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Generations {
    counters: RwLock<HashMap<Uuid, u64>>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The owner's current generation. Owners never written to are at 0.
    pub async fn current(&self, owner_id: Uuid) -> u64 {
        self.counters
            .read()
            .await
            .get(&owner_id)
            .copied()
            .unwrap_or_default()
    }

    /// Moves the owner to a new generation. Must run before the owner's
    /// cached views are deleted.
    pub async fn advance(&self, owner_id: Uuid) {
        let mut counters = self.counters.write().await;
        let generation = counters.entry(owner_id).or_default();
        *generation = generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_advance_is_per_owner() {
        let generations = Generations::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        generations.advance(alice).await;
        generations.advance(alice).await;

        assert_eq!(generations.current(alice).await, 2);
        assert_eq!(generations.current(bob).await, 0);
    }
}
