//! Owner-wide cache invalidation driven by change events.

use std::sync::Arc;

use async_trait::async_trait;

use timemate_core::cache::{owner_pattern, Cache};
use timemate_core::events::{ChangeEvent, ChangeListener};

use super::Generations;

/// Drops every cached view of the owner whose data just changed.
///
/// Invalidation is deliberately coarse: any write by an owner clears all of
/// that owner's cached views, whatever view or query produced them.
pub struct CacheInvalidator {
    cache: Arc<dyn Cache>,
    generations: Arc<Generations>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn Cache>, generations: Arc<Generations>) -> Self {
        Self { cache, generations }
    }
}

#[async_trait]
impl ChangeListener for CacheInvalidator {
    async fn on_change(&self, event: &ChangeEvent) {
        self.generations.advance(event.owner_id).await;
        let pattern = owner_pattern(event.owner_id);
        match self.cache.delete_pattern(&pattern).await {
            Ok(()) => tracing::debug!(
                owner_id = %event.owner_id,
                entity = ?event.entity,
                action = ?event.action,
                "Invalidated cached views"
            ),
            Err(err) => tracing::warn!(
                owner_id = %event.owner_id,
                error = %err,
                "Failed to invalidate cached views"
            ),
        }
    }
}
