//! Change notifications emitted after a successful write.
//!
//! The write path calls every registered [`ChangeListener`] once the store
//! has accepted the change and before the response is sent. Listeners are
//! infallible from the caller's point of view and must log their own
//! failures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    TimeEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// A committed change to an owner's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub owner_id: Uuid,
    pub entity: EntityKind,
    pub entity_id: Uuid,
    pub action: ChangeAction,
}

impl ChangeEvent {
    pub fn new(owner_id: Uuid, entity: EntityKind, entity_id: Uuid, action: ChangeAction) -> Self {
        Self {
            owner_id,
            entity,
            entity_id,
            action,
        }
    }
}

/// Receives change events.
#[async_trait]
pub trait ChangeListener: Send + Sync {
    async fn on_change(&self, event: &ChangeEvent);
}
