//! Repository decorator that announces committed writes.
//!
//! Reads pass straight through. Every successful create, update or delete
//! of a task or time entry is followed by a [`ChangeEvent`] delivered to each
//! registered listener before the call returns, so a caller that reads after
//! its own write never sees state from before it.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use timemate_core::events::{ChangeAction, ChangeEvent, ChangeListener, EntityKind};
use timemate_core::query::{TaskFilter, TimeEntryFilter};
use timemate_core::storage::{Result, TaskRepository, TimeEntryRepository};
use timemate_core::tracking::{Task, TimeEntry};

/// Wraps a repository and notifies listeners after each write.
pub struct NotifyingRepository<R>
where
    R: TaskRepository + TimeEntryRepository,
{
    repository: Arc<R>,
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl<R> NotifyingRepository<R>
where
    R: TaskRepository + TimeEntryRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners run in registration order.
    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    async fn notify(&self, owner_id: Uuid, entity: EntityKind, entity_id: Uuid, action: ChangeAction) {
        let event = ChangeEvent::new(owner_id, entity, entity_id, action);
        tracing::debug!(
            owner_id = %owner_id,
            entity = ?entity,
            entity_id = %entity_id,
            action = ?action,
            "change committed"
        );
        for listener in &self.listeners {
            listener.on_change(&event).await;
        }
    }
}

#[async_trait]
impl<R> TaskRepository for NotifyingRepository<R>
where
    R: TaskRepository + TimeEntryRepository + 'static,
{
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        self.repository.get_task(id).await
    }

    async fn find_task_by_name(&self, owner_id: Uuid, name: &str) -> Result<Option<Task>> {
        self.repository.find_task_by_name(owner_id, name).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.repository.list_tasks(filter).await
    }

    async fn create_task(&self, task: &Task) -> Result<()> {
        self.repository.create_task(task).await?;
        self.notify(task.owner_id, EntityKind::Task, task.id, ChangeAction::Created)
            .await;
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        self.repository.update_task(task).await?;
        self.notify(task.owner_id, EntityKind::Task, task.id, ChangeAction::Updated)
            .await;
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        // Owner is needed for the event and is gone after the delete.
        let task = self.repository.get_task(id).await?;
        self.repository.delete_task(id).await?;
        if let Some(task) = task {
            self.notify(task.owner_id, EntityKind::Task, id, ChangeAction::Deleted)
                .await;
        }
        Ok(())
    }
}

#[async_trait]
impl<R> TimeEntryRepository for NotifyingRepository<R>
where
    R: TaskRepository + TimeEntryRepository + 'static,
{
    async fn get_time_entry(&self, id: Uuid) -> Result<Option<TimeEntry>> {
        self.repository.get_time_entry(id).await
    }

    async fn list_time_entries(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>> {
        self.repository.list_time_entries(filter).await
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.repository.create_time_entry(entry).await?;
        self.notify(entry.owner_id, EntityKind::TimeEntry, entry.id, ChangeAction::Created)
            .await;
        Ok(())
    }

    async fn update_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.repository.update_time_entry(entry).await?;
        self.notify(entry.owner_id, EntityKind::TimeEntry, entry.id, ChangeAction::Updated)
            .await;
        Ok(())
    }

    async fn delete_time_entry(&self, id: Uuid) -> Result<()> {
        let entry = self.repository.get_time_entry(id).await?;
        self.repository.delete_time_entry(id).await?;
        if let Some(entry) = entry {
            self.notify(entry.owner_id, EntityKind::TimeEntry, id, ChangeAction::Deleted)
                .await;
        }
        Ok(())
    }
}
