use async_trait::async_trait;
use uuid::Uuid;

use crate::query::{TaskFilter, TimeEntryFilter};
use crate::tracking::{Task, TimeEntry, User};

use super::Result;

/// Repository for task operations.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Gets a task by its ID.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;

    /// Gets the owner's task with exactly this name.
    async fn find_task_by_name(&self, owner_id: Uuid, name: &str) -> Result<Option<Task>>;

    /// Lists tasks matching the filter. Order is unspecified.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Creates a new task. Fails with `AlreadyExists` on a duplicate `(owner, name)`.
    async fn create_task(&self, task: &Task) -> Result<()>;

    /// Updates an existing task.
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Deletes a task and every time entry that references it.
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}

/// Repository for time entry operations.
#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Gets a time entry by its ID.
    async fn get_time_entry(&self, id: Uuid) -> Result<Option<TimeEntry>>;

    /// Lists time entries matching the filter. Order is unspecified.
    async fn list_time_entries(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>>;

    /// Creates a new time entry. Fails with `InvalidData` unless end > start
    /// and with `MissingReference` when the task does not exist.
    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Updates an existing time entry.
    async fn update_time_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Deletes a time entry by its ID.
    async fn delete_time_entry(&self, id: Uuid) -> Result<()>;
}

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets the user holding this api token.
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>>;

    /// Creates a new user.
    async fn create_user(&self, user: &User) -> Result<()>;
}
