//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use timemate_core::query::{TaskFilter, TimeEntryFilter};
use timemate_core::storage::{
    RepositoryError, Result, TaskRepository, TimeEntryRepository, UserRepository,
};
use timemate_core::tracking::{Task, TimeEntry, User};

/// In-memory storage backend.
///
/// When both maps are needed, `tasks` is always locked before
/// `time_entries`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    time_entries: Arc<RwLock<HashMap<Uuid, TimeEntry>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(tasks: &HashMap<Uuid, Task>, task: &Task) -> bool {
    tasks
        .values()
        .any(|t| t.id != task.id && t.owner_id == task.owner_id && t.name == task.name)
}

fn check_time_entry(tasks: &HashMap<Uuid, Task>, entry: &TimeEntry) -> Result<()> {
    if entry.end_time <= entry.start_time {
        return Err(RepositoryError::InvalidData(
            "end_time must be greater than start_time".to_string(),
        ));
    }
    if !tasks.contains_key(&entry.task_id) {
        return Err(RepositoryError::MissingReference(format!(
            "task {} does not exist",
            entry.task_id
        )));
    }
    Ok(())
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn find_task_by_name(&self, owner_id: Uuid, name: &str) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .values()
            .find(|t| t.owner_id == owner_id && t.name == name)
            .cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn create_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                id: task.id.to_string(),
            });
        }
        if name_taken(&tasks, task) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                id: task.name.clone(),
            });
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Task",
                id: task.id.to_string(),
            });
        }
        if name_taken(&tasks, task) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                id: task.name.clone(),
            });
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let mut time_entries = self.time_entries.write().await;
        if tasks.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Task",
                id: id.to_string(),
            });
        }
        time_entries.retain(|_, e| e.task_id != id);
        Ok(())
    }
}

#[async_trait]
impl TimeEntryRepository for InMemoryRepository {
    async fn get_time_entry(&self, id: Uuid) -> Result<Option<TimeEntry>> {
        Ok(self.time_entries.read().await.get(&id).cloned())
    }

    async fn list_time_entries(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>> {
        let tasks = self.tasks.read().await;
        let time_entries = self.time_entries.read().await;
        Ok(time_entries
            .values()
            .filter(|e| {
                let task_name = tasks.get(&e.task_id).map_or("", |t| t.name.as_str());
                filter.matches(e, task_name)
            })
            .cloned()
            .collect())
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let tasks = self.tasks.read().await;
        let mut time_entries = self.time_entries.write().await;
        if time_entries.contains_key(&entry.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "TimeEntry",
                id: entry.id.to_string(),
            });
        }
        check_time_entry(&tasks, entry)?;
        time_entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let tasks = self.tasks.read().await;
        let mut time_entries = self.time_entries.write().await;
        if !time_entries.contains_key(&entry.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "TimeEntry",
                id: entry.id.to_string(),
            });
        }
        check_time_entry(&tasks, entry)?;
        time_entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete_time_entry(&self, id: Uuid) -> Result<()> {
        let mut time_entries = self.time_entries.write().await;
        if time_entries.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "TimeEntry",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.api_token == token).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(existing) = users
            .values()
            .find(|u| u.id == user.id || u.username == user.username || u.api_token == user.api_token)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: existing.username.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}
