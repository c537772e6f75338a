//! Business-rule validators for task and time entry writes.
//!
//! The pure checks take plain values. The checks that need to look something
//! up take the repository as an argument so the caller decides which store
//! backs them. Each rule fails with its own [`ValidationError`] variant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::storage::{RepositoryError, TaskRepository};

use super::error::{PermissionError, Result, TrackingError, ValidationError};
use super::types::{Owned, Task, User};

pub const TASK_NAME_MIN: usize = 2;
pub const TASK_NAME_MAX: usize = 200;
pub const TASK_DESCRIPTION_MIN: usize = 2;
pub const TASK_DESCRIPTION_MAX: usize = 1000;

/// A task given either by id or already loaded.
#[derive(Debug, Clone)]
pub enum TaskReference {
    Id(Uuid),
    Resolved(Task),
}

impl From<Uuid> for TaskReference {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<Task> for TaskReference {
    fn from(task: Task) -> Self {
        Self::Resolved(task)
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> std::result::Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::invalid(
            field,
            format!("Ensure this field has at least {min} characters."),
        ));
    }
    if len > max {
        return Err(ValidationError::invalid(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

/// Checks the length bounds of a task name.
pub fn validate_task_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::invalid("name", "This field may not be blank."));
    }
    check_length("name", name, TASK_NAME_MIN, TASK_NAME_MAX)
}

/// Checks the length bounds of an optional task description.
pub fn validate_task_description(
    description: Option<&str>,
) -> std::result::Result<(), ValidationError> {
    match description {
        Some(d) => check_length(
            "description",
            d,
            TASK_DESCRIPTION_MIN,
            TASK_DESCRIPTION_MAX,
        ),
        None => Ok(()),
    }
}

/// Fails unless `end` is strictly after `start`.
pub fn validate_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> std::result::Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Fails unless `principal` owns `resource`.
pub fn ensure_owner<T: Owned>(
    resource: &T,
    principal: &User,
) -> std::result::Result<(), PermissionError> {
    if resource.owner_id() != principal.id {
        return Err(PermissionError::NotOwner {
            entity_type: T::ENTITY_TYPE,
            id: resource.id(),
        });
    }
    Ok(())
}

/// Fails when `owner` already has a task called exactly `name`.
///
/// Callers updating a task must only call this when the name changes.
pub async fn unique_owner_for_task_name<R>(repo: &R, owner: &User, name: &str) -> Result<()>
where
    R: TaskRepository + ?Sized,
{
    if repo.find_task_by_name(owner.id, name).await?.is_some() {
        return Err(ValidationError::DuplicateTaskName {
            username: owner.username.clone(),
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Loads the referenced task, failing with `task_not_found` when it is gone.
pub async fn resolve_task_or_fail<R>(repo: &R, reference: TaskReference) -> Result<Task>
where
    R: TaskRepository + ?Sized,
{
    match reference {
        TaskReference::Resolved(task) => Ok(task),
        TaskReference::Id(task_id) => repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| ValidationError::TaskNotFound { task_id }.into()),
    }
}

/// Resolves the referenced task and checks it belongs to `principal`.
pub async fn validate_task_ownership<R>(
    repo: &R,
    reference: TaskReference,
    principal: &User,
) -> Result<Task>
where
    R: TaskRepository + ?Sized,
{
    let task = resolve_task_or_fail(repo, reference).await?;
    if task.owner_id != principal.id {
        return Err(ValidationError::TaskInvalidOwner { task_id: task.id }.into());
    }
    Ok(task)
}

/// Re-reports a store constraint violation on a task write as `unique_task_name`.
///
/// The pre-write name check can race with a concurrent insert; the unique
/// index is the final authority and its rejection must look the same.
pub fn translate_task_write_error(error: RepositoryError, owner: &User, name: &str) -> TrackingError {
    match error {
        RepositoryError::AlreadyExists { .. } => ValidationError::DuplicateTaskName {
            username: owner.username.clone(),
            name: name.to_string(),
        }
        .into(),
        other => other.into(),
    }
}

/// Re-reports store constraint violations on a time entry write.
///
/// A check failure is `invalid_time_range`; a dangling task reference (the
/// task was deleted after it was validated) is `task_not_found`.
pub fn translate_time_entry_write_error(
    error: RepositoryError,
    task_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> TrackingError {
    match error {
        RepositoryError::InvalidData(_) => ValidationError::InvalidTimeRange { start, end }.into(),
        RepositoryError::MissingReference(_) => ValidationError::TaskNotFound { task_id }.into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TaskFilter;
    use crate::storage;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// Task store backed by a fixed list.
    struct FixedTasks(Vec<Task>);

    #[async_trait]
    impl TaskRepository for FixedTasks {
        async fn get_task(&self, id: Uuid) -> storage::Result<Option<Task>> {
            Ok(self.0.iter().find(|t| t.id == id).cloned())
        }

        async fn find_task_by_name(
            &self,
            owner_id: Uuid,
            name: &str,
        ) -> storage::Result<Option<Task>> {
            Ok(self
                .0
                .iter()
                .find(|t| t.owner_id == owner_id && t.name == name)
                .cloned())
        }

        async fn list_tasks(&self, filter: &TaskFilter) -> storage::Result<Vec<Task>> {
            Ok(self.0.iter().filter(|t| filter.matches(t)).cloned().collect())
        }

        async fn create_task(&self, _task: &Task) -> storage::Result<()> {
            Ok(())
        }

        async fn update_task(&self, _task: &Task) -> storage::Result<()> {
            Ok(())
        }

        async fn delete_task(&self, _id: Uuid) -> storage::Result<()> {
            Ok(())
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_time_range_requires_strict_order() {
        assert!(validate_time_range(at(9), at(10)).is_ok());

        let equal = validate_time_range(at(9), at(9)).unwrap_err();
        assert_eq!(equal.code(), "invalid_time_range");

        let reversed = validate_time_range(at(10), at(9)).unwrap_err();
        assert_eq!(reversed.code(), "invalid_time_range");
    }

    #[test]
    fn test_validate_task_name_bounds() {
        assert!(validate_task_name("ok").is_ok());
        assert!(validate_task_name(&"x".repeat(200)).is_ok());

        let short = validate_task_name("x").unwrap_err();
        assert_eq!(short.code(), "invalid");
        assert_eq!(short.field(), "name");

        assert!(validate_task_name(&"x".repeat(201)).is_err());
        assert!(validate_task_name("   ").is_err());
    }

    #[test]
    fn test_validate_task_description_bounds() {
        assert!(validate_task_description(None).is_ok());
        assert!(validate_task_description(Some("ok")).is_ok());

        let error = validate_task_description(Some("x")).unwrap_err();
        assert_eq!(error.field(), "description");
        assert!(validate_task_description(Some(&"x".repeat(1001))).is_err());
    }

    #[test]
    fn test_ensure_owner() {
        let alice = User::new("alice", "alice@example.com");
        let bob = User::new("bob", "bob@example.com");
        let task = Task::new(alice.id, "Write report");

        assert!(ensure_owner(&task, &alice).is_ok());
        assert_eq!(
            ensure_owner(&task, &bob),
            Err(PermissionError::NotOwner {
                entity_type: "Task",
                id: task.id,
            })
        );
    }

    #[tokio::test]
    async fn test_unique_owner_for_task_name() {
        let alice = User::new("alice", "alice@example.com");
        let bob = User::new("bob", "bob@example.com");
        let repo = FixedTasks(vec![Task::new(alice.id, "Write Report")]);

        let err = unique_owner_for_task_name(&repo, &alice, "Write Report")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TrackingError::Validation(ValidationError::DuplicateTaskName {
                username: "alice".to_string(),
                name: "Write Report".to_string(),
            })
        );

        // Same name under another owner is fine, and matching is exact.
        assert!(unique_owner_for_task_name(&repo, &bob, "Write Report")
            .await
            .is_ok());
        assert!(unique_owner_for_task_name(&repo, &alice, "write report")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_validate_task_ownership() {
        let alice = User::new("alice", "alice@example.com");
        let bob = User::new("bob", "bob@example.com");
        let task = Task::new(alice.id, "Write Report");
        let repo = FixedTasks(vec![task.clone()]);

        let resolved = validate_task_ownership(&repo, task.id.into(), &alice)
            .await
            .unwrap();
        assert_eq!(resolved, task);

        let err = validate_task_ownership(&repo, task.id.into(), &bob)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TrackingError::Validation(ValidationError::TaskInvalidOwner { task_id: task.id })
        );

        let missing = Uuid::new_v4();
        let err = validate_task_ownership(&repo, missing.into(), &alice)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TrackingError::Validation(ValidationError::TaskNotFound { task_id: missing })
        );
    }

    #[tokio::test]
    async fn test_resolve_task_skips_lookup_for_loaded_task() {
        let task = Task::new(Uuid::new_v4(), "Detached");
        let repo = FixedTasks(vec![]);

        let resolved = resolve_task_or_fail(&repo, task.clone().into()).await.unwrap();
        assert_eq!(resolved, task);
    }

    #[test]
    fn test_translate_write_errors() {
        let alice = User::new("alice", "alice@example.com");
        let conflict = RepositoryError::AlreadyExists {
            entity_type: "Task",
            id: "Write Report".to_string(),
        };
        let err = translate_task_write_error(conflict, &alice, "Write Report");
        assert!(matches!(
            err,
            TrackingError::Validation(ValidationError::DuplicateTaskName { .. })
        ));

        let check = RepositoryError::InvalidData("CHECK constraint failed".to_string());
        let err = translate_time_entry_write_error(check, Uuid::new_v4(), at(10), at(9));
        assert!(matches!(
            err,
            TrackingError::Validation(ValidationError::InvalidTimeRange { .. })
        ));

        let outage = RepositoryError::ConnectionFailed("down".to_string());
        let err = translate_task_write_error(outage.clone(), &alice, "x");
        assert_eq!(err, TrackingError::Repository(outage));
    }

    #[test]
    fn test_dangling_task_reference_is_task_not_found() {
        let task_id = Uuid::new_v4();
        let dangling = RepositoryError::MissingReference(format!("task {task_id}"));

        let err = translate_time_entry_write_error(dangling, task_id, at(9), at(10));

        assert_eq!(err, TrackingError::Validation(ValidationError::TaskNotFound { task_id }));
        if let TrackingError::Validation(e) = &err {
            assert_eq!(e.code(), "task_not_found");
        }
    }
}
