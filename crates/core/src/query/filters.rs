//! Store-level filters.
//!
//! Every filter is built from an owner id, so a query can never be issued
//! without a principal. Backends either translate a filter into their own
//! query language or evaluate [`TaskFilter::matches`] /
//! [`TimeEntryFilter::matches`] directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::tracking::{Task, TimeEntry};

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn within(value: DateTime<Utc>, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> bool {
    after.is_none_or(|a| value >= a) && before.is_none_or(|b| value <= b)
}

/// Filter over an owner's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub owner_id: Uuid,
    /// Substring of the task name, case-insensitive.
    pub name: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            name: None,
            created_after: None,
            created_before: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.owner_id == self.owner_id
            && self
                .name
                .as_deref()
                .is_none_or(|n| contains_ignore_case(&task.name, n))
            && within(task.created_at, self.created_after, self.created_before)
    }
}

/// Filter over an owner's time entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryFilter {
    pub owner_id: Uuid,
    pub task_id: Option<Uuid>,
    /// Substring of the referenced task's name, case-insensitive.
    pub task_name: Option<String>,
    pub start_after: Option<DateTime<Utc>>,
    pub start_before: Option<DateTime<Utc>>,
    pub end_after: Option<DateTime<Utc>>,
    pub end_before: Option<DateTime<Utc>>,
}

impl TimeEntryFilter {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            task_id: None,
            task_name: None,
            start_after: None,
            start_before: None,
            end_after: None,
            end_before: None,
        }
    }

    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Evaluates the filter. `task_name` is the name of the entry's task.
    pub fn matches(&self, entry: &TimeEntry, task_name: &str) -> bool {
        entry.owner_id == self.owner_id
            && self.task_id.is_none_or(|id| entry.task_id == id)
            && self
                .task_name
                .as_deref()
                .is_none_or(|n| contains_ignore_case(task_name, n))
            && within(entry.start_time, self.start_after, self.start_before)
            && within(entry.end_time, self.end_after, self.end_before)
    }
}
