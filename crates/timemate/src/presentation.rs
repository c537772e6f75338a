//! JSON representations of tasks, time entries and the grouped views.
//!
//! Each endpoint variant has its own shape. Representations that show the
//! owner go through [`expand_owner`], which swaps the owner id for the
//! owner's public profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use timemate_core::query::{DayGroup, TaskGroup};
use timemate_core::tracking::{format_duration, Task, TimeEntry, User};

pub fn task_url(id: Uuid) -> String {
    format!("/api/tasks/{id}/")
}

pub fn time_entry_url(id: Uuid) -> String {
    format!("/api/time-entries/{id}/")
}

/// Replaces the `owner` id in a representation with `{username, email}`.
pub fn expand_owner(mut representation: Value, owner: &User) -> Value {
    if let Some(object) = representation.as_object_mut() {
        object.insert(
            "owner".to_string(),
            json!({ "username": owner.username, "email": owner.email }),
        );
    }
    representation
}

fn to_value<T: Serialize>(representation: T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(representation)
}

#[derive(Debug, Serialize)]
struct TaskDetail<'a> {
    id: Uuid,
    name: &'a str,
    description: Option<&'a str>,
    created_at: DateTime<Utc>,
    owner: Uuid,
}

/// Task create, detail and update responses.
pub fn task_detail(task: &Task, owner: &User) -> Result<Value, serde_json::Error> {
    let detail = to_value(TaskDetail {
        id: task.id,
        name: &task.name,
        description: task.description.as_deref(),
        created_at: task.created_at,
        owner: task.owner_id,
    })?;
    Ok(expand_owner(detail, owner))
}

/// Compact task reference used in lists and inside time entries.
#[derive(Debug, Serialize)]
pub struct TaskSummary<'a> {
    name: &'a str,
    id: Uuid,
    detail_url: String,
}

impl<'a> TaskSummary<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self {
            name: &task.name,
            id: task.id,
            detail_url: task_url(task.id),
        }
    }
}

#[derive(Debug, Serialize)]
struct Timing {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration: String,
    duration_seconds: i64,
}

impl Timing {
    fn of(entry: &TimeEntry) -> Self {
        let duration = entry.duration();
        Self {
            start_time: entry.start_time,
            end_time: entry.end_time,
            duration: format_duration(duration),
            duration_seconds: duration.num_seconds(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TimeEntryCreated {
    id: Uuid,
    task: Uuid,
    #[serde(flatten)]
    timing: Timing,
    owner: Uuid,
}

/// Time entry create response.
pub fn time_entry_created(entry: &TimeEntry, owner: &User) -> Result<Value, serde_json::Error> {
    let created = to_value(TimeEntryCreated {
        id: entry.id,
        task: entry.task_id,
        timing: Timing::of(entry),
        owner: entry.owner_id,
    })?;
    Ok(expand_owner(created, owner))
}

/// Item of the flat time entry list.
#[derive(Debug, Serialize)]
pub struct TimeEntryListItem<'a> {
    id: Uuid,
    task: TaskSummary<'a>,
    #[serde(flatten)]
    timing: Timing,
    detail_url: String,
}

impl<'a> TimeEntryListItem<'a> {
    pub fn new(entry: &TimeEntry, task: &'a Task) -> Self {
        Self {
            id: entry.id,
            task: TaskSummary::new(task),
            timing: Timing::of(entry),
            detail_url: time_entry_url(entry.id),
        }
    }
}

#[derive(Debug, Serialize)]
struct TimeEntryDetail<'a> {
    id: Uuid,
    task: TaskSummary<'a>,
    #[serde(flatten)]
    timing: Timing,
    owner: Uuid,
    created_at: DateTime<Utc>,
}

/// Time entry detail and update responses.
pub fn time_entry_detail(
    entry: &TimeEntry,
    task: &Task,
    owner: &User,
) -> Result<Value, serde_json::Error> {
    let detail = to_value(TimeEntryDetail {
        id: entry.id,
        task: TaskSummary::new(task),
        timing: Timing::of(entry),
        owner: entry.owner_id,
        created_at: entry.created_at,
    })?;
    Ok(expand_owner(detail, owner))
}

/// A time entry nested inside a grouped view.
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    id: Uuid,
    #[serde(flatten)]
    timing: Timing,
    detail_url: String,
}

impl EntrySummary {
    fn new(entry: &TimeEntry) -> Self {
        Self {
            id: entry.id,
            timing: Timing::of(entry),
            detail_url: time_entry_url(entry.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskWithEntries<'a> {
    id: Uuid,
    name: &'a str,
    detail_url: String,
    entries: Vec<EntrySummary>,
}

impl<'a> TaskWithEntries<'a> {
    pub fn new(group: &'a TaskGroup) -> Self {
        Self {
            id: group.task.id,
            name: &group.task.name,
            detail_url: task_url(group.task.id),
            entries: group.entries.iter().map(EntrySummary::new).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayWithEntries {
    day: String,
    entries: Vec<EntrySummary>,
}

impl DayWithEntries {
    pub fn new(group: &DayGroup) -> Self {
        Self {
            day: group.day.format("%Y-%m-%d").to_string(),
            entries: group.entries.iter().map(EntrySummary::new).collect(),
        }
    }
}
