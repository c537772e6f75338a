//! Request payloads for task and time entry writes.
//!
//! Payload fields are all optional at the type level so a single type serves
//! create, full update and partial update. Which fields are required is
//! decided by the [`WriteMode`] the payload is applied with. Any `owner`
//! field a client sends is ignored; ownership always comes from the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serde::{deserialize_optional_string, deserialize_patch_string};

use super::error::ValidationError;
use super::types::{Task, TimeEntry};
use super::validation::{validate_task_description, validate_task_name, validate_time_range};

/// How a payload is applied to an existing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// PUT: every writable field must be present.
    Replace,
    /// PATCH: only the fields present are changed.
    Partial,
}

/// Body of task create and update requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` leaves the description alone, `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "deserialize_patch_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

/// Strips surrounding whitespace, reusing the allocation when there is none.
fn trimmed(value: String) -> String {
    if value.trim().len() == value.len() {
        value
    } else {
        value.trim().to_string()
    }
}

impl TaskPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Builds a new task owned by `owner_id`.
    ///
    /// Only shape rules run here. Name uniqueness needs the store and is
    /// checked by the caller.
    pub fn into_new_task(self, owner_id: Uuid) -> Result<Task, ValidationError> {
        let name = trimmed(self.name.ok_or(ValidationError::Required { field: "name" })?);
        let description = self.description.flatten().map(trimmed);
        validate_task_name(&name)?;
        validate_task_description(description.as_deref())?;

        let mut task = Task::new(owner_id, name);
        task.description = description;
        Ok(task)
    }

    /// Applies the payload to `task`, returning whether the name changed.
    pub fn apply_to(self, task: &mut Task, mode: WriteMode) -> Result<bool, ValidationError> {
        if mode == WriteMode::Replace && self.name.is_none() {
            return Err(ValidationError::Required { field: "name" });
        }

        let mut name_changed = false;
        if let Some(name) = self.name.map(trimmed) {
            validate_task_name(&name)?;
            name_changed = name != task.name;
            task.name = name;
        }
        if let Some(description) = self.description.map(|d| d.map(trimmed)) {
            validate_task_description(description.as_deref())?;
            task.description = description;
        }
        Ok(name_changed)
    }
}

/// Body of time entry create and update requests.
///
/// Values are kept as strings so a malformed one is reported against its
/// own field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeEntryPayload {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub task: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<String>,
}

/// A time entry payload with every present field parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTimeEntry {
    pub task: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Values a time entry will hold once an update is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryChanges {
    pub task_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub task_changed: bool,
}

impl TimeEntryPayload {
    pub fn new(task: Uuid, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            task: Some(task.to_string()),
            start_time: Some(start_time.to_rfc3339()),
            end_time: Some(end_time.to_rfc3339()),
        }
    }

    /// Parses the fields that are present.
    pub fn parse(&self) -> Result<ParsedTimeEntry, ValidationError> {
        let task = self
            .task
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| ValidationError::invalid("task", "Must be a valid UUID."))
            })
            .transpose()?;
        let start_time = self
            .start_time
            .as_deref()
            .map(|raw| parse_timestamp("start_time", raw))
            .transpose()?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|raw| parse_timestamp("end_time", raw))
            .transpose()?;

        Ok(ParsedTimeEntry {
            task,
            start_time,
            end_time,
        })
    }
}

impl ParsedTimeEntry {
    /// Checks required fields and the time range for a create.
    ///
    /// Returns `(task_id, start, end)`. Task ownership needs the store and is
    /// checked by the caller.
    pub fn for_create(self) -> Result<(Uuid, DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let task = self.task.ok_or(ValidationError::Required { field: "task" })?;
        let start = self
            .start_time
            .ok_or(ValidationError::Required { field: "start_time" })?;
        let end = self
            .end_time
            .ok_or(ValidationError::Required { field: "end_time" })?;
        validate_time_range(start, end)?;
        Ok((task, start, end))
    }

    /// Merges the payload over `entry` and validates the merged time range.
    pub fn merge_into(
        self,
        entry: &TimeEntry,
        mode: WriteMode,
    ) -> Result<TimeEntryChanges, ValidationError> {
        if mode == WriteMode::Replace {
            if self.task.is_none() {
                return Err(ValidationError::Required { field: "task" });
            }
            if self.start_time.is_none() {
                return Err(ValidationError::Required { field: "start_time" });
            }
            if self.end_time.is_none() {
                return Err(ValidationError::Required { field: "end_time" });
            }
        }

        let task_id = self.task.unwrap_or(entry.task_id);
        let start_time = self.start_time.unwrap_or(entry.start_time);
        let end_time = self.end_time.unwrap_or(entry.end_time);
        validate_time_range(start_time, end_time)?;

        Ok(TimeEntryChanges {
            task_id,
            start_time,
            end_time,
            task_changed: task_id != entry.task_id,
        })
    }
}

impl TimeEntryChanges {
    pub fn apply_to(&self, entry: &mut TimeEntry) {
        entry.task_id = self.task_id;
        entry.start_time = self.start_time;
        entry.end_time = self.end_time;
    }
}

/// Parses an RFC 3339 timestamp, normalising to UTC.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::invalid(
                field,
                "Datetime has wrong format. Use RFC 3339, e.g. 2024-01-31T09:30:00Z.",
            )
        })
}
