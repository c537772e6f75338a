use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::RepositoryError;

/// Field name used for errors that are not attached to a single input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Rejections produced by the validation rules.
///
/// Every variant carries a stable machine-readable [`code`](Self::code) and
/// the input [`field`](Self::field) the message is reported under.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This user: {username}, already has an object with the same name: {name}")]
    DuplicateTaskName { username: String, name: String },
    #[error("Task with id {task_id} does not exist")]
    TaskNotFound { task_id: Uuid },
    #[error("Task with id {task_id} belongs to another user")]
    TaskInvalidOwner { task_id: Uuid },
    #[error("End time {end}, must be greater than start time {start}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("This field is required.")]
    Required { field: &'static str },
    #[error("{message}")]
    Invalid { field: &'static str, message: String },
}

impl ValidationError {
    /// Creates an input-shape error for `field`.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Stable code clients can match on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTaskName { .. } => "unique_task_name",
            Self::TaskNotFound { .. } => "task_not_found",
            Self::TaskInvalidOwner { .. } => "task_invalid_owner",
            Self::InvalidTimeRange { .. } => "invalid_time_range",
            Self::Required { .. } => "required",
            Self::Invalid { .. } => "invalid",
        }
    }

    /// Input field the error is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DuplicateTaskName { .. } => "name",
            Self::TaskNotFound { .. } | Self::TaskInvalidOwner { .. } => "task",
            Self::InvalidTimeRange { .. } => NON_FIELD_ERRORS,
            Self::Required { field } | Self::Invalid { field, .. } => field,
        }
    }
}

/// The principal tried to touch a resource owned by someone else.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("You do not have permission to perform this action.")]
    NotOwner { entity_type: &'static str, id: Uuid },
}

impl PermissionError {
    /// Permission failures share one code for every resource type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "not_task_owner",
        }
    }
}

/// Every way a tracking operation can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for tracking operations.
pub type Result<T> = std::result::Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duplicate_task_name_message() {
        let error = ValidationError::DuplicateTaskName {
            username: "alice".to_string(),
            name: "Write report".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "This user: alice, already has an object with the same name: Write report"
        );
        assert_eq!(error.code(), "unique_task_name");
        assert_eq!(error.field(), "name");
    }

    #[test]
    fn test_invalid_time_range_message() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let error = ValidationError::InvalidTimeRange { start, end };

        assert_eq!(
            error.to_string(),
            format!("End time {end}, must be greater than start time {start}")
        );
        assert_eq!(error.code(), "invalid_time_range");
        assert_eq!(error.field(), NON_FIELD_ERRORS);
    }

    #[test]
    fn test_task_errors_are_reported_under_task_field() {
        let not_found = ValidationError::TaskNotFound { task_id: Uuid::nil() };
        let other_owner = ValidationError::TaskInvalidOwner { task_id: Uuid::nil() };

        assert_eq!(not_found.field(), "task");
        assert_eq!(not_found.code(), "task_not_found");
        assert_eq!(other_owner.field(), "task");
        assert_eq!(other_owner.code(), "task_invalid_owner");
    }

    #[test]
    fn test_input_shape_errors() {
        let required = ValidationError::Required { field: "name" };
        assert_eq!(required.code(), "required");
        assert_eq!(required.to_string(), "This field is required.");

        let invalid = ValidationError::invalid("start_time", "Not a timestamp.");
        assert_eq!(invalid.code(), "invalid");
        assert_eq!(invalid.field(), "start_time");
        assert_eq!(invalid.to_string(), "Not a timestamp.");
    }

    #[test]
    fn test_permission_error_code_is_shared() {
        let entry = PermissionError::NotOwner {
            entity_type: "TimeEntry",
            id: Uuid::nil(),
        };
        assert_eq!(entry.code(), "not_task_owner");
        assert_eq!(
            entry.to_string(),
            "You do not have permission to perform this action."
        );
    }

    #[test]
    fn test_tracking_error_is_transparent() {
        let error: TrackingError = ValidationError::Required { field: "task" }.into();
        assert_eq!(error.to_string(), "This field is required.");
    }
}
