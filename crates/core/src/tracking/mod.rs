mod error;
mod requests;
mod types;
mod validation;

pub use error::{
    PermissionError, Result, TrackingError, ValidationError, NON_FIELD_ERRORS,
};
pub use requests::{
    parse_timestamp, ParsedTimeEntry, TaskPayload, TimeEntryChanges, TimeEntryPayload, WriteMode,
};
pub use types::{format_duration, Owned, Task, TimeEntry, User};
pub use validation::{
    ensure_owner, resolve_task_or_fail, translate_task_write_error,
    translate_time_entry_write_error, unique_owner_for_task_name, validate_task_description,
    validate_task_name, validate_task_ownership, validate_time_range, TaskReference,
};
