//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError`.
//! Constraint failures become semantic variants so the tracking layer can turn
//! them back into validation errors.

use rusqlite::ffi;
use timemate_core::storage::RepositoryError;

fn extended_code(err: &rusqlite::Error) -> Option<std::ffi::c_int> {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _) => Some(sqlite_err.extended_code),
        _ => None,
    }
}

/// Maps a rusqlite error to a RepositoryError.
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `PRIMARYKEY` → `AlreadyExists`
/// - `SQLITE_CONSTRAINT_CHECK` → `InvalidData`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `MissingReference`
/// - `CannotOpen` → `ConnectionFailed`
/// - `QueryReturnedNoRows` → `NotFound`
/// - anything else → `QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    match (err, extended_code(err)) {
        (_, Some(ffi::SQLITE_CONSTRAINT_UNIQUE)) | (_, Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY)) => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.to_string(),
            }
        }
        (_, Some(ffi::SQLITE_CONSTRAINT_CHECK)) => {
            RepositoryError::InvalidData(format!("Check constraint violation for {entity_type}"))
        }
        (_, Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)) => RepositoryError::MissingReference(format!(
            "Foreign key constraint violation for {entity_type}"
        )),
        (rusqlite::Error::SqliteFailure(sqlite_err, _), _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }
        (rusqlite::Error::QueryReturnedNoRows, _) => RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        },
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    map_tokio_rusqlite_error_with_id(err, entity_type, "unknown")
}

/// Maps a tokio_rusqlite error, attaching the id known at the call site.
///
/// For task writes the id is the task name, so a unique violation reports
/// which name collided.
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    let id = id.into();
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, &id)
        }
        tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
