//! Pure functions mapping core errors to HTTP status codes.

use crate::tracking::TrackingError;

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// Store faults the client can not fix are 5xx; `ConnectionFailed` is 503 so
/// load balancers can retry elsewhere.
///
/// ```
/// use timemate_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::ConnectionFailed("refused".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 503);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) | RepositoryError::MissingReference(_) => 400,
    }
}

/// Maps a [`TrackingError`] to an HTTP status code.
///
/// A missing task referenced from a time entry body is a validation failure
/// (400); only a missing resource addressed by the URL is a 404.
pub fn tracking_error_to_status_code(error: &TrackingError) -> u16 {
    match error {
        TrackingError::Validation(_) => 400,
        TrackingError::Permission(_) => 403,
        TrackingError::NotFound { .. } => 404,
        TrackingError::Repository(e) => repository_error_to_status_code(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{PermissionError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn test_repository_errors() {
        let cases = [
            (
                RepositoryError::NotFound {
                    entity_type: "Task",
                    id: "1".to_string(),
                },
                404,
            ),
            (
                RepositoryError::AlreadyExists {
                    entity_type: "Task",
                    id: "1".to_string(),
                },
                409,
            ),
            (RepositoryError::ConnectionFailed("x".to_string()), 503),
            (RepositoryError::QueryFailed("x".to_string()), 500),
            (RepositoryError::Serialization("x".to_string()), 500),
            (RepositoryError::InvalidData("x".to_string()), 400),
            (RepositoryError::MissingReference("x".to_string()), 400),
        ];
        for (error, status) in cases {
            assert_eq!(repository_error_to_status_code(&error), status, "{error}");
        }
    }

    #[test]
    fn test_task_reference_not_found_is_bad_request() {
        let error = TrackingError::Validation(ValidationError::TaskNotFound {
            task_id: Uuid::nil(),
        });
        assert_eq!(tracking_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_direct_fetch_not_found_is_404() {
        let error = TrackingError::NotFound {
            entity_type: "Task",
            id: Uuid::nil(),
        };
        assert_eq!(tracking_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_permission_is_forbidden() {
        let error = TrackingError::Permission(PermissionError::NotOwner {
            entity_type: "Task",
            id: Uuid::nil(),
        });
        assert_eq!(tracking_error_to_status_code(&error), 403);
    }

    #[test]
    fn test_repository_passthrough() {
        let error = TrackingError::Repository(RepositoryError::ConnectionFailed("x".to_string()));
        assert_eq!(tracking_error_to_status_code(&error), 503);
    }
}
