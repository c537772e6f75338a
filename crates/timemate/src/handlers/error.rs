use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use timemate_core::query::PaginationError;
use timemate_core::storage::{
    repository_error_to_status_code, tracking_error_to_status_code, RepositoryError,
};
use timemate_core::tracking::{PermissionError, TrackingError, ValidationError, NON_FIELD_ERRORS};

/// Every failure a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    Tracking(TrackingError),
    /// Requested page is past the end or not a page number.
    InvalidPage,
    /// Missing or unknown credential.
    Unauthenticated(&'static str),
    /// Request body or query string could not be decoded.
    Malformed(String),
    /// Path does not address a resource (e.g. a malformed id).
    NotFound,
    /// Response could not be rendered.
    Internal(String),
}

fn field_error(field: &str, code: &str, message: String) -> Value {
    json!({ field: [{ "code": code, "message": message }] })
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let code = match self {
            Self::Tracking(e) => tracking_error_to_status_code(e),
            Self::InvalidPage | Self::NotFound => 404,
            Self::Unauthenticated(_) => 401,
            Self::Malformed(_) => 400,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> Value {
        match self {
            Self::Tracking(TrackingError::Validation(e)) => {
                field_error(e.field(), e.code(), e.to_string())
            }
            Self::Tracking(TrackingError::Permission(e)) => {
                json!({ "detail": e.to_string(), "code": e.code() })
            }
            Self::Tracking(TrackingError::NotFound { .. })
            | Self::Tracking(TrackingError::Repository(RepositoryError::NotFound { .. }))
            | Self::NotFound => json!({ "detail": "Not found." }),
            Self::Tracking(TrackingError::Repository(e)) => json!({ "detail": e.to_string() }),
            Self::InvalidPage => json!({ "detail": PaginationError::InvalidPage.to_string() }),
            Self::Unauthenticated(detail) => json!({ "detail": detail }),
            Self::Malformed(message) => field_error(NON_FIELD_ERRORS, "parse_error", message.clone()),
            Self::Internal(detail) => json!({ "detail": detail }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = ?self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        Self::Tracking(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Tracking(err.into())
    }
}

impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        Self::Tracking(err.into())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::Tracking(err.into())
    }
}

impl From<PaginationError> for ApiError {
    fn from(_: PaginationError) -> Self {
        Self::InvalidPage
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
