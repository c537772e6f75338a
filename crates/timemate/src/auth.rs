//! Bearer token authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use timemate_core::tracking::User;

use crate::{handlers::ApiError, state::AppState};

/// Extractor for the authenticated user. Rejects with 401 when the
/// `Authorization: Bearer <token>` header is missing or unknown.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::Unauthenticated(
                "Authentication credentials were not provided.",
            ))?
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthenticated("Invalid token header."))?;

        let user = state
            .users
            .get_user_by_token(token)
            .await?
            .ok_or(ApiError::Unauthenticated("Invalid token."))?;

        tracing::trace!(user_id = %user.id, "Authenticated request");
        Ok(CurrentUser(user))
    }
}
