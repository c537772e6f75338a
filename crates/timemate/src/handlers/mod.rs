pub mod error;
pub mod grouped;
pub mod health;
pub mod tasks;
pub mod time_entries;

pub use error::ApiError;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use timemate_core::query::Page;

/// Wraps an already rendered JSON body.
fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

/// Serializes a page, representing each result with `represent`.
fn render_page<'p, T, R>(
    page: &'p Page<T>,
    represent: impl FnMut(&'p T) -> R,
) -> Result<Vec<u8>, ApiError>
where
    R: Serialize,
{
    let body = Page {
        count: page.count,
        next: page.next.clone(),
        previous: page.previous.clone(),
        results: page.results.iter().map(represent).collect::<Vec<R>>(),
    };
    Ok(serde_json::to_vec(&body)?)
}
