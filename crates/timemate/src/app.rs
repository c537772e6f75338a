use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        grouped::{entries_by_day, entries_by_task},
        health::health,
        tasks::{create_task, delete_task, get_task, list_tasks, patch_task, replace_task},
        time_entries::{
            create_time_entry, delete_time_entry, get_time_entry, list_time_entries,
            patch_time_entry, replace_time_entry,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api_routes = Router::new()
        .route("/tasks/", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}/",
            get(get_task)
                .put(replace_task)
                .patch(patch_task)
                .delete(delete_task),
        )
        .route(
            "/time-entries/",
            get(list_time_entries).post(create_time_entry),
        )
        .route("/time-entries/sorted-by-task-name/", get(entries_by_task))
        .route("/time-entries/sorted-by-date/", get(entries_by_day))
        .route(
            "/time-entries/{id}/",
            get(get_time_entry)
                .put(replace_time_entry)
                .patch(patch_time_entry)
                .delete(delete_time_entry),
        )
        .layer(cors);

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
