//! Time entry CRUD handlers.

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use timemate_core::cache::{list_key, CachedView};
use timemate_core::query::{
    paginate, sort_time_entries, PageLocation, TaskFilter, TimeEntryListParams,
    DEFAULT_TIME_ENTRY_ORDERING,
};
use timemate_core::tracking::{
    ensure_owner, translate_time_entry_write_error, validate_task_ownership, Task, TaskReference,
    TimeEntry, TimeEntryPayload, TrackingError, User, WriteMode,
};

use super::{json_response, render_page, ApiError};
use crate::{
    auth::CurrentUser,
    cache::read_through,
    presentation::{time_entry_created, time_entry_detail, TimeEntryListItem},
    state::AppState,
};

/// Loads a time entry the caller owns. Missing is 404, someone else's is 403.
async fn load_owned_entry(state: &AppState, id: Uuid, user: &User) -> Result<TimeEntry, ApiError> {
    let entry = state
        .time_entries
        .get_time_entry(id)
        .await?
        .ok_or(TrackingError::NotFound {
            entity_type: "TimeEntry",
            id,
        })?;
    ensure_owner(&entry, user)?;
    Ok(entry)
}

async fn load_task(state: &AppState, id: Uuid) -> Result<Task, ApiError> {
    Ok(state
        .tasks
        .get_task(id)
        .await?
        .ok_or(TrackingError::NotFound {
            entity_type: "Task",
            id,
        })?)
}

/// List the caller's time entries (GET /api/time-entries/).
pub async fn list_time_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<TimeEntryListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let key = list_key(CachedView::TimeEntryList, user.id, uri.query());

    let body = read_through(
        state.cache.as_ref(),
        &state.generations,
        user.id,
        &key,
        state.cache_ttl,
        || render_time_entry_list(&state, &user, &params, &uri),
    )
    .await?;

    Ok(json_response(StatusCode::OK, body))
}

async fn render_time_entry_list(
    state: &AppState,
    user: &User,
    params: &TimeEntryListParams,
    uri: &Uri,
) -> Result<Vec<u8>, ApiError> {
    let filter = params.to_filter(user.id)?;
    let mut entries = state.time_entries.list_time_entries(&filter).await?;
    let tasks: HashMap<Uuid, Task> = state
        .tasks
        .list_tasks(&TaskFilter::for_owner(user.id))
        .await?
        .into_iter()
        .map(|task| (task.id, task))
        .collect();

    let names: HashMap<Uuid, String> = tasks
        .iter()
        .map(|(id, task)| (*id, task.name.clone()))
        .collect();
    sort_time_entries(
        &mut entries,
        &params.ordering(DEFAULT_TIME_ENTRY_ORDERING),
        &names,
    );

    let rows: Vec<(TimeEntry, &Task)> = entries
        .into_iter()
        .filter_map(|entry| tasks.get(&entry.task_id).map(|task| (entry, task)))
        .collect();

    let location = PageLocation {
        path: uri.path(),
        query: uri.query(),
    };
    let page = paginate(rows, &params.page_request(state.page_settings)?, location)?;
    render_page(&page, |(entry, task)| TimeEntryListItem::new(entry, task))
}

/// Create a time entry (POST /api/time-entries/).
pub async fn create_time_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<TimeEntryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let (task_id, start, end) = payload.parse()?.for_create()?;

    validate_task_ownership(state.tasks.as_ref(), TaskReference::Id(task_id), &user).await?;

    let entry = TimeEntry::new(user.id, task_id, start, end);
    state
        .time_entries
        .create_time_entry(&entry)
        .await
        .map_err(|e| translate_time_entry_write_error(e, task_id, start, end))?;

    tracing::info!(
        time_entry_id = %entry.id,
        task_id = %task_id,
        owner_id = %user.id,
        "Time entry created"
    );
    Ok((StatusCode::CREATED, Json(time_entry_created(&entry, &user)?)))
}

/// Fetch a time entry (GET /api/time-entries/{id}/).
pub async fn get_time_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let entry = load_owned_entry(&state, id, &user).await?;
    let task = load_task(&state, entry.task_id).await?;
    Ok(Json(time_entry_detail(&entry, &task, &user)?))
}

/// Replace a time entry (PUT /api/time-entries/{id}/).
pub async fn replace_time_entry(
    user: CurrentUser,
    state: State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TimeEntryPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_time_entry(user, state, id, payload, WriteMode::Replace).await
}

/// Partially update a time entry (PATCH /api/time-entries/{id}/).
pub async fn patch_time_entry(
    user: CurrentUser,
    state: State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TimeEntryPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_time_entry(user, state, id, payload, WriteMode::Partial).await
}

async fn update_time_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TimeEntryPayload>, JsonRejection>,
    mode: WriteMode,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let mut entry = load_owned_entry(&state, id, &user).await?;
    let Json(payload) = payload?;

    let changes = payload.parse()?.merge_into(&entry, mode)?;
    let task = if changes.task_changed {
        validate_task_ownership(
            state.tasks.as_ref(),
            TaskReference::Id(changes.task_id),
            &user,
        )
        .await?
    } else {
        load_task(&state, entry.task_id).await?
    };

    changes.apply_to(&mut entry);
    state
        .time_entries
        .update_time_entry(&entry)
        .await
        .map_err(|e| {
            translate_time_entry_write_error(e, entry.task_id, entry.start_time, entry.end_time)
        })?;

    tracing::info!(time_entry_id = %entry.id, owner_id = %user.id, "Time entry updated");
    Ok(Json(time_entry_detail(&entry, &task, &user)?))
}

/// Delete a time entry (DELETE /api/time-entries/{id}/).
pub async fn delete_time_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let entry = load_owned_entry(&state, id, &user).await?;

    state.time_entries.delete_time_entry(entry.id).await?;

    tracing::info!(time_entry_id = %entry.id, owner_id = %user.id, "Time entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
