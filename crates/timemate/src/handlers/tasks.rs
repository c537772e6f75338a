//! Task CRUD handlers.

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
use timemate_core::query::{paginate, sort_tasks, PageLocation, TaskListParams, DEFAULT_TASK_ORDERING};
use timemate_core::tracking::{
    ensure_owner, translate_task_write_error, unique_owner_for_task_name, Task, TaskPayload,
    TrackingError, User, WriteMode,
};

use super::{json_response, render_page, ApiError};
use crate::{
    auth::CurrentUser,
    cache::read_through,
    presentation::{task_detail, TaskSummary},
    state::AppState,
};

/// Loads a task the caller owns. Missing is 404, someone else's is 403.
async fn load_owned_task(state: &AppState, id: Uuid, user: &User) -> Result<Task, ApiError> {
    let task = state
        .tasks
        .get_task(id)
        .await?
        .ok_or(TrackingError::NotFound {
            entity_type: "Task",
            id,
        })?;
    ensure_owner(&task, user)?;
    Ok(task)
}

/// List the caller's tasks (GET /api/tasks/).
pub async fn list_tasks(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<TaskListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let key = list_key(CachedView::TaskList, user.id, uri.query());

    let body = read_through(
        state.cache.as_ref(),
        &state.generations,
        user.id,
        &key,
        state.cache_ttl,
        || render_task_list(&state, &user, &params, &uri),
    )
    .await?;

    Ok(json_response(StatusCode::OK, body))
}

async fn render_task_list(
    state: &AppState,
    user: &User,
    params: &TaskListParams,
    uri: &Uri,
) -> Result<Vec<u8>, ApiError> {
    let filter = params.to_filter(user.id)?;
    let mut tasks = state.tasks.list_tasks(&filter).await?;
    sort_tasks(&mut tasks, &params.ordering(DEFAULT_TASK_ORDERING));

    let location = PageLocation {
        path: uri.path(),
        query: uri.query(),
    };
    let page = paginate(tasks, &params.page_request(state.page_settings)?, location)?;
    render_page(&page, TaskSummary::new)
}

/// Create a task (POST /api/tasks/).
pub async fn create_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let task = payload.into_new_task(user.id)?;

    unique_owner_for_task_name(state.tasks.as_ref(), &user, &task.name).await?;
    state
        .tasks
        .create_task(&task)
        .await
        .map_err(|e| translate_task_write_error(e, &user, &task.name))?;

    tracing::info!(task_id = %task.id, owner_id = %user.id, "Task created");
    Ok((StatusCode::CREATED, Json(task_detail(&task, &user)?)))
}

/// Fetch a task (GET /api/tasks/{id}/).
pub async fn get_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let task = load_owned_task(&state, id, &user).await?;
    Ok(Json(task_detail(&task, &user)?))
}

/// Replace a task (PUT /api/tasks/{id}/).
pub async fn replace_task(
    user: CurrentUser,
    state: State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_task(user, state, id, payload, WriteMode::Replace).await
}

/// Partially update a task (PATCH /api/tasks/{id}/).
pub async fn patch_task(
    user: CurrentUser,
    state: State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    update_task(user, state, id, payload, WriteMode::Partial).await
}

async fn update_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
    mode: WriteMode,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let mut task = load_owned_task(&state, id, &user).await?;
    let Json(payload) = payload?;

    let name_changed = payload.apply_to(&mut task, mode)?;
    if name_changed {
        unique_owner_for_task_name(state.tasks.as_ref(), &user, &task.name).await?;
    }
    state
        .tasks
        .update_task(&task)
        .await
        .map_err(|e| translate_task_write_error(e, &user, &task.name))?;

    tracing::info!(task_id = %task.id, owner_id = %user.id, "Task updated");
    Ok(Json(task_detail(&task, &user)?))
}

/// Delete a task and its time entries (DELETE /api/tasks/{id}/).
pub async fn delete_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let task = load_owned_task(&state, id, &user).await?;

    state.tasks.delete_task(task.id).await?;

    tracing::info!(task_id = %task.id, owner_id = %user.id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
