//! Grouped time entry views.
//!
//! Both views are derived on every cache miss and never stored.

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{StatusCode, Uri},
    response::Response,
};

use timemate_core::cache::{list_key, CachedView};
use timemate_core::query::{
    group_entries_by_day, group_entries_by_task, paginate, sort_tasks, PageLocation,
    TaskListParams, TimeEntryFilter, TimeEntryListParams, DEFAULT_DAY_ORDERING,
    DEFAULT_TASK_ORDERING,
};
use timemate_core::tracking::User;

use super::{json_response, render_page, ApiError};
use crate::{
    auth::CurrentUser,
    cache::read_through,
    presentation::{DayWithEntries, TaskWithEntries},
    state::AppState,
};

/// Entries grouped under their tasks (GET /api/time-entries/sorted-by-task-name/).
///
/// Accepts the task list filters and ordering. Tasks without entries are
/// included.
pub async fn entries_by_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<TaskListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let key = list_key(CachedView::TimeEntriesByTask, user.id, uri.query());

    let body = read_through(
        state.cache.as_ref(),
        &state.generations,
        user.id,
        &key,
        state.cache_ttl,
        || render_entries_by_task(&state, &user, &params, &uri),
    )
    .await?;

    Ok(json_response(StatusCode::OK, body))
}

async fn render_entries_by_task(
    state: &AppState,
    user: &User,
    params: &TaskListParams,
    uri: &Uri,
) -> Result<Vec<u8>, ApiError> {
    let mut tasks = state.tasks.list_tasks(&params.to_filter(user.id)?).await?;
    sort_tasks(&mut tasks, &params.ordering(DEFAULT_TASK_ORDERING));
    let entries = state
        .time_entries
        .list_time_entries(&TimeEntryFilter::for_owner(user.id))
        .await?;

    let groups = group_entries_by_task(tasks, entries);

    let location = PageLocation {
        path: uri.path(),
        query: uri.query(),
    };
    let page = paginate(groups, &params.page_request(state.page_settings)?, location)?;
    render_page(&page, TaskWithEntries::new)
}

/// Entries grouped by the UTC day they ended (GET /api/time-entries/sorted-by-date/).
///
/// Accepts the time entry filters; `ordering=day` flips the default
/// latest-day-first order.
pub async fn entries_by_day(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<TimeEntryListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let key = list_key(CachedView::TimeEntriesByDay, user.id, uri.query());

    let body = read_through(
        state.cache.as_ref(),
        &state.generations,
        user.id,
        &key,
        state.cache_ttl,
        || render_entries_by_day(&state, &user, &params, &uri),
    )
    .await?;

    Ok(json_response(StatusCode::OK, body))
}

async fn render_entries_by_day(
    state: &AppState,
    user: &User,
    params: &TimeEntryListParams,
    uri: &Uri,
) -> Result<Vec<u8>, ApiError> {
    let entries = state
        .time_entries
        .list_time_entries(&params.to_filter(user.id)?)
        .await?;

    let groups = group_entries_by_day(entries, &params.ordering(DEFAULT_DAY_ORDERING));

    let location = PageLocation {
        path: uri.path(),
        query: uri.query(),
    };
    let page = paginate(groups, &params.page_request(state.page_settings)?, location)?;
    render_page(&page, DayWithEntries::new)
}
