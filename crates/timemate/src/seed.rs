//! Demo data for local development (`--seed-demo`).
//!
//! Creates a demo user, a few tasks and non-overlapping one-hour entries
//! over the last week. Running it again with the same api token reuses the
//! user and skips tasks that already exist.

use chrono::{DateTime, Duration, Utc};

use timemate_core::storage::RepositoryError;
use timemate_core::tracking::{Task, TimeEntry, User};

use crate::state::AppState;

const DEMO_TASKS: &[(&str, &str)] = &[
    ("API Design", "Design API endpoints and schema."),
    (
        "Serializer Implementation",
        "Implement serializers for Task and TimeEntry.",
    ),
    ("Unit Testing", "Write unit tests for all key logic."),
];
const ENTRIES_PER_TASK: i32 = 5;
const SEED_WINDOW_DAYS: i64 = 7;
const ENTRY_DURATION_HOURS: i64 = 1;

/// Who the demo data belongs to.
#[derive(Debug, Clone)]
pub struct DemoAccount {
    pub username: String,
    pub email: String,
    /// Fixed token; a random one is generated when absent.
    pub api_token: Option<String>,
}

/// Seeds the demo data and returns the demo user.
pub async fn seed_demo(
    state: &AppState,
    account: DemoAccount,
    now: DateTime<Utc>,
) -> Result<User, RepositoryError> {
    let user = demo_user(state, account).await?;

    let window_start = now - Duration::days(SEED_WINDOW_DAYS);
    let slot = Duration::hours(ENTRY_DURATION_HOURS);
    let mut offset = 0;

    for (name, description) in DEMO_TASKS {
        if state.tasks.find_task_by_name(user.id, name).await?.is_some() {
            tracing::debug!(task = %name, "Demo task exists");
            offset += ENTRIES_PER_TASK;
            continue;
        }

        let task = Task::new(user.id, *name).with_description(*description);
        state.tasks.create_task(&task).await?;

        for _ in 0..ENTRIES_PER_TASK {
            let start = window_start + slot * offset;
            let entry = TimeEntry::new(user.id, task.id, start, start + slot);
            state.time_entries.create_time_entry(&entry).await?;
            offset += 1;
        }
        tracing::info!(task = %name, entries = ENTRIES_PER_TASK, "Seeded demo task");
    }

    Ok(user)
}

async fn demo_user(state: &AppState, account: DemoAccount) -> Result<User, RepositoryError> {
    if let Some(token) = &account.api_token {
        if let Some(user) = state.users.get_user_by_token(token).await? {
            tracing::info!(username = %user.username, "Demo user exists");
            return Ok(user);
        }
    }

    let mut user = User::new(account.username, account.email);
    if let Some(token) = account.api_token {
        user = user.with_api_token(token);
    }
    state.users.create_user(&user).await?;
    tracing::info!(username = %user.username, "Created demo user");
    Ok(user)
}
