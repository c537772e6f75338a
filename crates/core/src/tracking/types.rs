use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated principal.
///
/// The api token is the credential presented as `Authorization: Bearer <token>`
/// and is never part of any response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub api_token: String,
}

impl User {
    /// Creates a new user with a fresh id and api token.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            api_token: Uuid::new_v4().simple().to_string(),
        }
    }

    /// Sets a specific api token.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }
}

/// A named unit of work owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

impl Task {
    /// Creates a new task owned by `owner_id`.
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            owner_id,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A recorded span of time spent on a task.
///
/// Duration is never stored. It is always `end_time - start_time`, so it can
/// not drift from the two timestamps it is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub task_id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Creates a new time entry owned by `owner_id` for `task_id`.
    pub fn new(
        owner_id: Uuid,
        task_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            owner_id,
            start_time,
            end_time,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Elapsed time between start and end.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// Resources that belong to a single user.
pub trait Owned {
    /// Name used in error messages and logs.
    const ENTITY_TYPE: &'static str;

    fn id(&self) -> Uuid;

    fn owner_id(&self) -> Uuid;
}

impl Owned for Task {
    const ENTITY_TYPE: &'static str = "Task";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for TimeEntry {
    const ENTITY_TYPE: &'static str = "TimeEntry";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Formats a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
