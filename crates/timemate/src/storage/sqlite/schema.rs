//! SQL schema and statements. Pure data, no I/O.
//!
//! Timestamps are stored as RFC 3339 text with a fixed nanosecond precision
//! and a `Z` suffix, so lexical comparison in SQL matches time ordering.

/// Creates all tables and indexes. Safe to run on every start.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    api_token TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS time_entries (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    created_at TEXT NOT NULL,
    CHECK (end_time > start_time),
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner_id ON tasks(owner_id);
CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks(name);
CREATE INDEX IF NOT EXISTS idx_time_entries_owner_id ON time_entries(owner_id);
CREATE INDEX IF NOT EXISTS idx_time_entries_task_id ON time_entries(task_id);
CREATE INDEX IF NOT EXISTS idx_time_entries_start_time ON time_entries(start_time);
CREATE INDEX IF NOT EXISTS idx_time_entries_end_time ON time_entries(end_time);
"#;

// Users

pub const SELECT_USER_BY_ID: &str = "SELECT id, username, email, api_token FROM users WHERE id = ?1";

pub const SELECT_USER_BY_TOKEN: &str =
    "SELECT id, username, email, api_token FROM users WHERE api_token = ?1";

pub const INSERT_USER: &str =
    "INSERT INTO users (id, username, email, api_token) VALUES (?1, ?2, ?3, ?4)";

// Tasks

pub const SELECT_TASKS: &str =
    "SELECT id, name, description, created_at, owner_id FROM tasks WHERE owner_id = ?1";

pub const SELECT_TASK_BY_ID: &str =
    "SELECT id, name, description, created_at, owner_id FROM tasks WHERE id = ?1";

pub const SELECT_TASK_BY_NAME: &str = "SELECT id, name, description, created_at, owner_id \
     FROM tasks WHERE owner_id = ?1 AND name = ?2";

pub const INSERT_TASK: &str = "INSERT INTO tasks (id, name, description, created_at, owner_id) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

pub const UPDATE_TASK: &str = "UPDATE tasks SET name = ?2, description = ?3 WHERE id = ?1";

pub const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

// Time entries

pub const SELECT_TIME_ENTRIES: &str = "SELECT e.id, e.task_id, e.owner_id, e.start_time, \
     e.end_time, e.created_at FROM time_entries e JOIN tasks t ON t.id = e.task_id \
     WHERE e.owner_id = ?1";

pub const SELECT_TIME_ENTRY_BY_ID: &str = "SELECT id, task_id, owner_id, start_time, end_time, \
     created_at FROM time_entries WHERE id = ?1";

pub const INSERT_TIME_ENTRY: &str = "INSERT INTO time_entries \
     (id, task_id, owner_id, start_time, end_time, created_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub const UPDATE_TIME_ENTRY: &str =
    "UPDATE time_entries SET task_id = ?2, start_time = ?3, end_time = ?4 WHERE id = ?1";

pub const DELETE_TIME_ENTRY: &str = "DELETE FROM time_entries WHERE id = ?1";
