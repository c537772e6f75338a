//! SQLite repository implementation.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use timemate_core::query::{TaskFilter, TimeEntryFilter};
use timemate_core::storage::{
    RepositoryError, Result, TaskRepository, TimeEntryRepository, UserRepository,
};
use timemate_core::tracking::{Task, TimeEntry, User};

use super::conversions::{
    format_datetime, register_functions, row_to_task, row_to_time_entry, row_to_user,
    task_filter_query, time_entry_filter_query, FilteredQuery,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// SQLite-based repository for users, tasks and time entries.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a database file and applies the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository backed by an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            register_functions(conn)?;
            conn.execute_batch(schema::CREATE_TABLES)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn select_one<T, F>(
        &self,
        sql: &'static str,
        params: Vec<String>,
        entity_type: &'static str,
        map_row: F,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Row) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql)?;
                match stmt.query_row(rusqlite::params_from_iter(params.iter()), map_row) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity_type))
    }

    async fn select_many<T>(
        &self,
        query: FilteredQuery,
        map_row: fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>>
    where
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&query.sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(query.params.iter()), map_row)?;
                let mut items = Vec::new();
                for row in rows {
                    items.push(row?);
                }
                Ok(items)
            })
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Runs a write, mapping zero affected rows to `NotFound`.
    async fn execute(
        &self,
        sql: &'static str,
        params: Vec<Option<String>>,
        require_row: bool,
        entity_type: &'static str,
        id: String,
    ) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
                if require_row && rows == 0 {
                    Err(rusqlite::Error::QueryReturnedNoRows.into())
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, entity_type, id))
    }
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        self.select_one(schema::SELECT_TASK_BY_ID, vec![id.to_string()], "Task", row_to_task)
            .await
    }

    async fn find_task_by_name(&self, owner_id: Uuid, name: &str) -> Result<Option<Task>> {
        self.select_one(
            schema::SELECT_TASK_BY_NAME,
            vec![owner_id.to_string(), name.to_string()],
            "Task",
            row_to_task,
        )
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.select_many(task_filter_query(filter), row_to_task).await
    }

    async fn create_task(&self, task: &Task) -> Result<()> {
        let params = vec![
            Some(task.id.to_string()),
            Some(task.name.clone()),
            task.description.clone(),
            Some(format_datetime(&task.created_at)),
            Some(task.owner_id.to_string()),
        ];
        self.execute(schema::INSERT_TASK, params, false, "Task", task.name.clone())
            .await
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let params = vec![
            Some(task.id.to_string()),
            Some(task.name.clone()),
            task.description.clone(),
        ];
        self.execute(schema::UPDATE_TASK, params, true, "Task", task.name.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound { entity_type, .. } => RepositoryError::NotFound {
                    entity_type,
                    id: task.id.to_string(),
                },
                other => other,
            })
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.execute(
            schema::DELETE_TASK,
            vec![Some(id.to_string())],
            true,
            "Task",
            id.to_string(),
        )
        .await
    }
}

#[async_trait]
impl TimeEntryRepository for SqliteRepository {
    async fn get_time_entry(&self, id: Uuid) -> Result<Option<TimeEntry>> {
        self.select_one(
            schema::SELECT_TIME_ENTRY_BY_ID,
            vec![id.to_string()],
            "TimeEntry",
            row_to_time_entry,
        )
        .await
    }

    async fn list_time_entries(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>> {
        self.select_many(time_entry_filter_query(filter), row_to_time_entry)
            .await
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let params = vec![
            Some(entry.id.to_string()),
            Some(entry.task_id.to_string()),
            Some(entry.owner_id.to_string()),
            Some(format_datetime(&entry.start_time)),
            Some(format_datetime(&entry.end_time)),
            Some(format_datetime(&entry.created_at)),
        ];
        self.execute(
            schema::INSERT_TIME_ENTRY,
            params,
            false,
            "TimeEntry",
            entry.id.to_string(),
        )
        .await
    }

    async fn update_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let params = vec![
            Some(entry.id.to_string()),
            Some(entry.task_id.to_string()),
            Some(format_datetime(&entry.start_time)),
            Some(format_datetime(&entry.end_time)),
        ];
        self.execute(
            schema::UPDATE_TIME_ENTRY,
            params,
            true,
            "TimeEntry",
            entry.id.to_string(),
        )
        .await
    }

    async fn delete_time_entry(&self, id: Uuid) -> Result<()> {
        self.execute(
            schema::DELETE_TIME_ENTRY,
            vec![Some(id.to_string())],
            true,
            "TimeEntry",
            id.to_string(),
        )
        .await
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.select_one(schema::SELECT_USER_BY_ID, vec![id.to_string()], "User", row_to_user)
            .await
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.select_one(
            schema::SELECT_USER_BY_TOKEN,
            vec![token.to_string()],
            "User",
            row_to_user,
        )
        .await
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let params = vec![
            Some(user.id.to_string()),
            Some(user.username.clone()),
            Some(user.email.clone()),
            Some(user.api_token.clone()),
        ];
        self.execute(schema::INSERT_USER, params, false, "User", user.username.clone())
            .await
    }
}
