//! Row conversions and filter translation.
//!
//! Pure functions between SQLite rows and domain types, testable without a
//! database.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{functions::FunctionFlags, Connection, Row};
use uuid::Uuid;

use timemate_core::query::{contains_ignore_case, TaskFilter, TimeEntryFilter};
use timemate_core::tracking::{Task, TimeEntry, User};

use super::schema;

/// Expected columns: id, username, email, api_token
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    Ok(User {
        id: parse_uuid(&id)?,
        username: row.get(1)?,
        email: row.get(2)?,
        api_token: row.get(3)?,
    })
}

/// Expected columns: id, name, description, created_at, owner_id
pub fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(3)?;
    let owner_id: String = row.get(4)?;
    Ok(Task {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(&created_at)?,
        owner_id: parse_uuid(&owner_id)?,
    })
}

/// Expected columns: id, task_id, owner_id, start_time, end_time, created_at
pub fn row_to_time_entry(row: &Row) -> rusqlite::Result<TimeEntry> {
    let id: String = row.get(0)?;
    let task_id: String = row.get(1)?;
    let owner_id: String = row.get(2)?;
    let start_time: String = row.get(3)?;
    let end_time: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    Ok(TimeEntry {
        id: parse_uuid(&id)?,
        task_id: parse_uuid(&task_id)?,
        owner_id: parse_uuid(&owner_id)?,
        start_time: parse_datetime(&start_time)?,
        end_time: parse_datetime(&end_time)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// SQL name of the case-insensitive substring predicate.
const CONTAINS_FN: &str = "contains_ci";

/// Registers `contains_ci(haystack, needle)` on `conn`.
///
/// SQLite's `lower()` only folds ASCII, so name filters call back into the
/// same matcher the in-memory store uses.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: String = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(contains_ignore_case(&haystack, &needle))
        },
    )
}

/// Formats a timestamp so that text order equals time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error(err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(conversion_error)
}

fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

/// A SELECT statement with its positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl FilteredQuery {
    fn new(base: &str, owner_id: Uuid) -> Self {
        Self {
            sql: base.to_string(),
            params: vec![owner_id.to_string()],
        }
    }

    fn push(&mut self, clause: &str, value: String) {
        self.params.push(value);
        self.sql
            .push_str(&format!(" AND {clause} ?{}", self.params.len()));
    }

    fn push_contains(&mut self, column: &str, value: &str) {
        self.params.push(value.to_string());
        self.sql.push_str(&format!(
            " AND {CONTAINS_FN}({column}, ?{})",
            self.params.len()
        ));
    }
}

/// Translates a task filter into SQL.
pub fn task_filter_query(filter: &TaskFilter) -> FilteredQuery {
    let mut query = FilteredQuery::new(schema::SELECT_TASKS, filter.owner_id);
    if let Some(name) = &filter.name {
        query.push_contains("name", name);
    }
    if let Some(after) = &filter.created_after {
        query.push("created_at >=", format_datetime(after));
    }
    if let Some(before) = &filter.created_before {
        query.push("created_at <=", format_datetime(before));
    }
    query
}

/// Translates a time entry filter into SQL. The task name match runs against
/// the joined task row.
pub fn time_entry_filter_query(filter: &TimeEntryFilter) -> FilteredQuery {
    let mut query = FilteredQuery::new(schema::SELECT_TIME_ENTRIES, filter.owner_id);
    if let Some(task_id) = filter.task_id {
        query.push("e.task_id =", task_id.to_string());
    }
    if let Some(name) = &filter.task_name {
        query.push_contains("t.name", name);
    }
    let bounds = [
        ("e.start_time >=", filter.start_after),
        ("e.start_time <=", filter.start_before),
        ("e.end_time >=", filter.end_after),
        ("e.end_time <=", filter.end_before),
    ];
    for (clause, bound) in bounds {
        if let Some(bound) = bound {
            query.push(clause, format_datetime(&bound));
        }
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let later = early + chrono::Duration::milliseconds(1);

        assert_eq!(format_datetime(&early), "2024-05-01T09:00:00.000000000Z");
        assert!(format_datetime(&early) < format_datetime(&later));
    }

    #[test]
    fn test_parse_datetime_round_trips_nanoseconds() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&format_datetime(&now)).unwrap(), now);
    }

    #[test]
    fn test_parse_uuid_invalid() {
        assert!(parse_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_task_filter_query_owner_only() {
        let owner = Uuid::new_v4();
        let query = task_filter_query(&TaskFilter::for_owner(owner));

        assert_eq!(query.sql, schema::SELECT_TASKS);
        assert_eq!(query.params, vec![owner.to_string()]);
    }

    #[test]
    fn test_task_filter_query_numbers_params_in_order() {
        let owner = Uuid::new_v4();
        let mut filter = TaskFilter::for_owner(owner).with_name("api");
        filter.created_before = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        let query = task_filter_query(&filter);

        assert!(query.sql.ends_with(
            "AND contains_ci(name, ?2) AND created_at <= ?3"
        ));
        assert_eq!(query.params[1], "api");
        assert_eq!(query.params[2], "2024-05-01T00:00:00.000000000Z");
    }

    #[test]
    fn test_time_entry_filter_query_uses_joined_task_name() {
        let owner = Uuid::new_v4();
        let mut filter = TimeEntryFilter::for_owner(owner);
        filter.task_name = Some("Design".to_string());
        filter.end_after = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        let query = time_entry_filter_query(&filter);

        assert!(query.sql.contains("contains_ci(t.name, ?2)"));
        assert!(query.sql.ends_with("AND e.end_time >= ?3"));
        assert_eq!(query.params.len(), 3);
    }

    #[test]
    fn test_contains_function_folds_non_ascii() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let matched: bool = conn
            .query_row("SELECT contains_ci('Écrire rapport', 'écrire')", [], |row| row.get(0))
            .unwrap();
        let missed: bool = conn
            .query_row("SELECT contains_ci('Écrire rapport', 'lire')", [], |row| row.get(0))
            .unwrap();

        assert!(matched);
        assert!(!missed);
    }
}
