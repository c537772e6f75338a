//! Query string parameters accepted by the list views.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::serde::deserialize_optional_string;
use crate::tracking::ValidationError;

use super::filters::{TaskFilter, TimeEntryFilter};
use super::ordering::{parse_ordering, OrderField, OrderTerm};
use super::pagination::{PageRequest, PageSettings, PaginationError};

/// Parses a range bound: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` taken as
/// UTC, or a bare `YYYY-MM-DD` meaning midnight UTC.
pub fn parse_bound(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(ValidationError::invalid(field, "Enter a valid date/time."))
}

fn bound(field: &'static str, raw: &Option<String>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    raw.as_deref().map(|r| parse_bound(field, r)).transpose()
}

/// Parameters of the task list and the grouped-by-task view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub created_at_after: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub created_at_before: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}

impl TaskListParams {
    pub fn to_filter(&self, owner_id: Uuid) -> Result<TaskFilter, ValidationError> {
        Ok(TaskFilter {
            owner_id,
            name: self.name.clone(),
            created_after: bound("created_at_after", &self.created_at_after)?,
            created_before: bound("created_at_before", &self.created_at_before)?,
        })
    }

    pub fn ordering<F: OrderField>(&self, default: &[OrderTerm<F>]) -> Vec<OrderTerm<F>> {
        parse_ordering(self.ordering.as_deref(), default)
    }

    pub fn page_request(&self, settings: PageSettings) -> Result<PageRequest, PaginationError> {
        PageRequest::parse(self.page.as_deref(), self.page_size.as_deref(), settings)
    }
}

/// Parameters of the time entry list and the grouped-by-day view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryListParams {
    /// Substring of the task name.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub task: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub start_time_after: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub start_time_before: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub end_time_after: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub end_time_before: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}

impl TimeEntryListParams {
    pub fn to_filter(&self, owner_id: Uuid) -> Result<TimeEntryFilter, ValidationError> {
        Ok(TimeEntryFilter {
            owner_id,
            task_id: None,
            task_name: self.task.clone(),
            start_after: bound("start_time_after", &self.start_time_after)?,
            start_before: bound("start_time_before", &self.start_time_before)?,
            end_after: bound("end_time_after", &self.end_time_after)?,
            end_before: bound("end_time_before", &self.end_time_before)?,
        })
    }

    pub fn ordering<F: OrderField>(&self, default: &[OrderTerm<F>]) -> Vec<OrderTerm<F>> {
        parse_ordering(self.ordering.as_deref(), default)
    }

    pub fn page_request(&self, settings: PageSettings) -> Result<PageRequest, PaginationError> {
        PageRequest::parse(self.page.as_deref(), self.page_size.as_deref(), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_bound_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_bound("x", "2024-05-01").unwrap(), midnight);
        assert_eq!(parse_bound("x", "2024-05-01T00:00:00Z").unwrap(), midnight);
        assert_eq!(parse_bound("x", "2024-05-01T02:00:00+02:00").unwrap(), midnight);
        assert_eq!(parse_bound("x", "2024-05-01T00:00:00").unwrap(), midnight);
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        let err = parse_bound("end_time_before", "last tuesday").unwrap_err();
        assert_eq!(err.code(), "invalid");
        assert_eq!(err.field(), "end_time_before");
    }

    #[test]
    fn test_task_params_to_filter() {
        let params = TaskListParams {
            name: Some("report".to_string()),
            created_at_after: Some("2024-05-01".to_string()),
            ..Default::default()
        };
        let owner = Uuid::new_v4();
        let filter = params.to_filter(owner).unwrap();

        assert_eq!(filter.owner_id, owner);
        assert_eq!(filter.name.as_deref(), Some("report"));
        assert!(filter.created_after.is_some());
        assert!(filter.created_before.is_none());
    }

    #[test]
    fn test_time_entry_params_reject_bad_bound() {
        let params = TimeEntryListParams {
            start_time_after: Some("nope".to_string()),
            ..Default::default()
        };
        let err = params.to_filter(Uuid::nil()).unwrap_err();
        assert_eq!(err.field(), "start_time_after");
    }
}
