//! `?ordering=` parsing and in-memory sorting.
//!
//! The parameter is a comma separated list of field names, each optionally
//! prefixed with `-` for descending order. Unknown names are skipped; if no
//! name survives, the view's default ordering applies.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::tracking::{Task, TimeEntry};

/// A field a view can be ordered by.
pub trait OrderField: Copy + Eq {
    fn parse(name: &str) -> Option<Self>;
}

/// One term of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm<F> {
    pub field: F,
    pub descending: bool,
}

impl<F> OrderTerm<F> {
    pub const fn asc(field: F) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub const fn desc(field: F) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Parses an ordering parameter, falling back to `default`.
pub fn parse_ordering<F: OrderField>(raw: Option<&str>, default: &[OrderTerm<F>]) -> Vec<OrderTerm<F>> {
    let terms: Vec<OrderTerm<F>> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (name, descending) = match term.strip_prefix('-') {
                Some(name) => (name, true),
                None => (term, false),
            };
            F::parse(name).map(|field| OrderTerm { field, descending })
        })
        .collect();

    if terms.is_empty() {
        default.to_vec()
    } else {
        terms
    }
}

fn compare_terms<T, F: Copy>(
    a: &T,
    b: &T,
    terms: &[OrderTerm<F>],
    compare_field: impl Fn(&T, &T, F) -> Ordering,
) -> Ordering {
    terms
        .iter()
        .map(|term| {
            let ordering = compare_field(a, b, term.field);
            if term.descending {
                ordering.reverse()
            } else {
                ordering
            }
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrderField {
    Name,
    CreatedAt,
}

impl OrderField for TaskOrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

pub const DEFAULT_TASK_ORDERING: &[OrderTerm<TaskOrderField>] = &[OrderTerm::asc(TaskOrderField::Name)];

/// Sorts tasks by the given terms, breaking ties on id.
pub fn sort_tasks(tasks: &mut [Task], terms: &[OrderTerm<TaskOrderField>]) {
    tasks.sort_by(|a, b| {
        compare_terms(a, b, terms, |a, b, field| match field {
            TaskOrderField::Name => a.name.cmp(&b.name),
            TaskOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        })
        .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEntryOrderField {
    StartTime,
    EndTime,
    Duration,
    TaskName,
    CreatedAt,
}

impl OrderField for TimeEntryOrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "start_time" => Some(Self::StartTime),
            "end_time" => Some(Self::EndTime),
            "duration" => Some(Self::Duration),
            "task__name" => Some(Self::TaskName),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

pub const DEFAULT_TIME_ENTRY_ORDERING: &[OrderTerm<TimeEntryOrderField>] = &[
    OrderTerm::asc(TimeEntryOrderField::TaskName),
    OrderTerm::desc(TimeEntryOrderField::StartTime),
];

/// Sorts time entries by the given terms, breaking ties on id.
///
/// `task_names` maps task ids to names for `task__name` ordering; entries
/// whose task is missing from the map sort as if the name were empty.
pub fn sort_time_entries(
    entries: &mut [TimeEntry],
    terms: &[OrderTerm<TimeEntryOrderField>],
    task_names: &HashMap<Uuid, String>,
) {
    let name_of = |entry: &TimeEntry| task_names.get(&entry.task_id).map_or("", String::as_str);

    entries.sort_by(|a, b| {
        compare_terms(a, b, terms, |a, b, field| match field {
            TimeEntryOrderField::StartTime => a.start_time.cmp(&b.start_time),
            TimeEntryOrderField::EndTime => a.end_time.cmp(&b.end_time),
            TimeEntryOrderField::Duration => a.duration().cmp(&b.duration()),
            TimeEntryOrderField::TaskName => name_of(a).cmp(name_of(b)),
            TimeEntryOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        })
        .then_with(|| a.id.cmp(&b.id))
    });
}

/// The day-grouped view can only be ordered by its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOrderField {
    Day,
}

impl OrderField for DayOrderField {
    fn parse(name: &str) -> Option<Self> {
        (name == "day").then_some(Self::Day)
    }
}

pub const DEFAULT_DAY_ORDERING: &[OrderTerm<DayOrderField>] = &[OrderTerm::desc(DayOrderField::Day)];
