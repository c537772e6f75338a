//! Grouping flat time entry lists into the nested read views.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::tracking::{Task, TimeEntry};

use super::ordering::{DayOrderField, OrderTerm};

/// A task and the entries recorded against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub task: Task,
    pub entries: Vec<TimeEntry>,
}

/// The entries that ended on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub entries: Vec<TimeEntry>,
}

/// Buckets entries under their tasks.
///
/// Groups keep the order of `tasks`, and tasks with no entries still get a
/// group. Entries are ordered latest start first. Entries whose task is not
/// in `tasks` are dropped.
pub fn group_entries_by_task(tasks: Vec<Task>, entries: Vec<TimeEntry>) -> Vec<TaskGroup> {
    let mut by_task: HashMap<Uuid, Vec<TimeEntry>> = HashMap::new();
    for entry in entries {
        by_task.entry(entry.task_id).or_default().push(entry);
    }

    tasks
        .into_iter()
        .map(|task| {
            let mut entries = by_task.remove(&task.id).unwrap_or_default();
            entries.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
            TaskGroup { task, entries }
        })
        .collect()
}

/// Buckets entries by the UTC date they ended on.
///
/// Days follow `ordering` (latest first unless `day` ascending was asked
/// for); entries within a day are ordered latest end first.
pub fn group_entries_by_day(
    entries: Vec<TimeEntry>,
    ordering: &[OrderTerm<DayOrderField>],
) -> Vec<DayGroup> {
    let mut by_day: BTreeMap<NaiveDate, Vec<TimeEntry>> = BTreeMap::new();
    for entry in entries {
        by_day
            .entry(entry.end_time.date_naive())
            .or_default()
            .push(entry);
    }

    let groups = by_day.into_iter().map(|(day, mut entries)| {
        entries.sort_by(|a, b| b.end_time.cmp(&a.end_time).then_with(|| a.id.cmp(&b.id)));
        DayGroup { day, entries }
    });

    let ascending = ordering.first().is_some_and(|term| !term.descending);
    if ascending {
        groups.collect()
    } else {
        groups.rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ordering::DEFAULT_DAY_ORDERING;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_group_by_task_keeps_task_order_and_empty_tasks() {
        let owner = Uuid::new_v4();
        let alpha = Task::new(owner, "Alpha");
        let bravo = Task::new(owner, "Bravo");
        let early = TimeEntry::new(owner, alpha.id, at(1, 9), at(1, 10));
        let late = TimeEntry::new(owner, alpha.id, at(2, 9), at(2, 10));

        let groups = group_entries_by_task(
            vec![alpha.clone(), bravo.clone()],
            vec![early.clone(), late.clone()],
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].task, alpha);
        assert_eq!(groups[0].entries, vec![late, early]);
        assert_eq!(groups[1].task, bravo);
        assert!(groups[1].entries.is_empty());
    }

    #[test]
    fn test_group_by_task_with_no_tasks() {
        let entry = TimeEntry::new(Uuid::nil(), Uuid::new_v4(), at(1, 9), at(1, 10));
        assert!(group_entries_by_task(vec![], vec![entry]).is_empty());
    }

    #[test]
    fn test_group_by_day_default_is_latest_day_first() {
        let owner = Uuid::new_v4();
        let task = Uuid::new_v4();
        let yesterday = TimeEntry::new(owner, task, at(1, 9), at(1, 10));
        let today_early = TimeEntry::new(owner, task, at(2, 8), at(2, 9));
        let today_late = TimeEntry::new(owner, task, at(2, 12), at(2, 13));

        let groups = group_entries_by_day(
            vec![today_early.clone(), yesterday.clone(), today_late.clone()],
            DEFAULT_DAY_ORDERING,
        );

        let days: Vec<_> = groups.iter().map(|g| g.day.to_string()).collect();
        assert_eq!(days, ["2024-05-02", "2024-05-01"]);
        assert_eq!(groups[0].entries, vec![today_late, today_early]);
        assert_eq!(groups[1].entries, vec![yesterday]);
    }

    #[test]
    fn test_group_by_day_ascending() {
        let owner = Uuid::new_v4();
        let task = Uuid::new_v4();
        let entries = vec![
            TimeEntry::new(owner, task, at(3, 9), at(3, 10)),
            TimeEntry::new(owner, task, at(1, 9), at(1, 10)),
        ];

        let groups = group_entries_by_day(entries, &[OrderTerm::asc(DayOrderField::Day)]);
        let days: Vec<_> = groups.iter().map(|g| g.day.to_string()).collect();
        assert_eq!(days, ["2024-05-01", "2024-05-03"]);
    }

    #[test]
    fn test_group_by_day_uses_end_date() {
        let owner = Uuid::new_v4();
        let task = Uuid::new_v4();
        let overnight = TimeEntry::new(owner, task, at(1, 22), at(2, 1));

        let groups = group_entries_by_day(vec![overnight.clone()], DEFAULT_DAY_ORDERING);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].day.to_string(), "2024-05-02");
        assert_eq!(groups[0].entries, vec![overnight]);
    }

    #[test]
    fn test_group_by_day_empty() {
        assert!(group_entries_by_day(vec![], DEFAULT_DAY_ORDERING).is_empty());
    }
}
