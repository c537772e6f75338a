mod filters;
mod grouping;
mod ordering;
mod pagination;
mod params;

pub use filters::{contains_ignore_case, TaskFilter, TimeEntryFilter};
pub use grouping::{group_entries_by_day, group_entries_by_task, DayGroup, TaskGroup};
pub use ordering::{
    parse_ordering, sort_tasks, sort_time_entries, DayOrderField, OrderField, OrderTerm,
    TaskOrderField, TimeEntryOrderField, DEFAULT_DAY_ORDERING, DEFAULT_TASK_ORDERING,
    DEFAULT_TIME_ENTRY_ORDERING,
};
pub use pagination::{
    page_link, paginate, Page, PageLocation, PageNumber, PageRequest, PageSettings,
    PaginationError, PAGE_PARAM, PAGE_SIZE_PARAM,
};
pub use params::{parse_bound, TaskListParams, TimeEntryListParams};
