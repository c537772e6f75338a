//! Glob matching for cache keys.
//!
//! Only `*` is special; it matches any run of characters, including none.

/// Checks if a cache key matches a glob pattern.
///
/// ```
/// use timemate_core::cache::pattern_matches;
///
/// assert!(pattern_matches("task_list:*", "task_list:user=1:page=2"));
/// assert!(pattern_matches("*:user=1:*", "time_entries_by_day:user=1:"));
/// assert!(!pattern_matches("*:user=1:*", "time_entries_by_day:user=12:"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let mut segments = pattern.split('*');
    let Some(first) = segments.next() else {
        return key.is_empty();
    };
    let Some(mut remaining) = key.strip_prefix(first) else {
        return false;
    };

    let rest: Vec<&str> = segments.collect();
    let Some((last, middle)) = rest.split_last() else {
        // No wildcard at all.
        return remaining.is_empty();
    };

    for segment in middle {
        match remaining.find(segment) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
