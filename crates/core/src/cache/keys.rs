//! Cache key derivation for memoized list responses.
//!
//! A key is `{view}:user={owner_id}:{query}` where `query` is the request's
//! query string re-encoded in its original parameter order. Every key for an
//! owner therefore matches [`owner_pattern`], which is what a write by that
//! owner invalidates.

use url::form_urlencoded;
use uuid::Uuid;

/// Read views whose responses are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedView {
    TaskList,
    TimeEntryList,
    TimeEntriesByTask,
    TimeEntriesByDay,
}

impl CachedView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskList => "task_list",
            Self::TimeEntryList => "time_entry_list",
            Self::TimeEntriesByTask => "time_entries_by_task",
            Self::TimeEntriesByDay => "time_entries_by_day",
        }
    }
}

/// Re-encodes a raw query string.
///
/// Percent-encoding differences collapse (`a=%41` and `a=A` agree) but the
/// parameter order is kept, so `a=1&b=2` and `b=2&a=1` are distinct keys.
pub fn normalize_query(query: Option<&str>) -> String {
    let pairs = form_urlencoded::parse(query.unwrap_or_default().as_bytes());
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Returns the cache key for a list response.
pub fn list_key(view: CachedView, owner_id: Uuid, query: Option<&str>) -> String {
    format!(
        "{}:user={}:{}",
        view.as_str(),
        owner_id,
        normalize_query(query)
    )
}

/// Returns the pattern matching every cached response for an owner.
pub fn owner_pattern(owner_id: Uuid) -> String {
    format!("*:user={}:*", owner_id)
}

/// Returns the key of the set tracking an owner's cache keys.
///
/// Backends that can not glob cheaply (Redis without SCAN) record each key
/// here so an owner's entries can be dropped in one pass.
pub fn owner_tracking_key(owner_id: Uuid) -> String {
    format!("user:{}:_keys", owner_id)
}

/// Extracts the owner id from a list key, if present.
///
/// ```
/// use timemate_core::cache::{extract_owner_id_from_key, list_key, CachedView};
/// use uuid::Uuid;
///
/// let key = list_key(CachedView::TaskList, Uuid::nil(), Some("page=2"));
/// assert_eq!(extract_owner_id_from_key(&key), Some(Uuid::nil()));
/// assert_eq!(extract_owner_id_from_key("unrelated"), None);
/// ```
pub fn extract_owner_id_from_key(key: &str) -> Option<Uuid> {
    let (_, rest) = key.split_once(":user=")?;
    let id = rest.split(':').next()?;
    Uuid::parse_str(id).ok()
}

/// Extracts the owner id from an [`owner_pattern`], if that is what it is.
pub fn extract_owner_id_from_pattern(pattern: &str) -> Option<Uuid> {
    let id = pattern.strip_prefix("*:user=")?.strip_suffix(":*")?;
    Uuid::parse_str(id).ok()
}
