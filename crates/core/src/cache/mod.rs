mod error;
mod keys;
mod patterns;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    extract_owner_id_from_key, extract_owner_id_from_pattern, list_key, normalize_query,
    owner_pattern, owner_tracking_key, CachedView,
};
pub use patterns::pattern_matches;
pub use traits::Cache;
