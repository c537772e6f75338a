//! Cache backends and the glue between the cache and the write path.
//!
//! Concrete implementations of `timemate_core::cache::Cache`, selected at
//! compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `memory` (default): LRU cache in process memory
//! - `redis`: Redis, shared between instances
//!
//! The two features are mutually exclusive.

#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p timemate --features memory"
);

#[cfg(any(test, feature = "memory"))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

mod generations;
mod invalidation;
mod read_through;

pub use generations::Generations;
pub use invalidation::CacheInvalidator;
pub use read_through::read_through;

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
