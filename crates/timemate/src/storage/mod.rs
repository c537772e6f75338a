//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `timemate_core::storage`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): HashMaps behind `tokio::sync::RwLock`
//! - `sqlite`: SQLite using `rusqlite` and `tokio-rusqlite`
//!
//! The two features are mutually exclusive.
//!
//! ```bash
//! cargo build -p timemate --no-default-features --features sqlite,memory
//! ```

#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p timemate --features sqlite"
);

// The in-memory backend also backs the test suite of every other feature set.
#[cfg(any(test, feature = "inmemory"))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

mod notifying;

pub use notifying::NotifyingRepository;

#[cfg(any(test, feature = "inmemory"))]
#[allow(unused_imports)]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
