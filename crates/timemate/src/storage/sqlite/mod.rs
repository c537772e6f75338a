//! SQLite storage backend.
//!
//! Uses `rusqlite` for the statements and `tokio-rusqlite` to run them off the
//! async runtime. The schema enforces the same constraints the in-memory
//! backend checks by hand: unique task names per owner, `end_time > start_time`
//! and cascading deletes from a task to its time entries.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
