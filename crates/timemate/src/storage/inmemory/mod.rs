//! In-memory storage backend.
//!
//! Data lives in HashMaps behind `Arc<RwLock<_>>` and is lost on shutdown.
//! It enforces the same constraints as the SQLite schema, so it is also the
//! backend used by the test suite.

mod repository;

pub use repository::InMemoryRepository;
