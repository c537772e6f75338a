//! Functional core for timemate.
//!
//! Everything in this crate is either a plain data type or a pure function.
//! I/O lives in the `timemate` binary crate, which implements the traits
//! declared here.

pub mod cache;
pub mod events;
pub mod query;
pub mod serde;
pub mod storage;
pub mod tracking;
