//! # Storage backends
//!
//! Implementations of [`DatabaseClient`]. SQLite is the only one, enabled by the `sqlite3`
//! feature.
//!
//! [`DatabaseClient`]: crate::db::interface::DatabaseClient

#[cfg(feature = "sqlite3")]
pub mod sqlite;
