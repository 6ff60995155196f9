//! SQLite-backed storage for the offline worker and the tab session.
//!
//! Persistent storage via tokio-rusqlite, supporting:
//!
//! - Versioned cache buckets of captured GET responses
//! - Request-identity keys using SHA-256 hashing
//! - Tab-scoped key/value session rows
//! - Automatic schema migrations and WAL mode

pub mod buckets;
pub mod connection;
pub mod hash;
pub mod migrations;
pub mod sessions;

pub use crate::Error;

pub use buckets::CapturedResponse;
pub use connection::CacheDb;
