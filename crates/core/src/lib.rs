//! Core types and shared functionality for the Krishi offline client.
//!
//! This crate provides:
//! - Diagnosis data model and the report renderer
//! - SQLite-backed cache buckets and tab-scoped session storage
//! - The diagnosis session/history store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod session;
pub mod view;

pub use cache::{CacheDb, CapturedResponse};
pub use config::AppConfig;
pub use error::Error;
pub use history::{DiagnosisStore, HistoryOption, Report};
pub use model::{DiagnosisResult, HistoryEntry, SessionState};
pub use session::{MemorySessionStore, SessionKey, SessionStore, SqliteSessionStore};
pub use view::ViewPort;
