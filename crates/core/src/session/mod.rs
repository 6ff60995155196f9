//! Tab-scoped key/value storage behind an injectable trait.
//!
//! The diagnosis store only ever talks to a `SessionStore`, so it runs the
//! same against SQLite-backed storage and the in-memory fake.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::Error;

/// Typed keys of the persisted session layout. Every value is a JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Serialized current `DiagnosisResult`.
    DiagnosisResult,
    /// Current image data URI (JSON string).
    DiagnosisImage,
    /// Serialized history log array.
    DiagnosisHistory,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiagnosisResult => "diagnosisResult",
            Self::DiagnosisImage => "diagnosisImage",
            Self::DiagnosisHistory => "diagnosisHistory",
        }
    }
}

/// Key/value storage scoped to one tab session.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value, None if absent.
    async fn get(&self, key: SessionKey) -> Result<Option<String>, Error>;

    /// Write all entries atomically: readers observe all of them or none.
    async fn set_many(&self, entries: Vec<(SessionKey, String)>) -> Result<(), Error>;

    /// Remove the given keys.
    async fn remove(&self, keys: &[SessionKey]) -> Result<(), Error>;

    /// Drop everything this session stored.
    async fn clear(&self) -> Result<(), Error>;

    async fn set(&self, key: SessionKey, value: String) -> Result<(), Error> {
        self.set_many(vec![(key, value)]).await
    }
}
