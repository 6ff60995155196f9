//! Session storage backed by the shared SQLite database.

use super::{SessionKey, SessionStore};
use crate::{CacheDb, Error};

/// `SessionStore` persisted in the shared SQLite database under one session id.
#[derive(Clone, Debug)]
pub struct SqliteSessionStore {
    db: CacheDb,
    session_id: String,
}

impl SqliteSessionStore {
    pub fn new(db: CacheDb, session_id: impl Into<String>) -> Self {
        Self { db, session_id: session_id.into() }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Keep this session from being purged as abandoned.
    pub async fn renew_lease(&self) -> Result<(), Error> {
        self.db.renew_session_lease(&self.session_id).await
    }
}

#[async_trait::async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, Error> {
        self.db.get_session_value(&self.session_id, key.as_str()).await
    }

    async fn set_many(&self, entries: Vec<(SessionKey, String)>) -> Result<(), Error> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.as_str().to_string(), value))
            .collect();
        self.db.set_session_values(&self.session_id, entries).await
    }

    async fn remove(&self, keys: &[SessionKey]) -> Result<(), Error> {
        let keys = keys.iter().map(|k| k.as_str().to_string()).collect();
        self.db.remove_session_values(&self.session_id, keys).await
    }

    async fn clear(&self) -> Result<(), Error> {
        let removed = self.db.end_session(&self.session_id).await?;
        tracing::debug!(session_id = %self.session_id, removed, "session storage cleared");
        Ok(())
    }
}
