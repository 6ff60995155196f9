//! Process-local session storage, used where nothing needs to persist.

use super::{SessionKey, SessionStore};
use crate::Error;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory `SessionStore`.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, Error> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set_many(&self, entries: Vec<(SessionKey, String)>) -> Result<(), Error> {
        let mut values = self.values.write().await;
        values.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[SessionKey]) -> Result<(), Error> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.values.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_many_then_remove() {
        let store = MemorySessionStore::new();
        store
            .set_many(vec![
                (SessionKey::DiagnosisResult, "{}".into()),
                (SessionKey::DiagnosisHistory, "[]".into()),
            ])
            .await
            .unwrap();

        store.remove(&[SessionKey::DiagnosisResult]).await.unwrap();

        assert!(store.get(SessionKey::DiagnosisResult).await.unwrap().is_none());
        assert_eq!(store.get(SessionKey::DiagnosisHistory).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemorySessionStore::new();
        store.set(SessionKey::DiagnosisImage, "\"data:,\"".into()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get(SessionKey::DiagnosisImage).await.unwrap().is_none());
    }
}
