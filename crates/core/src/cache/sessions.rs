//! Tab-scoped session rows.
//!
//! Each row belongs to one session id. Ending a session deletes its rows;
//! nothing here outlives the session that wrote it.
//!
//! A live session holds a lease it renews periodically. Rows of sessions
//! whose lease has lapsed (the process died without ending its session) are
//! purged by the next session to start.

use super::connection::CacheDb;
use std::time::Duration;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Read one session value.
    pub async fn get_session_value(&self, session_id: &str, key: &str) -> Result<Option<String>, Error> {
        let session_id = session_id.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT value FROM session_storage WHERE session_id = ?1 AND key = ?2",
                    params![session_id, key],
                    |row| row.get(0),
                );

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Write several session values in one transaction.
    pub async fn set_session_values(&self, session_id: &str, entries: Vec<(String, String)>) -> Result<(), Error> {
        let session_id = session_id.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let now = chrono::Utc::now().to_rfc3339();
                let tx = conn.transaction()?;
                for (key, value) in &entries {
                    tx.execute(
                        "INSERT INTO session_storage (session_id, key, value, updated_at)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(session_id, key) DO UPDATE SET
                            value = excluded.value,
                            updated_at = excluded.updated_at",
                        params![&session_id, key, value, &now],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the given keys from a session.
    pub async fn remove_session_values(&self, session_id: &str, keys: Vec<String>) -> Result<(), Error> {
        let session_id = session_id.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for key in &keys {
                    tx.execute(
                        "DELETE FROM session_storage WHERE session_id = ?1 AND key = ?2",
                        params![&session_id, key],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every row of a session, and its lease.
    ///
    /// Returns the number of deleted storage rows.
    pub async fn end_session(&self, session_id: &str) -> Result<u64, Error> {
        let session_id = session_id.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let count = tx.execute("DELETE FROM session_storage WHERE session_id = ?1", params![&session_id])?;
                tx.execute("DELETE FROM session_leases WHERE session_id = ?1", params![&session_id])?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Mark a session alive as of now.
    pub async fn renew_session_lease(&self, session_id: &str) -> Result<(), Error> {
        let session_id = session_id.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO session_leases (session_id, renewed_at) VALUES (?1, ?2)
                     ON CONFLICT(session_id) DO UPDATE SET renewed_at = excluded.renewed_at",
                    params![session_id, chrono::Utc::now().timestamp_millis()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete rows of sessions other than `keep` whose lease was last renewed
    /// more than `lease` ago, or that hold no lease at all.
    ///
    /// Returns the number of deleted storage rows.
    pub async fn purge_abandoned_sessions(&self, keep: &str, lease: Duration) -> Result<u64, Error> {
        let keep = keep.to_string();
        let cutoff = chrono::Utc::now().timestamp_millis() - lease.as_millis() as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let count = tx.execute(
                    "DELETE FROM session_storage
                     WHERE session_id != ?1
                       AND session_id NOT IN (SELECT session_id FROM session_leases WHERE renewed_at >= ?2)",
                    params![&keep, cutoff],
                )?;
                tx.execute(
                    "DELETE FROM session_leases WHERE session_id != ?1 AND renewed_at < ?2",
                    params![&keep, cutoff],
                )?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
