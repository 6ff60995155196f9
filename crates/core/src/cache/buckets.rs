//! Versioned cache buckets.
//!
//! A bucket is named by a deployment's version token and maps a request
//! identity (method + URL) to a captured response. Only successful GET
//! captures are ever written, and a bucket is written in one transaction so
//! a failed install never leaves a partial bucket behind.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A captured HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    /// The URL the response was captured for.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl CacheDb {
    /// Create (or replace the contents of) a bucket with the given GET captures.
    ///
    /// All rows are written in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if any capture has a non-2xx status; nothing
    /// is written in that case.
    pub async fn put_bucket(&self, name: &str, responses: &[CapturedResponse]) -> Result<(), Error> {
        if let Some(bad) = responses.iter().find(|r| !r.is_success()) {
            return Err(Error::InvalidInput(format!("refusing to cache {} with status {}", bad.url, bad.status)));
        }

        let name = name.to_string();
        let responses = responses.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let now = chrono::Utc::now().to_rfc3339();
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO cache_buckets (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![&name, &now],
                )?;
                tx.execute("DELETE FROM cache_entries WHERE bucket = ?1", params![&name])?;

                for response in &responses {
                    let headers_json = serde_json::to_string(&response.headers)?;
                    tx.execute(
                        "INSERT INTO cache_entries (
                            bucket, key_hash, method, url, status_code,
                            content_type, headers_json, body, stored_at
                        ) VALUES (?1, ?2, 'GET', ?3, ?4, ?5, ?6, ?7, ?8)
                        ON CONFLICT(bucket, key_hash) DO UPDATE SET
                            status_code = excluded.status_code,
                            content_type = excluded.content_type,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                        params![
                            &name,
                            compute_cache_key("GET", &response.url),
                            &response.url,
                            response.status,
                            &response.content_type,
                            headers_json,
                            &response.body,
                            &now,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in a bucket.
    ///
    /// Returns None if the bucket or the entry doesn't exist.
    pub async fn match_entry(&self, bucket: &str, method: &str, url: &str) -> Result<Option<CapturedResponse>, Error> {
        let bucket = bucket.to_string();
        let key_hash = compute_cache_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CapturedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status_code, content_type, headers_json, body
                     FROM cache_entries WHERE bucket = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![bucket, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                    ))
                });

                match result {
                    Ok((url, status, content_type, headers_json, body)) => {
                        let headers = match headers_json {
                            Some(json) => serde_json::from_str(&json)?,
                            None => Vec::new(),
                        };
                        Ok(Some(CapturedResponse { url, status, content_type, headers, body }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List all bucket names, oldest first.
    pub async fn bucket_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_buckets ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a bucket with this name has been written.
    pub async fn has_bucket(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let found: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_buckets WHERE name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(found > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a bucket and all of its entries.
    ///
    /// Returns whether the bucket existed.
    pub async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM cache_entries WHERE bucket = ?1", params![&name])?;
                let deleted = tx.execute("DELETE FROM cache_buckets WHERE name = ?1", params![&name])?;
                tx.commit()?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a bucket.
    pub async fn bucket_len(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE bucket = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(url: &str, status: u16) -> CapturedResponse {
        CapturedResponse {
            url: url.to_string(),
            status,
            content_type: Some("text/css".to_string()),
            headers: vec![("cache-control".to_string(), "max-age=60".to_string())],
            body: b"body { color: green; }".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let css = capture("http://127.0.0.1:5000/static/style.css", 200);
        db.put_bucket("smart-farmer-v3", std::slice::from_ref(&css)).await.unwrap();

        let hit = db
            .match_entry("smart-farmer-v3", "GET", "http://127.0.0.1:5000/static/style.css")
            .await
            .unwrap();
        assert_eq!(hit, Some(css));
    }

    #[tokio::test]
    async fn test_match_other_bucket_misses() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_bucket("smart-farmer-v2", &[capture("http://127.0.0.1:5000/static/style.css", 200)])
            .await
            .unwrap();

        let miss = db
            .match_entry("smart-farmer-v3", "GET", "http://127.0.0.1:5000/static/style.css")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_failed_capture_atomically() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db
            .put_bucket(
                "smart-farmer-v3",
                &[capture("http://127.0.0.1:5000/static/style.css", 200), capture("http://127.0.0.1:5000/static/1.png", 404)],
            )
            .await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(db.bucket_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_bucket_leaves_others() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_bucket("smart-farmer-v1", &[capture("http://127.0.0.1:5000/static/app.js", 200)])
            .await
            .unwrap();
        db.put_bucket("smart-farmer-v2", &[capture("http://127.0.0.1:5000/static/app.js", 200)])
            .await
            .unwrap();

        assert!(db.has_bucket("smart-farmer-v1").await.unwrap());
        assert!(db.delete_bucket("smart-farmer-v1").await.unwrap());
        assert!(!db.delete_bucket("smart-farmer-v1").await.unwrap());
        assert!(!db.has_bucket("smart-farmer-v1").await.unwrap());
        assert_eq!(db.bucket_names().await.unwrap(), vec!["smart-farmer-v2"]);
        assert_eq!(db.bucket_len("smart-farmer-v1").await.unwrap(), 0);
        assert_eq!(db.bucket_len("smart-farmer-v2").await.unwrap(), 1);
    }
}
