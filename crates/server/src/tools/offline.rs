//! offline_fetch and cache_status tools.

use super::json_result;
use crate::error::ToolError;
use krishi_client::fetch::resolve;
use krishi_client::{Network, Request, RequestMode, WorkerRegistry};
use krishi_core::CacheDb;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for the offline_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfflineFetchParams {
    /// Absolute URL or path on the backend origin (e.g. `/dashboard`).
    pub url: String,
    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
    /// Treat the request as a page navigation (default: false).
    #[serde(default)]
    pub navigate: Option<bool>,
}

/// Output of offline_fetch. The body itself is not returned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfflineFetchOutput {
    pub url: String,
    pub status: u16,
    /// `cache`, `network` or `pass_through`.
    pub source: String,
    pub content_type: Option<String>,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketStatus {
    pub name: String,
    pub entries: u64,
}

/// Output of cache_status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    /// Version of the worker controlling the page, if any.
    pub active_version: Option<String>,
    pub buckets: Vec<BucketStatus>,
}

/// Implementation of the offline_fetch tool.
pub async fn fetch_impl<N: Network>(
    registry: &WorkerRegistry<N>, origin: &Url, params: OfflineFetchParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(&params.url, origin).map_err(|e| ToolError::InvalidInput(e.to_string()))?;

    let mut request = match params.method.as_deref() {
        Some(method) => Request::with_method(method, url)?,
        None => Request::get(url),
    };
    if params.navigate.unwrap_or(false) {
        request.mode = RequestMode::Navigate;
    }

    let served = registry.dispatch(&request).await?;
    let source = serde_json::to_value(served.source)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    tracing::debug!(url = %request.url, status = served.response.status, %source, "offline fetch");

    json_result(&OfflineFetchOutput {
        url: request.url.to_string(),
        status: served.response.status,
        source,
        content_type: served.response.content_type,
        bytes: served.response.body.len(),
    })
}

/// Implementation of the cache_status tool.
pub async fn status_impl<N: Network>(registry: &WorkerRegistry<N>, cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let active_version = registry.active_version().await;

    let mut buckets = Vec::new();
    for name in cache.bucket_names().await? {
        let entries = cache.bucket_len(&name).await?;
        buckets.push(BucketStatus { name, entries });
    }

    json_result(&CacheStatusOutput { active_version, buckets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ORIGIN, StubNetwork, decode};
    use krishi_client::{CacheWorker, WorkerConfig};
    use std::sync::Arc;

    async fn active_registry() -> (WorkerRegistry<StubNetwork>, Arc<StubNetwork>, CacheDb) {
        let network = Arc::new(StubNetwork::default());
        network.serve("/", "<html>home</html>");
        network.serve("/dashboard", "<html>dashboard</html>");

        let db = CacheDb::open_in_memory().await.unwrap();
        let registry = WorkerRegistry::new(network.clone());
        let worker = CacheWorker::new(
            WorkerConfig {
                version: "smart-farmer-v3".into(),
                origin: Url::parse(ORIGIN).unwrap(),
                precache: vec!["/".into()],
                bypass_paths: vec!["/login".into(), "/signup".into()],
            },
            db.clone(),
            network.clone(),
        );
        registry.register(worker).await.unwrap();
        (registry, network, db)
    }

    fn params(url: &str, navigate: bool) -> OfflineFetchParams {
        OfflineFetchParams { url: url.into(), method: None, navigate: Some(navigate) }
    }

    #[tokio::test]
    async fn test_precached_asset_served_from_cache_offline() {
        let (registry, network, _db) = active_registry().await;
        network.set_offline(true);
        let origin = Url::parse(ORIGIN).unwrap();

        let output: OfflineFetchOutput = decode(&fetch_impl(&registry, &origin, params("/", false)).await.unwrap());
        assert_eq!(output.source, "cache");
        assert_eq!(output.status, 200);
        assert_eq!(output.bytes, "<html>home</html>".len());
    }

    #[tokio::test]
    async fn test_navigation_goes_network_first() {
        let (registry, _network, _db) = active_registry().await;
        let origin = Url::parse(ORIGIN).unwrap();

        let output: OfflineFetchOutput =
            decode(&fetch_impl(&registry, &origin, params("/dashboard", true)).await.unwrap());
        assert_eq!(output.source, "network");
        assert_eq!(output.url, "http://127.0.0.1:5000/dashboard");
    }

    #[tokio::test]
    async fn test_invalid_method_and_url_rejected() {
        let (registry, _network, _db) = active_registry().await;
        let origin = Url::parse(ORIGIN).unwrap();

        let bad_method = OfflineFetchParams { url: "/".into(), method: Some("GE T".into()), navigate: None };
        assert!(fetch_impl(&registry, &origin, bad_method).await.is_err());

        let bad_url = params("ftp://example.com/file", false);
        assert!(fetch_impl(&registry, &origin, bad_url).await.is_err());
    }

    #[tokio::test]
    async fn test_cache_status_lists_active_bucket() {
        let (registry, _network, db) = active_registry().await;

        let status: CacheStatusOutput = decode(&status_impl(&registry, &db).await.unwrap());
        assert_eq!(status.active_version.as_deref(), Some("smart-farmer-v3"));
        assert_eq!(status.buckets.len(), 1);
        assert_eq!(status.buckets[0].name, "smart-farmer-v3");
        assert_eq!(status.buckets[0].entries, 1);
    }
}
