//! Cache strategy worker.
//!
//! ### Lifecycle
//! `Installing -> Waiting -> Active -> Redundant`. Install precaches the asset
//! manifest into a bucket named by the version token, all or nothing.
//! Activation deletes every other bucket (best effort) before the worker
//! starts serving.
//!
//! ### Routing
//! See [`strategy::route`]: mutations and auth paths pass through,
//! navigations are network-first, static sub-resources are cache-first.
//! Nothing but install ever writes to the bucket.

pub mod registry;
pub mod strategy;

pub use registry::WorkerRegistry;
pub use strategy::{Strategy, route};

use crate::fetch::{Network, Request, resolve};
use krishi_core::{AppConfig, CacheDb, CapturedResponse, Error};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
    Redundant,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    PassThrough,
}

/// A response together with how the worker obtained it.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: CapturedResponse,
    pub source: ResponseSource,
}

/// Outcome of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub version: String,
    /// Stale buckets deleted.
    pub purged: Vec<String>,
    /// Stale buckets that failed to delete; retried on the next activation.
    pub failed: Vec<String>,
}

/// Deployment-specific worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Version token; also the bucket name.
    pub version: String,
    pub origin: Url,
    /// Asset paths fetched at install.
    pub precache: Vec<String>,
    /// Path prefixes never intercepted.
    pub bypass_paths: Vec<String>,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            version: config.cache_version.clone(),
            origin,
            precache: config.precache_assets.clone(),
            bypass_paths: config.bypass_paths.clone(),
        })
    }
}

/// One deployment's worker.
pub struct CacheWorker<N> {
    config: WorkerConfig,
    cache: CacheDb,
    network: Arc<N>,
    state: RwLock<WorkerState>,
}

impl<N: Network> CacheWorker<N> {
    pub fn new(config: WorkerConfig, cache: CacheDb, network: Arc<N>) -> Self {
        Self { config, cache, network, state: RwLock::new(WorkerState::Installing) }
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn expect_state(&self, expected: WorkerState, action: &str) -> Result<(), Error> {
        let current = self.state().await;
        if current != expected {
            return Err(Error::InvalidWorkerState(format!("cannot {action} from {current:?}")));
        }
        Ok(())
    }

    /// Precache the manifest into this version's bucket.
    ///
    /// A bucket already written for this version is adopted as-is: the same
    /// version is never reinstalled, so a restart while offline keeps serving
    /// it. Otherwise, on any failure the worker becomes `Redundant` and no
    /// bucket is written.
    pub async fn install(&self) -> Result<(), Error> {
        self.expect_state(WorkerState::Installing, "install").await?;

        match self.cache.has_bucket(&self.config.version).await {
            Ok(true) => {
                tracing::info!(version = %self.config.version, "bucket already installed, adopting it");
                *self.state.write().await = WorkerState::Waiting;
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(version = %self.config.version, error = %e, "bucket lookup failed, reinstalling"),
        }

        tracing::info!(version = %self.config.version, assets = self.config.precache.len(), "installing worker");

        match self.precache().await {
            Ok(()) => {
                *self.state.write().await = WorkerState::Waiting;
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = WorkerState::Redundant;
                tracing::error!(version = %self.config.version, error = %e, "install failed");
                Err(Error::InstallFailed(e.to_string()))
            }
        }
    }

    async fn precache(&self) -> Result<(), Error> {
        let mut responses = Vec::with_capacity(self.config.precache.len());
        for asset in &self.config.precache {
            let url = resolve(asset, &self.config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
            let response = self.network.fetch(&Request::get(url)).await?;
            if !response.is_success() {
                return Err(Error::HttpError(format!("{asset} returned status {}", response.status)));
            }
            responses.push(response);
        }
        self.cache.put_bucket(&self.config.version, &responses).await
    }

    /// Delete every bucket but this version's, then start serving.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.expect_state(WorkerState::Waiting, "activate").await?;

        let mut report = ActivationReport { version: self.config.version.clone(), ..Default::default() };

        let names = match self.cache.bucket_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate buckets; stale cleanup deferred");
                Vec::new()
            }
        };

        for name in names.into_iter().filter(|n| *n != self.config.version) {
            match self.cache.delete_bucket(&name).await {
                Ok(_) => report.purged.push(name),
                Err(e) => {
                    tracing::warn!(bucket = %name, error = %e, "failed to delete stale bucket");
                    report.failed.push(name);
                }
            }
        }

        *self.state.write().await = WorkerState::Active;
        tracing::info!(
            version = %self.config.version,
            purged = report.purged.len(),
            failed = report.failed.len(),
            "worker active, claiming clients"
        );

        Ok(report)
    }

    /// Mark this worker superseded.
    pub async fn retire(&self) {
        *self.state.write().await = WorkerState::Redundant;
        tracing::info!(version = %self.config.version, "worker superseded");
    }

    /// Satisfy an intercepted request according to its strategy.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Served, Error> {
        if self.state().await != WorkerState::Active {
            return Err(Error::WorkerInactive);
        }

        let strategy = route(request, &self.config.bypass_paths);
        tracing::debug!(method = %request.method, url = %request.url, ?strategy, "intercepted request");

        match strategy {
            Strategy::PassThrough => {
                let response = self.network.fetch(request).await?;
                Ok(Served { response, source: ResponseSource::PassThrough })
            }
            Strategy::NetworkFirst => match self.network.fetch(request).await {
                Ok(response) => Ok(Served { response, source: ResponseSource::Network }),
                Err(network_err) => match self.lookup(request).await {
                    Some(response) => Ok(Served { response, source: ResponseSource::Cache }),
                    None => Err(Error::Offline(format!("{}: {}", request.url, network_err))),
                },
            },
            Strategy::CacheFirst => {
                if let Some(response) = self.lookup(request).await {
                    return Ok(Served { response, source: ResponseSource::Cache });
                }
                let response = self.network.fetch(request).await?;
                Ok(Served { response, source: ResponseSource::Network })
            }
        }
    }

    /// Current-bucket lookup; storage errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<CapturedResponse> {
        match self
            .cache
            .match_entry(&self.config.version, request.method.as_str(), request.url.as_str())
            .await
        {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }
}
