//! The single active-worker slot.
//!
//! At most one worker is ever active. Registrations run one at a time from
//! install through activation, so one deployment's activation never purges a
//! bucket another is still installing. The swap itself happens with the slot
//! held exclusively, so no request is served against a bucket that is being
//! purged. New workers skip the waiting phase.

use super::{ActivationReport, CacheWorker, ResponseSource, Served};
use crate::fetch::{Network, Request};
use krishi_core::Error;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Routes page requests to whichever worker currently controls the page.
pub struct WorkerRegistry<N> {
    network: Arc<N>,
    active: RwLock<Option<CacheWorker<N>>>,
    registering: Mutex<()>,
}

impl<N: Network> WorkerRegistry<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self { network, active: RwLock::new(None), registering: Mutex::new(()) }
    }

    /// Install `worker` and take over the active slot immediately.
    ///
    /// If install fails the previous worker (if any) keeps control.
    pub async fn register(&self, worker: CacheWorker<N>) -> Result<ActivationReport, Error> {
        let _registration = self.registering.lock().await;
        worker.install().await?;

        let mut slot = self.active.write().await;
        let report = worker.activate().await?;
        if let Some(previous) = slot.replace(worker) {
            previous.retire().await;
        }

        Ok(report)
    }

    /// Version token of the active worker.
    pub async fn active_version(&self) -> Option<String> {
        self.active.read().await.as_ref().map(|w| w.version().to_string())
    }

    /// Send a page request through the active worker, or straight to the
    /// network when no worker controls the page.
    pub async fn dispatch(&self, request: &Request) -> Result<Served, Error> {
        let slot = self.active.read().await;
        match slot.as_ref() {
            Some(worker) => worker.handle_fetch(request).await,
            None => {
                let response = self.network.fetch(request).await?;
                Ok(Served { response, source: ResponseSource::PassThrough })
            }
        }
    }
}
