//! Process-wide state: the offline worker slot and this process's tab session.

use crate::view::CapturedView;
use krishi_client::{AnalysisClient, CacheWorker, DiagnosisSession, FetchConfig, HttpNetwork, WorkerConfig, WorkerRegistry};
use krishi_core::{AppConfig, CacheDb, DiagnosisStore, Error, SessionStore, SqliteSessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

pub type Session = DiagnosisSession<AnalysisClient, SqliteSessionStore, CapturedView>;

pub struct AppState {
    pub cache: CacheDb,
    pub origin: Url,
    pub registry: WorkerRegistry<HttpNetwork>,
    pub session: Session,
    lease: Duration,
}

impl AppState {
    /// Open storage, register the offline worker for the configured version
    /// and restore this session's page state.
    pub async fn build(config: &AppConfig) -> Result<Arc<Self>, Error> {
        let cache = CacheDb::open(&config.db_path).await?;
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let session_id = config.session_id();
        let lease = config.session_lease();
        cache.renew_session_lease(&session_id).await?;
        let abandoned = cache.purge_abandoned_sessions(&session_id, lease).await?;
        if abandoned > 0 {
            tracing::info!(abandoned, "purged storage of ended sessions");
        }

        let network = Arc::new(HttpNetwork::new(FetchConfig::from(config))?);
        let registry = WorkerRegistry::new(network.clone());
        let worker = CacheWorker::new(WorkerConfig::from_app_config(config)?, cache.clone(), network);
        match registry.register(worker).await {
            Ok(report) => tracing::info!(version = %report.version, purged = ?report.purged, "offline worker active"),
            Err(e) => tracing::warn!(error = %e, "offline worker not installed; requests go straight to the network"),
        }

        let analyzer = AnalysisClient::new(&origin, &config.user_agent, config.timeout())?;
        let store = DiagnosisStore::new(SqliteSessionStore::new(cache.clone(), session_id), CapturedView::default());
        let session = DiagnosisSession::new(analyzer, store);
        session.store().load_session().await?;

        Ok(Arc::new(Self { cache, origin, registry, session, lease }))
    }

    /// Renew the session lease at a third of its length until aborted.
    pub fn spawn_lease_renewal(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(state.lease / 3);
            loop {
                ticker.tick().await;
                if let Err(e) = state.session.store().storage().renew_lease().await {
                    tracing::warn!(error = %e, "failed to renew session lease");
                }
            }
        })
    }

    /// Drop everything the tab session stored.
    pub async fn end_session(&self) {
        if let Err(e) = self.session.store().storage().clear().await {
            tracing::warn!(error = %e, "failed to clear session storage");
        }
    }
}
