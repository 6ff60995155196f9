//! Diagnosis session/history store.
//!
//! Owns the current report (`SessionState`) and the append-only history log,
//! both persisted through an injected `SessionStore`. Only
//! `record_fresh_result` grows the log; restoring or replaying a result only
//! renders.

mod report;

pub use report::{ConfidenceBand, FALLBACK_TREATMENT, HIGH_CONFIDENCE_THRESHOLD, Report, Severity};

use crate::model::{DiagnosisResult, HistoryEntry, SessionState};
use crate::session::{SessionKey, SessionStore};
use crate::view::ViewPort;
use crate::Error;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One row of the newest-first history dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryOption {
    /// Position in the dropdown, 0 = newest.
    pub display_index: usize,
    /// Insertion index in the log; the entry's identity.
    pub original_index: usize,
    /// `"{timestamp} - {name}"`.
    pub label: String,
}

/// Build the newest-first dropdown model without renumbering entries.
///
/// Reverses the whole log on every call, O(n) per render.
pub fn history_options(history: &[HistoryEntry]) -> Vec<HistoryOption> {
    history
        .iter()
        .rev()
        .enumerate()
        .map(|(display_index, entry)| HistoryOption {
            display_index,
            original_index: history.len() - 1 - display_index,
            label: format!("{} - {}", entry.timestamp, entry.result.name),
        })
        .collect()
}

/// Local short time, e.g. `"14:05"`.
fn short_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Session/history store driving a `ViewPort`.
pub struct DiagnosisStore<S, V> {
    storage: S,
    view: V,
    /// Serializes read-modify-write cycles on the persisted log.
    writes: Mutex<()>,
}

impl<S: SessionStore, V: ViewPort> DiagnosisStore<S, V> {
    pub fn new(storage: S, view: V) -> Self {
        Self { storage, view, writes: Mutex::new(()) }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist a just-produced result as the current report, append it to the
    /// log with a fresh timestamp and render it.
    ///
    /// The session-state write and the log append land in one storage call.
    pub async fn record_fresh_result(&self, result: DiagnosisResult, image: String) -> Result<Report, Error> {
        let _guard = self.writes.lock().await;

        let mut history = self.history().await?;
        history.push(HistoryEntry { result: result.clone(), image: image.clone(), timestamp: short_time() });

        self.storage
            .set_many(vec![
                (SessionKey::DiagnosisResult, serde_json::to_string(&result)?),
                (SessionKey::DiagnosisImage, serde_json::to_string(&image)?),
                (SessionKey::DiagnosisHistory, serde_json::to_string(&history)?),
            ])
            .await?;

        tracing::info!(name = %result.name, confidence = result.confidence, entries = history.len(), "recorded diagnosis");

        let report = self.restore_result(&result, &image);
        self.view.show_history(&history_options(&history));
        Ok(report)
    }

    /// Render a result without touching storage.
    ///
    /// Used after a reload and for history replay; calling it twice with the
    /// same arguments yields the same view.
    pub fn restore_result(&self, result: &DiagnosisResult, image: &str) -> Report {
        let report = Report::render(result, image);
        self.view.show_report(&report);
        report
    }

    /// Drop the current report while keeping the log.
    pub async fn clear_session(&self) -> Result<(), Error> {
        let _guard = self.writes.lock().await;

        self.storage
            .remove(&[SessionKey::DiagnosisResult, SessionKey::DiagnosisImage])
            .await?;

        let history = self.history().await?;
        tracing::debug!(entries = history.len(), "session cleared");

        self.view.show_upload_prompt();
        self.view.show_history(&history_options(&history));
        Ok(())
    }

    /// Replay the entry at a newest-first display position.
    ///
    /// Out-of-range positions are a no-op and return None.
    pub async fn select_from_history(&self, display_index: usize) -> Result<Option<Report>, Error> {
        let history = self.history().await?;
        if display_index >= history.len() {
            tracing::debug!(display_index, entries = history.len(), "history selection out of range");
            return Ok(None);
        }

        let entry = &history[history.len() - 1 - display_index];
        Ok(Some(self.restore_result(&entry.result, &entry.image)))
    }

    /// Page-load path: render the dropdown, then restore the current report if
    /// one is persisted.
    pub async fn load_session(&self) -> Result<Option<Report>, Error> {
        let history = self.history().await?;
        self.view.show_history(&history_options(&history));

        match self.current().await? {
            SessionState { current_result: Some(result), current_image: Some(image) } => {
                Ok(Some(self.restore_result(&result, &image)))
            }
            _ => {
                self.view.show_upload_prompt();
                Ok(None)
            }
        }
    }

    /// The history log, oldest first. Unparseable state reads as empty.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, Error> {
        Ok(self.read_json(SessionKey::DiagnosisHistory).await?.unwrap_or_default())
    }

    /// Newest-first dropdown model for the current log.
    pub async fn options(&self) -> Result<Vec<HistoryOption>, Error> {
        Ok(history_options(&self.history().await?))
    }

    /// The persisted current report. Unparseable values read as absent.
    pub async fn current(&self) -> Result<SessionState, Error> {
        Ok(SessionState {
            current_result: self.read_json(SessionKey::DiagnosisResult).await?,
            current_image: self.read_json(SessionKey::DiagnosisImage).await?,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, key: SessionKey) -> Result<Option<T>, Error> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "ignoring malformed session state");
                Ok(None)
            }
        }
    }
}
