//! Image submission flow.
//!
//! One analysis may be outstanding per session: the controls are disabled
//! while it runs and a second submission is refused. A failed analysis shows
//! a notice and leaves the history log untouched; there is no retry and no
//! cancellation.

use crate::analysis::Analyzer;
use krishi_core::{DiagnosisStore, Error, Report, SessionStore, ViewPort};
use std::sync::atomic::{AtomicBool, Ordering};

/// Clears the in-flight flag however the submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Analyzer plus the session/history store it feeds.
pub struct DiagnosisSession<A, S, V> {
    analyzer: A,
    store: DiagnosisStore<S, V>,
    in_flight: AtomicBool,
}

impl<A: Analyzer, S: SessionStore, V: ViewPort> DiagnosisSession<A, S, V> {
    pub fn new(analyzer: A, store: DiagnosisStore<S, V>) -> Self {
        Self { analyzer, store, in_flight: AtomicBool::new(false) }
    }

    pub fn store(&self) -> &DiagnosisStore<S, V> {
        &self.store
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Analyze an image (data URI) and record the fresh result.
    pub async fn submit_image(&self, image: String) -> Result<Report, Error> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(Error::AnalysisInProgress);
        }
        let _in_flight = InFlight(&self.in_flight);

        let view = self.store.view();
        view.set_controls_enabled(false);
        view.set_analyzing(true);

        let outcome = match self.analyzer.analyze(&image).await {
            Ok(result) => self.store.record_fresh_result(result, image).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::error!(error = %e, "diagnosis failed");
            view.set_analyzing(false);
            view.show_notice(&format!("Error analyzing image: {}", notice_text(e)));
        }
        view.set_controls_enabled(true);

        outcome
    }
}

fn notice_text(err: &Error) -> String {
    match err {
        Error::AnalysisFailed(msg) | Error::Network(msg) | Error::InvalidInput(msg) => msg.clone(),
        other => other.to_string(),
    }
}
