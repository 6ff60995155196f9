//! `ViewPort` that records what the page would show.

use krishi_core::{HistoryOption, Report, ViewPort};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Visible state of the diagnosis page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Screen {
    /// Report on display, if the report view is visible.
    pub report: Option<Report>,
    pub upload_visible: bool,
    pub analyzing: bool,
    pub controls_enabled: bool,
    /// Most recent blocking notice.
    pub notice: Option<String>,
    /// Newest-first history dropdown.
    pub history: Vec<HistoryOption>,
    pub history_visible: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            report: None,
            upload_visible: true,
            analyzing: false,
            controls_enabled: true,
            notice: None,
            history: Vec::new(),
            history_visible: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct CapturedView {
    screen: Mutex<Screen>,
}

impl CapturedView {
    pub fn snapshot(&self) -> Screen {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(&mut Screen)) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *screen);
    }
}

impl ViewPort for CapturedView {
    fn show_report(&self, report: &Report) {
        self.update(|s| {
            s.report = Some(report.clone());
            s.upload_visible = false;
            s.analyzing = false;
        });
    }

    fn show_upload_prompt(&self) {
        self.update(|s| {
            s.report = None;
            s.upload_visible = true;
            s.analyzing = false;
        });
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.update(|s| s.controls_enabled = enabled);
    }

    fn set_analyzing(&self, analyzing: bool) {
        self.update(|s| s.analyzing = analyzing);
    }

    fn show_notice(&self, message: &str) {
        tracing::info!(notice = message, "user notice");
        self.update(|s| s.notice = Some(message.to_string()));
    }

    fn show_history(&self, options: &[HistoryOption]) {
        self.update(|s| {
            s.history = options.to_vec();
            s.history_visible = !options.is_empty();
        });
    }
}
