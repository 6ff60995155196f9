//! Rendering surface capability.
//!
//! The store and the diagnosis flow drive a `ViewPort` instead of touching any
//! UI directly, so their state machine runs without a rendering surface.

use crate::history::{HistoryOption, Report};

/// Commands the page-side logic issues to whatever is displaying it.
pub trait ViewPort: Send + Sync {
    /// Reveal the report view with `report`, hiding the upload view and the
    /// analyzing indicator.
    fn show_report(&self, report: &Report);

    /// Hide the report and show the upload prompt.
    fn show_upload_prompt(&self);

    /// Enable or disable the image submission controls.
    fn set_controls_enabled(&self, enabled: bool);

    /// Show or hide the analyzing indicator over the image preview.
    fn set_analyzing(&self, analyzing: bool);

    /// Blocking notice (alert) for the user.
    fn show_notice(&self, message: &str);

    /// Replace the history dropdown. An empty slice hides its container.
    fn show_history(&self, options: &[HistoryOption]);
}
