//! Report rendering shared by fresh and restored results.
//!
//! `Report::render` is a pure function of `(result, image)`.

use crate::model::DiagnosisResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Confidence strictly above this renders in the high band.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 90.0;

/// Recommendation shown when a result carries no treatments.
pub const FALLBACK_TREATMENT: &str = "Consult a local agricultural expert.";

const HEALTHY_COLOR: &str = "#2e7d32";
const DISEASE_COLOR: &str = "#d32f2f";
const HIGH_CONFIDENCE_COLOR: &str = "#2e7d32";
const MODERATE_CONFIDENCE_COLOR: &str = "#fbc02d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Healthy,
    Disease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Moderate,
}

/// Everything the report view displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub name_color: String,
    /// e.g. `"95%"`.
    pub confidence_text: String,
    /// Bar width in percent, clamped to 0..=100.
    pub confidence_bar_width: f64,
    pub confidence_band: ConfidenceBand,
    pub confidence_bar_color: String,
    pub treatments: Vec<String>,
    pub image: String,
}

impl Report {
    pub fn render(result: &DiagnosisResult, image: &str) -> Self {
        let severity = if result.is_healthy() { Severity::Healthy } else { Severity::Disease };
        let name_color = match severity {
            Severity::Healthy => HEALTHY_COLOR,
            Severity::Disease => DISEASE_COLOR,
        };

        let confidence_band = if result.confidence > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceBand::High
        } else {
            ConfidenceBand::Moderate
        };
        let confidence_bar_color = match confidence_band {
            ConfidenceBand::High => HIGH_CONFIDENCE_COLOR,
            ConfidenceBand::Moderate => MODERATE_CONFIDENCE_COLOR,
        };

        let treatments = match &result.treatments {
            Some(list) if !list.is_empty() => list.clone(),
            _ => vec![FALLBACK_TREATMENT.to_string()],
        };

        Self {
            name: result.name.clone(),
            description: result.description.clone(),
            severity,
            name_color: name_color.to_string(),
            confidence_text: format!("{}%", result.confidence),
            confidence_bar_width: result.confidence.clamp(0.0, 100.0),
            confidence_band,
            confidence_bar_color: confidence_bar_color.to_string(),
            treatments,
            image: image.to_string(),
        }
    }
}
