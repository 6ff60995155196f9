//! Diagnosis data model shared by the analysis client and the session store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of one successful analysis call.
///
/// Immutable once produced; the JSON shape matches the analysis endpoint's
/// success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosisResult {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Percentage in 0..=100.
    pub confidence: f64,
    /// Recommended treatments in order. `None` when the backend sent null or
    /// omitted the field.
    #[serde(default)]
    pub treatments: Option<Vec<String>>,
}

impl DiagnosisResult {
    /// A result is healthy iff its name contains "healthy", ignoring case.
    pub fn is_healthy(&self) -> bool {
        self.name.to_lowercase().contains("healthy")
    }
}

/// One fresh diagnosis recorded in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntry {
    pub result: DiagnosisResult,
    /// Image as a data URI.
    pub image: String,
    /// Local short time (`HH:MM`) captured when the entry was recorded.
    pub timestamp: String,
}

/// What is on screen right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_result: Option<DiagnosisResult>,
    pub current_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> DiagnosisResult {
        DiagnosisResult { name: name.into(), description: String::new(), confidence: 50.0, treatments: None }
    }

    #[test]
    fn test_healthy_is_case_insensitive_substring() {
        assert!(named("Healthy").is_healthy());
        assert!(named("Tomato - HEALTHY leaf").is_healthy());
        assert!(named("Unhealthy soil").is_healthy());
        assert!(!named("Leaf Blight").is_healthy());
    }

    #[test]
    fn test_deserialize_null_treatments() {
        let json = r#"{"name":"Rust","description":"Orange pustules","confidence":81,"treatments":null}"#;
        let result: DiagnosisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.confidence, 81.0);
        assert!(result.treatments.is_none());
    }

    #[test]
    fn test_deserialize_missing_treatments() {
        let json = r#"{"name":"Healthy","description":"","confidence":98}"#;
        let result: DiagnosisResult = serde_json::from_str(json).unwrap();
        assert!(result.treatments.is_none());
    }
}
