//! Crop analysis client.
//!
//! `POST /api/analyze-crop` with `{ "image": <base64 without data URI prefix> }`.
//! Success bodies are a `DiagnosisResult`; failures carry `{ "error": ... }`
//! with a non-2xx status. Never routed through the cache.

use krishi_core::{DiagnosisResult, Error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const ANALYZE_PATH: &str = "/api/analyze-crop";

/// Message used when a failed response carries no `error` field.
const GENERIC_SERVER_ERROR: &str = "Server Error";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeFailure {
    #[serde(default)]
    error: Option<String>,
}

/// Strip the `data:<mime>;base64,` prefix from an image data URI.
pub fn strip_data_uri(image: &str) -> Result<&str, Error> {
    match image.split_once(',') {
        Some((prefix, payload)) if prefix.starts_with("data:") && !payload.is_empty() => Ok(payload),
        _ => Err(Error::InvalidInput("image must be a non-empty data URI".into())),
    }
}

/// Anything that turns an image into a diagnosis.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze an image given as a data URI.
    async fn analyze(&self, image_data_uri: &str) -> Result<DiagnosisResult, Error>;
}

/// HTTP client for the analysis endpoint.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(origin: &Url, user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let endpoint = origin.join(ANALYZE_PATH).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, image_data_uri: &str) -> Result<DiagnosisResult, Error> {
        let image = strip_data_uri(image_data_uri)?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&AnalyzeRequest { image })
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        parse_analysis(status.as_u16(), &body)
    }
}

/// Interpret an analysis response body.
///
/// Non-2xx statuses fail with the server's `error` message when present.
pub fn parse_analysis(status: u16, body: &[u8]) -> Result<DiagnosisResult, Error> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<AnalyzeFailure>(body)
            .ok()
            .and_then(|f| f.error)
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        tracing::warn!(status, %message, "analysis request failed");
        return Err(Error::AnalysisFailed(message));
    }

    serde_json::from_slice(body).map_err(|e| Error::AnalysisFailed(format!("malformed diagnosis: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/jpeg;base64,/9j/4AAQ").unwrap(), "/9j/4AAQ");
        assert!(strip_data_uri("/9j/4AAQ").is_err());
        assert!(strip_data_uri("data:image/png;base64,").is_err());
        assert!(strip_data_uri("").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let json = serde_json::to_value(AnalyzeRequest { image: "AAAA" }).unwrap();
        assert_eq!(json, serde_json::json!({ "image": "AAAA" }));
    }

    #[test]
    fn test_parse_success() {
        let body = br#"{"name":"Leaf Blight","description":"d","confidence":95,"treatments":["Apply fungicide"]}"#;
        let result = parse_analysis(200, body).unwrap();
        assert_eq!(result.name, "Leaf Blight");
        assert_eq!(result.treatments, Some(vec!["Apply fungicide".to_string()]));
    }

    #[test]
    fn test_parse_server_error_message() {
        let err = parse_analysis(500, br#"{"error":"model unavailable"}"#).unwrap_err();
        assert!(matches!(err, Error::AnalysisFailed(msg) if msg == "model unavailable"));
    }

    #[test]
    fn test_parse_error_without_message() {
        let err = parse_analysis(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::AnalysisFailed(msg) if msg == "Server Error"));
    }

    #[test]
    fn test_parse_malformed_success() {
        assert!(matches!(parse_analysis(200, b"{}"), Err(Error::AnalysisFailed(_))));
    }

    #[test]
    fn test_endpoint() {
        let origin = Url::parse("http://127.0.0.1:5000").unwrap();
        let client = AnalysisClient::new(&origin, "krishi-offline/0.1", Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:5000/api/analyze-crop");
    }
}
