//! HTTP plumbing behind the `Network` seam.
//!
//! ### Requests
//! - A `Request` carries method, resolved URL and whether it is a full-page
//!   navigation or a sub-resource.
//!
//! ### Responses
//! - Any HTTP status is a response; only transport failures (DNS, refused
//!   connection, timeout) are errors. Strategies that fall back "when the
//!   network fails" rely on this split.
//! - Max body bytes: 5MB

pub mod url;

use bytes::Bytes;
use krishi_core::{AppConfig, CapturedResponse, Error};
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

/// How the page issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Loading an HTML document.
    Navigate,
    /// Style sheet, script, image, manifest, API call.
    SubResource,
}

/// An outgoing request as seen by the worker.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: ::url::Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl Request {
    pub fn get(url: ::url::Url) -> Self {
        Self { method: Method::GET, url, mode: RequestMode::SubResource, headers: Vec::new(), body: None }
    }

    pub fn navigate(url: ::url::Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    pub fn post_json(url: ::url::Url, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            url,
            mode: RequestMode::SubResource,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Some(body.into()),
        }
    }

    /// Body-less request with a method given by name (`GET`, `head`, ...).
    pub fn with_method(method: &str, url: ::url::Url) -> Result<Self, Error> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid HTTP method: {method:?}")))?;
        Ok(Self { method, ..Self::get(url) })
    }

    pub fn is_read_only(&self) -> bool {
        self.method == Method::GET
    }
}

/// Anything that can satisfy a request from the origin server.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, Error>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "krishi-offline/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "krishi-offline/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed `Network`.
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new HTTP network with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, Error> {
        let start = Instant::now();

        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("timeout fetching {}", request.url))
            } else {
                Error::Network(format!("network error: {}", e))
            }
        })?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::HttpError(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::HttpError(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "{} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(CapturedResponse {
            url: request.url.to_string(),
            status: status.as_u16(),
            content_type,
            headers,
            body: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "krishi-offline/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "field-app/2".into(), timeout_ms: 3000, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "field-app/2");
        assert_eq!(config.timeout, Duration::from_millis(3000));
    }

    #[test]
    fn test_request_constructors() {
        let url = ::url::Url::parse("http://127.0.0.1:5000/dashboard").unwrap();
        let nav = Request::navigate(url.clone());
        assert_eq!(nav.mode, RequestMode::Navigate);
        assert!(nav.is_read_only());

        let head = Request::with_method(" head ", url.clone()).unwrap();
        assert_eq!(head.method, Method::HEAD);
        assert!(Request::with_method("GE T", url.clone()).is_err());

        let post = Request::post_json(url, "{}");
        assert_eq!(post.method, Method::POST);
        assert!(!post.is_read_only());
        assert_eq!(post.mode, RequestMode::SubResource);
    }

    #[tokio::test]
    async fn test_http_network_new() {
        assert!(HttpNetwork::new(FetchConfig::default()).is_ok());
    }
}
