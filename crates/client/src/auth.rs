//! Authentication calls (`/login`, `/signup`).
//!
//! Both endpoints answer with a `{success, message, user?}` envelope, also on
//! 4xx/5xx, so the envelope is parsed regardless of status. The calls go
//! through the worker registry like any page request; the worker always
//! passes them straight to the network.

use crate::fetch::{Network, Request};
use crate::worker::WorkerRegistry;
use krishi_core::Error;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub phone: String,
    pub password: String,
    pub dob: String,
}

/// Response envelope shared by both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<String>,
}

pub async fn login<N: Network>(
    registry: &WorkerRegistry<N>, origin: &Url, request: &LoginRequest,
) -> Result<AuthResponse, Error> {
    post(registry, origin, "/login", request).await
}

pub async fn signup<N: Network>(
    registry: &WorkerRegistry<N>, origin: &Url, request: &SignupRequest,
) -> Result<AuthResponse, Error> {
    post(registry, origin, "/signup", request).await
}

async fn post<N: Network, T: Serialize>(
    registry: &WorkerRegistry<N>, origin: &Url, path: &str, body: &T,
) -> Result<AuthResponse, Error> {
    let url = origin.join(path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let body = serde_json::to_vec(body)?;
    let served = registry.dispatch(&Request::post_json(url, body)).await?;
    tracing::debug!(path, status = served.response.status, "auth call");
    parse_envelope(served.response.status, &served.response.body)
}

/// Parse an auth envelope; a body that is not an envelope is an HTTP error.
pub fn parse_envelope(status: u16, body: &[u8]) -> Result<AuthResponse, Error> {
    serde_json::from_slice(body).map_err(|_| Error::HttpError(format!("status {status} without auth envelope")))
}
