//! Unified error types for the Krishi offline client.
//!
//! Every variant renders with a stable code prefix so callers (and the MCP
//! surface) can match on it without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the worker, the session store and the clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an image without a data URI prefix).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Persisted state could not be encoded.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (DNS, refused connection, timeout).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Navigation failed with no cached fallback.
    #[error("OFFLINE: {0}")]
    Offline(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The analysis endpoint rejected or failed the request.
    #[error("ANALYSIS_FAILED: {0}")]
    AnalysisFailed(String),

    /// An analysis is already outstanding for this session.
    #[error("ANALYSIS_IN_PROGRESS")]
    AnalysisInProgress,

    /// Precaching the asset manifest failed; the worker never activates.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// Lifecycle call made in the wrong worker state.
    #[error("WORKER_STATE: {0}")]
    InvalidWorkerState(String),

    /// No worker is active to serve the request.
    #[error("WORKER_INACTIVE")]
    WorkerInactive,
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Serialization(msg) => (-32002, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Network(msg) => (-32004, msg.clone()),
            Error::Offline(msg) => (-32005, msg.clone()),
            Error::HttpError(msg) => (-32006, msg.clone()),
            Error::AnalysisFailed(msg) => (-32007, msg.clone()),
            Error::AnalysisInProgress => (-32008, "An analysis is already in progress".to_string()),
            Error::InstallFailed(msg) => (-32009, msg.clone()),
            Error::InvalidWorkerState(msg) => (-32010, msg.clone()),
            Error::WorkerInactive => (-32010, "No active worker".to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
