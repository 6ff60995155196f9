//! MCP tool implementations.
//!
//! Each tool is a plain async function over the pieces it needs so it can be
//! tested without a transport.

pub mod auth;
pub mod diagnose;
pub mod history;
pub mod offline;

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use auth::{LoginParams, SignupParams};
pub use diagnose::AnalyzeCropParams;
pub use history::HistorySelectParams;
pub use offline::OfflineFetchParams;

/// Encode a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| ToolError::Serialization(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use krishi_client::{Network, Request};
    use krishi_core::{CapturedResponse, Error};
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) const ORIGIN: &str = "http://127.0.0.1:5000";

    /// Canned origin server; unknown paths and offline mode fail like a
    /// dropped connection.
    #[derive(Default)]
    pub(crate) struct StubNetwork {
        responses: Mutex<HashMap<String, CapturedResponse>>,
        offline: Mutex<bool>,
    }

    impl StubNetwork {
        pub(crate) fn serve(&self, path: &str, body: &str) {
            self.serve_status(path, 200, body);
        }

        pub(crate) fn serve_status(&self, path: &str, status: u16, body: &str) {
            let url = format!("{ORIGIN}{path}");
            let response = CapturedResponse {
                url: url.clone(),
                status,
                content_type: Some("text/html".into()),
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            };
            self.responses.lock().unwrap().insert(url, response);
        }

        pub(crate) fn set_offline(&self, offline: bool) {
            *self.offline.lock().unwrap() = offline;
        }
    }

    #[async_trait::async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<CapturedResponse, Error> {
            if *self.offline.lock().unwrap() {
                return Err(Error::Network("offline".into()));
            }
            self.responses
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned()
                .ok_or_else(|| Error::Network(format!("connection refused: {}", request.url)))
        }
    }

    /// Decode the JSON text content of a tool result.
    pub(crate) fn decode<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
