//! History and session tools: history_list, history_select, session_restore,
//! session_clear.

use super::json_result;
use krishi_core::{DiagnosisStore, SessionStore, ViewPort};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the history_select tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistorySelectParams {
    /// Position in the newest-first list returned by history_list (0 = newest).
    pub display_index: usize,
}

/// Output of session_clear.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionClearOutput {
    /// Entries still in the history log.
    pub history_entries: usize,
}

pub async fn list_impl<S: SessionStore, V: ViewPort>(store: &DiagnosisStore<S, V>) -> Result<CallToolResult, McpError> {
    let options = store.options().await?;
    json_result(&options)
}

/// Replays an entry; `null` when the index is out of range.
pub async fn select_impl<S: SessionStore, V: ViewPort>(
    store: &DiagnosisStore<S, V>, params: HistorySelectParams,
) -> Result<CallToolResult, McpError> {
    let report = store.select_from_history(params.display_index).await?;
    json_result(&report)
}

pub async fn restore_impl<S: SessionStore, V: ViewPort>(
    store: &DiagnosisStore<S, V>,
) -> Result<CallToolResult, McpError> {
    let report = store.load_session().await?;
    json_result(&report)
}

pub async fn clear_impl<S: SessionStore, V: ViewPort>(store: &DiagnosisStore<S, V>) -> Result<CallToolResult, McpError> {
    store.clear_session().await?;
    let history_entries = store.history().await?.len();
    json_result(&SessionClearOutput { history_entries })
}
