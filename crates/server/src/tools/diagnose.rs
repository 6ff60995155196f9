//! analyze_crop and view_state tools.

use super::json_result;
use crate::view::{CapturedView, Screen};
use krishi_client::{Analyzer, DiagnosisSession};
use krishi_core::SessionStore;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the analyze_crop tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeCropParams {
    /// Crop photo as a data URI (`data:image/jpeg;base64,...`).
    pub image: String,
}

/// Implementation of the analyze_crop tool.
///
/// Returns the rendered report of the fresh diagnosis.
pub async fn analyze_impl<A, S>(
    session: &DiagnosisSession<A, S, CapturedView>, params: AnalyzeCropParams,
) -> Result<CallToolResult, McpError>
where
    A: Analyzer,
    S: SessionStore,
{
    let report = session.submit_image(params.image).await?;
    json_result(&report)
}

/// Implementation of the view_state tool.
pub fn view_state_impl<A, S>(session: &DiagnosisSession<A, S, CapturedView>) -> Result<CallToolResult, McpError>
where
    A: Analyzer,
    S: SessionStore,
{
    let screen: Screen = session.store().view().snapshot();
    json_result(&screen)
}
