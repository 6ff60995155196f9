//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in `tools`, all sharing one
//! `AppState` for the lifetime of the process.
use crate::state::AppState;
use crate::tools::{
    AnalyzeCropParams, HistorySelectParams, LoginParams, OfflineFetchParams, SignupParams, auth, diagnose, history,
    offline,
};
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for krishi-mcp.
#[derive(Clone)]
pub struct KrishiServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

#[tool_router]
impl KrishiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(
        description = "Diagnose a crop photo. Takes a data URI image, returns the rendered report and records it in the session history."
    )]
    async fn analyze_crop(&self, params: Parameters<AnalyzeCropParams>) -> Result<CallToolResult, McpError> {
        diagnose::analyze_impl(&self.state.session, params.0).await
    }

    #[tool(description = "Show what the diagnosis page currently displays: report, upload prompt, notice and history.")]
    async fn view_state(&self) -> Result<CallToolResult, McpError> {
        diagnose::view_state_impl(&self.state.session)
    }

    #[tool(description = "List this session's past diagnoses, newest first.")]
    async fn history_list(&self) -> Result<CallToolResult, McpError> {
        history::list_impl(self.state.session.store()).await
    }

    #[tool(description = "Show a past diagnosis by its position in history_list. Returns null when out of range.")]
    async fn history_select(&self, params: Parameters<HistorySelectParams>) -> Result<CallToolResult, McpError> {
        history::select_impl(self.state.session.store(), params.0).await
    }

    #[tool(description = "Restore the page as after a reload: the last fresh diagnosis, or the upload prompt.")]
    async fn session_restore(&self) -> Result<CallToolResult, McpError> {
        history::restore_impl(self.state.session.store()).await
    }

    #[tool(description = "Start a new diagnosis. Clears the current result and image but keeps the history.")]
    async fn session_clear(&self) -> Result<CallToolResult, McpError> {
        history::clear_impl(self.state.session.store()).await
    }

    #[tool(
        description = "Request a page or asset through the offline worker. Reports status, size and whether it came from the cache or the network."
    )]
    async fn offline_fetch(&self, params: Parameters<OfflineFetchParams>) -> Result<CallToolResult, McpError> {
        offline::fetch_impl(&self.state.registry, &self.state.origin, params.0).await
    }

    #[tool(description = "Log in with phone and password. Returns the server's {success, message, user} envelope.")]
    async fn auth_login(&self, params: Parameters<LoginParams>) -> Result<CallToolResult, McpError> {
        auth::login_impl(&self.state.registry, &self.state.origin, params.0).await
    }

    #[tool(description = "Create an account. Returns the server's {success, message} envelope.")]
    async fn auth_signup(&self, params: Parameters<SignupParams>) -> Result<CallToolResult, McpError> {
        auth::signup_impl(&self.state.registry, &self.state.origin, params.0).await
    }

    #[tool(description = "Show the active offline worker version and the cached buckets.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        offline::status_impl(&self.state.registry, &self.state.cache).await
    }
}

impl ServerHandler for KrishiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "krishi-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
