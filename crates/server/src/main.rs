//! krishi-mcp server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use krishi_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;
mod view;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, version = %config.cache_version, "Starting krishi-mcp on stdio transport");

    let state = state::AppState::build(&config).await?;
    let renewal = state.spawn_lease_renewal();
    let handler = handler::KrishiServer::new(state.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    // Closing the transport ends the tab session.
    renewal.abort();
    state.end_session().await;

    Ok(())
}
