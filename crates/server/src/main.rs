//! mindful-sw host shim entry point.
//!
//! Boots the request interceptor over the configured cache database, runs
//! install and activate once, and serves MCP on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use mindful_client::{FetchClient, FetchConfig, RequestInterceptor};
use mindful_core::{CacheDb, SwConfig};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = SwConfig::load()?;
    tracing::info!(cache = %config.cache_name(), origin = %config.origin, "Starting mindful-sw on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let interceptor = Arc::new(RequestInterceptor::new(&config, db, fetcher)?);

    // A failed install leaves the previous generation serving; sw_install retries.
    match interceptor.handle_install().await {
        Ok(_) => {
            interceptor.handle_activate().await?;
        }
        Err(e) => tracing::warn!(error = %e, "initial install failed"),
    }

    let handler = handler::McpSwServer::new(interceptor);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
