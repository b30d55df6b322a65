//! MCP server handler implementation.
//!
//! This module defines the host shim that routes tool calls to the
//! request interceptor.
use std::sync::Arc;

use crate::tools::cache::{CacheDeleteParams, delete_impl, list_impl};
use crate::tools::{SwFetchParams, activate_impl, fetch_impl, install_impl};
use mindful_client::RequestInterceptor;

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

/// The main MCP server handler for mindful-sw.
#[derive(Clone)]
pub struct McpSwServer {
    interceptor: Arc<RequestInterceptor>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl McpSwServer {
    /// Create a new server handler around a shared interceptor.
    pub fn new(interceptor: Arc<RequestInterceptor>) -> Self {
        Self { interceptor, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the current cache generation: pre-cache every core asset. All-or-nothing.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.interceptor).await
    }

    #[tool(description = "Activate the current generation: delete every other cache generation and start intercepting.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.interceptor).await
    }

    /// Route one request through the interceptor.
    ///
    /// Reports the route taken and whether the response came from the
    /// network, the cache, or the offline fallback.
    #[tool(
        description = "Fetch a URL as the application would. Returns the route (cache_first, network_first, pass_through), the response source, status and body."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.interceptor, params.0).await
    }

    #[tool(description = "List cache generations with entry counts and the current generation name.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.interceptor).await
    }

    #[tool(description = "Delete a cache generation by name.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.interceptor, params.0).await
    }
}

impl ServerHandler for McpSwServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mindful-sw".into(),
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
