//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mindful-sw host shim.

pub mod cache;
pub mod lifecycle;
pub mod sw_fetch;

#[cfg(test)]
pub(crate) mod test_support;

pub use lifecycle::{activate_impl, install_impl};
pub use sw_fetch::{SwFetchOutput, SwFetchParams, fetch_impl};

use mindful_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
