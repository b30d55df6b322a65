//! cache_delete tool implementation.
//!
//! Drops one named cache generation and all of its entries.

use mindful_client::RequestInterceptor;
use mindful_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Generation name, e.g. "mindful-cache-v4".
    pub name: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub name: String,
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(sw: &RequestInterceptor, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    if params.name.trim().is_empty() {
        return Err(Error::InvalidInput("name cannot be empty".into()).into());
    }

    let deleted = sw.db().delete_store(&params.name).await?;
    if !deleted {
        return Err(Error::CacheMiss(params.name).into());
    }
    if params.name == sw.cache_name() {
        tracing::warn!(cache = %params.name, "deleted the current generation; offline fallback is gone until reinstall");
    }

    json_result(&CacheDeleteOutput { name: params.name, deleted })
}
