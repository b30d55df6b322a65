//! cache_list tool implementation.
//!
//! Lists every cache generation with its entry count.

use mindful_client::RequestInterceptor;
use mindful_core::{Error, cache::StoreSummary};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Name of the generation this interceptor serves from.
    pub current: String,
    /// Every generation present, oldest first.
    pub stores: Vec<StoreSummary>,
}

pub async fn collect(sw: &RequestInterceptor) -> Result<CacheListOutput, Error> {
    let stores = sw.db().store_summaries().await?;
    Ok(CacheListOutput { current: sw.cache_name().to_string(), stores })
}

/// Implementation of the cache_list tool.
pub async fn list_impl(sw: &RequestInterceptor) -> Result<CallToolResult, McpError> {
    let output = collect(sw).await?;
    json_result(&output)
}
