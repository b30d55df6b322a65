//! sw_fetch tool implementation.
//!
//! Issues a request as the application would and reports how the interceptor
//! handled it. Requests the interceptor declines are forwarded to the network
//! unmodified, as a browser host would.

use std::collections::BTreeMap;

use mindful_client::{FetchOutcome, Fetcher, RequestInterceptor, ResponseSource, Route, StrategyResponse};
use mindful_client::fetch::canonicalize;
use mindful_core::{Error, Request, RequestMode, Response};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the application origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Treat the request as a page navigation.
    #[serde(default)]
    pub navigate: bool,

    /// Request headers, sent as-is when the request reaches the network.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The canonical request URL.
    pub url: String,
    /// How the request was classified.
    pub route: Route,
    /// Where the response came from. Absent for pass-through requests and
    /// for navigations that had nothing to serve.
    pub source: Option<ResponseSource>,
    /// HTTP status, if a response was produced.
    pub status: Option<u16>,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Response body as (lossy) UTF-8 text.
    pub body: Option<String>,
}

/// Resolve the params into a request and run it through the interceptor.
pub async fn run_fetch(sw: &RequestInterceptor, params: SwFetchParams) -> Result<SwFetchOutput, Error> {
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()));
    }

    let url = canonicalize(&params.url, sw.origin())?;
    let canonical = url.to_string();
    let mode = if params.navigate { RequestMode::Navigate } else { RequestMode::Cors };
    let request = params
        .headers
        .into_iter()
        .fold(Request::new(params.method.trim().to_ascii_uppercase(), url, mode), |req, (name, value)| {
            req.with_header(name, value)
        });

    let output = match sw.handle_fetch(request).await? {
        FetchOutcome::PassThrough { request, reason } => {
            tracing::debug!(url = %request.url, reason = ?reason, "forwarding uncontrolled request");
            let response = sw.fetcher().fetch(&request).await?;
            describe(canonical, Route::PassThrough(reason), None, Some(response))
        }
        FetchOutcome::Responded { route, response: Some(StrategyResponse { response, source }) } => {
            describe(canonical, route, Some(source), Some(response))
        }
        FetchOutcome::Responded { route, response: None } => describe(canonical, route, None, None),
    };

    Ok(output)
}

fn describe(url: String, route: Route, source: Option<ResponseSource>, response: Option<Response>) -> SwFetchOutput {
    let (status, content_type, body) = match response {
        Some(r) => (
            Some(r.status),
            r.content_type().map(str::to_string),
            Some(String::from_utf8_lossy(&r.body).into_owned()),
        ),
        None => (None, None, None),
    };
    SwFetchOutput { url, route, source, status, content_type, body }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(sw: &RequestInterceptor, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let output = run_fetch(sw, params).await?;
    json_result(&output)
}
