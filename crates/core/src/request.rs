//! Intercepted request model.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::hash::{RequestKey, compute_request_key};

/// How the initiating page issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

/// A request observed by the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: Url, mode: RequestMode) -> Self {
        Self { method: method.into(), url, mode, headers: Vec::new() }
    }

    /// A subresource GET.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Cors)
    }

    /// A page-navigation GET.
    pub fn navigate(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Navigate)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache lookup key for this request.
    pub fn key(&self) -> RequestKey {
        compute_request_key(&self.method, &self.url)
    }
}
