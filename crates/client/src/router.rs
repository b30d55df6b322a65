//! Request classification.
//!
//! Rules, first match wins:
//!
//! 1. Non-GET: pass through.
//! 2. Navigation: network-first.
//! 3. URL contains an excluded host (the generative-language API): pass through.
//! 4. Static asset (path prefix or file extension): cache-first.
//! 5. Anything else: network-first.

use serde::{Deserialize, Serialize};

use mindful_core::{Request, SwConfig};

/// Why a request is left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassReason {
    NonGet,
    ExcludedHost,
    /// The interceptor is not yet active for this client.
    NotControlled,
}

/// Routing decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case", tag = "route", content = "reason")]
pub enum Route {
    PassThrough(PassReason),
    CacheFirst,
    NetworkFirst,
}

/// Pure classifier built from the classification fields of [`SwConfig`].
#[derive(Debug, Clone)]
pub struct Router {
    static_prefix: String,
    static_extensions: Vec<String>,
    excluded_hosts: Vec<String>,
}

impl Router {
    pub fn new(config: &SwConfig) -> Self {
        Self {
            static_prefix: config.static_prefix.clone(),
            static_extensions: config.static_extensions.clone(),
            excluded_hosts: config.excluded_hosts.clone(),
        }
    }

    pub fn route(&self, request: &Request) -> Route {
        if !request.is_get() {
            return Route::PassThrough(PassReason::NonGet);
        }
        if request.is_navigation() {
            return Route::NetworkFirst;
        }
        if self.is_excluded(request) {
            return Route::PassThrough(PassReason::ExcludedHost);
        }
        if self.is_static_asset(request) {
            return Route::CacheFirst;
        }
        Route::NetworkFirst
    }

    /// Substring match against the full URL.
    fn is_excluded(&self, request: &Request) -> bool {
        let href = request.url.as_str();
        self.excluded_hosts.iter().any(|host| href.contains(host.as_str()))
    }

    fn is_static_asset(&self, request: &Request) -> bool {
        let path = request.url.path();
        if path.starts_with(&self.static_prefix) {
            return true;
        }

        let file = path.rsplit('/').next().unwrap_or_default();
        match file.rsplit_once('.') {
            Some((_, ext)) => self.static_extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}
