//! Fetch strategies.
//!
//! - [`cache_first`]: serve a stored response without a freshness check,
//!   fetching and storing only on a miss. Suited to versioned static assets.
//! - [`network_first`]: prefer the network and refresh the stored copy,
//!   degrading to the stored copy, then (navigations only) to the offline
//!   fallback page.
//!
//! Both strategies store a snapshot of a network response before handing the
//! response itself to the caller. The write is awaited in the same future as
//! the fetch, so abandoning a request before its response arrives also
//! abandons the write.

mod cache_first;
mod network_first;

pub use cache_first::cache_first;
pub use network_first::network_first;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::Fetcher;
use mindful_core::{CacheStore, Error, Request, Response};

/// Where a strategy's response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    OfflineFallback,
}

/// A response produced by a strategy, tagged with its source.
#[derive(Debug)]
pub struct StrategyResponse {
    pub response: Response,
    pub source: ResponseSource,
}

/// Everything a strategy reads and writes.
pub struct StrategyContext<'a> {
    pub store: &'a CacheStore,
    pub fetcher: &'a dyn Fetcher,
    /// Absolute URL of the offline fallback page.
    pub fallback_url: &'a Url,
    /// Larger bodies are served but not stored.
    pub max_cache_body_bytes: usize,
}

impl StrategyContext<'_> {
    /// Store a snapshot of `response` under `request`, unless it is too large.
    async fn remember(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if response.body.len() > self.max_cache_body_bytes {
            tracing::debug!(
                url = %request.url,
                bytes = response.body.len(),
                limit = self.max_cache_body_bytes,
                "response too large to cache"
            );
            return Ok(());
        }

        let snapshot = response.snapshot(request.key(), &request.method);
        self.store.put(request, &snapshot).await?;
        tracing::debug!(url = %request.url, cache = self.store.name(), status = response.status, "stored response");
        Ok(())
    }
}

fn from_cache(stored: mindful_core::StoredResponse, source: ResponseSource) -> Result<StrategyResponse, Error> {
    Ok(StrategyResponse { response: stored.into_response()?, source })
}
