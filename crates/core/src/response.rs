//! Network responses and their cached snapshots.
//!
//! A [`Response`] is consumable: whoever receives it owns the body and there
//! is exactly one receiver. Storing a response alongside returning it requires
//! an explicit [`Response::snapshot`] first, which yields an independent
//! [`StoredResponse`] for the cache.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::hash::RequestKey;

/// A response on its way to the request initiator.
#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: Url, status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { url, status, headers, body: body.into() }
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Duplicate this response for storage under `key`.
    pub fn snapshot(&self, key: RequestKey, method: &str) -> StoredResponse {
        StoredResponse {
            key,
            method: method.to_ascii_uppercase(),
            url: self.url.to_string(),
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// An immutable cache entry captured at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key: RequestKey,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl StoredResponse {
    /// Materialize a fresh consumable response from this entry.
    pub fn into_response(self) -> Result<Response, crate::Error> {
        let url = Url::parse(&self.url).map_err(|e| crate::Error::CorruptEntry(format!("{}: {e}", self.url)))?;
        Ok(Response { url, status: self.status, headers: self.headers, body: self.body })
    }
}
