//! Scripted network and cache fixtures for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::fetch::Fetcher;
use crate::strategy::StrategyContext;
use mindful_core::{CacheDb, CacheStore, Error, Request, Response};

pub const ORIGIN: &str = "http://localhost:8550";

/// In-memory network keyed by URL path (plus query).
pub struct MockFetcher {
    routes: Mutex<HashMap<String, (u16, Bytes)>>,
    numbered: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
    online: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            numbered: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            online: AtomicBool::new(true),
        }
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, Bytes::from(body.to_string())));
    }

    /// Answer `path` with 200 and the call number as the body ("1", "2", ...).
    pub fn respond_numbered(&self, path: &str) {
        self.numbered.lock().unwrap().insert(path.to_string());
    }

    /// Hold every response for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of fetches attempted for `path`, online or not.
    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn route_key(url: &Url) -> String {
        match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        }
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let key = Self::route_key(&request.url);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(key.clone()).or_default();
            *n += 1;
            *n
        };

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }

        let headers = vec![("content-type".into(), "text/plain".into())];
        if self.numbered.lock().unwrap().contains(&key) {
            return Ok(Response::new(request.url.clone(), 200, headers, call.to_string()));
        }

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or((404, Bytes::from_static(b"not found")));

        Ok(Response::new(request.url.clone(), status, headers, body))
    }
}

/// A current-generation store plus a scripted network.
pub struct Harness {
    pub db: CacheDb,
    pub store: CacheStore,
    pub fetcher: Arc<MockFetcher>,
    pub fallback_url: Url,
    pub max_cache_body_bytes: usize,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_fetcher(MockFetcher::new(), 5 * 1024 * 1024).await
    }

    pub async fn with_fetcher(fetcher: MockFetcher, max_cache_body_bytes: usize) -> Self {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = db.open_store("mindful-cache-v5").await.unwrap();
        Self { db, store, fetcher: Arc::new(fetcher), fallback_url: url("/index.html"), max_cache_body_bytes }
    }

    pub fn ctx(&self) -> StrategyContext<'_> {
        StrategyContext {
            store: &self.store,
            fetcher: self.fetcher.as_ref(),
            fallback_url: &self.fallback_url,
            max_cache_body_bytes: self.max_cache_body_bytes,
        }
    }

    pub fn get(&self, path: &str) -> Request {
        Request::get(url(path))
    }

    pub fn navigate(&self, path: &str) -> Request {
        Request::navigate(url(path))
    }

    /// Put an entry straight into the store, bypassing the network.
    pub async fn seed(&self, path: &str, body: &str) {
        let req = self.get(path);
        let stored = Response::new(req.url.clone(), 200, Vec::new(), body.to_string()).snapshot(req.key(), "GET");
        self.store.put(&req, &stored).await.unwrap();
    }
}

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}
