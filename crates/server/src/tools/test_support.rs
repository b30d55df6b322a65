//! Offline-capable fetcher for tool tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mindful_client::{Fetcher, RequestInterceptor};
use mindful_core::{CacheDb, Error, Request, Response, SwConfig};

pub struct StaticSite {
    pages: HashMap<&'static str, &'static str>,
    pub online: AtomicBool,
}

impl StaticSite {
    pub fn new() -> Self {
        let pages = HashMap::from([
            ("/", "root"),
            ("/index.html", "<html>shell</html>"),
            ("/manifest.json", "{}"),
            ("/assets/logo.png", "png"),
            ("/main.js", "bundle"),
        ]);
        Self { pages, online: AtomicBool::new(true) }
    }
}

#[async_trait]
impl Fetcher for StaticSite {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        if request.url.path() == "/echo" {
            let echoed: Vec<String> = request.headers.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            return Ok(Response::new(request.url.clone(), 200, Vec::new(), echoed.join("\n")));
        }
        let (status, body) = match self.pages.get(request.url.path()) {
            Some(body) => (200, *body),
            None => (404, "not found"),
        };
        Ok(Response::new(request.url.clone(), status, vec![("content-type".into(), "text/html".into())], body))
    }
}

/// An interceptor over an in-memory cache, not yet installed.
pub async fn interceptor() -> (Arc<RequestInterceptor>, Arc<StaticSite>) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let site = Arc::new(StaticSite::new());
    let sw = RequestInterceptor::new(&SwConfig::default(), db, site.clone()).unwrap();
    (Arc::new(sw), site)
}

/// An installed and activated interceptor.
pub async fn active_interceptor() -> (Arc<RequestInterceptor>, Arc<StaticSite>) {
    let (sw, site) = interceptor().await;
    sw.handle_install().await.unwrap();
    sw.handle_activate().await.unwrap();
    (sw, site)
}
