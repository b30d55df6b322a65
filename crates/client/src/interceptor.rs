//! The request interceptor: lifecycle, routing and strategies behind one
//! interface a host adapter can drive.

use std::sync::Arc;

use url::Url;

use crate::fetch::{Fetcher, canonicalize};
use crate::lifecycle::{ActivateReport, InstallReport, Lifecycle, LifecycleState};
use crate::router::{PassReason, Route, Router};
use crate::strategy::{StrategyContext, StrategyResponse, cache_first, network_first};
use mindful_core::{CacheDb, Error, Request, SwConfig};

/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host sends the request to the network itself.
    PassThrough { request: Request, reason: PassReason },
    /// Intercepted. `None` means network-first found neither the network,
    /// a cached copy, nor a cached offline fallback.
    Responded { route: Route, response: Option<StrategyResponse> },
}

/// Interceptor for one deployed version of the application.
pub struct RequestInterceptor {
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    router: Router,
    lifecycle: Lifecycle,
    origin: Url,
    fallback_url: Url,
    max_cache_body_bytes: usize,
}

impl RequestInterceptor {
    /// Build an interceptor from a validated configuration.
    pub fn new(config: &SwConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let core_assets = config
            .core_assets
            .iter()
            .map(|path| canonicalize(path, &origin))
            .collect::<Result<Vec<_>, _>>()?;
        let fallback_url = canonicalize(&config.offline_fallback, &origin)?;

        Ok(Self {
            db,
            fetcher,
            router: Router::new(config),
            lifecycle: Lifecycle::new(config.cache_name(), core_assets),
            origin,
            fallback_url,
            max_cache_body_bytes: config.max_cache_body_bytes,
        })
    }

    pub fn cache_name(&self) -> &str {
        self.lifecycle.cache_name()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub async fn handle_install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install(&self.db, self.fetcher.as_ref()).await
    }

    pub async fn handle_activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.activate(&self.db).await
    }

    /// Classify a request without touching the cache or the network.
    pub fn route(&self, request: &Request) -> Route {
        self.router.route(request)
    }

    /// Handle one intercepted request.
    ///
    /// Requests seen before activation are passed through.
    pub async fn handle_fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        if !self.lifecycle.is_active().await {
            return Ok(FetchOutcome::PassThrough { request, reason: PassReason::NotControlled });
        }

        let route = self.route(&request);
        tracing::debug!(method = %request.method, url = %request.url, route = ?route, "routed request");

        let response = match route {
            Route::PassThrough(reason) => return Ok(FetchOutcome::PassThrough { request, reason }),
            Route::CacheFirst => {
                let store = self.db.open_store(self.cache_name()).await?;
                Some(cache_first(&self.context(&store), &request).await?)
            }
            Route::NetworkFirst => {
                let store = self.db.open_store(self.cache_name()).await?;
                network_first(&self.context(&store), &request).await?
            }
        };

        Ok(FetchOutcome::Responded { route, response })
    }

    fn context<'a>(&'a self, store: &'a mindful_core::CacheStore) -> StrategyContext<'a> {
        StrategyContext {
            store,
            fetcher: self.fetcher.as_ref(),
            fallback_url: &self.fallback_url,
            max_cache_body_bytes: self.max_cache_body_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{MockFetcher, url};
    use mindful_core::RequestMode;

    fn serving_fetcher() -> Arc<MockFetcher> {
        let fetcher = MockFetcher::new();
        fetcher.respond("/", 200, "root");
        fetcher.respond("/index.html", 200, "shell");
        fetcher.respond("/manifest.json", 200, "{}");
        fetcher.respond("/assets/logo.png", 200, "png");
        Arc::new(fetcher)
    }

    async fn interceptor(config: &SwConfig, db: &CacheDb, fetcher: &Arc<MockFetcher>) -> RequestInterceptor {
        RequestInterceptor::new(config, db.clone(), fetcher.clone()).unwrap()
    }

    async fn active(db: &CacheDb, fetcher: &Arc<MockFetcher>) -> RequestInterceptor {
        let sw = interceptor(&SwConfig::default(), db, fetcher).await;
        sw.handle_install().await.unwrap();
        sw.handle_activate().await.unwrap();
        sw
    }

    fn body(outcome: FetchOutcome) -> (ResponseSource, Vec<u8>) {
        match outcome {
            FetchOutcome::Responded { response: Some(r), .. } => (r.source, r.response.body.to_vec()),
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_controlled_before_activation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let sw = interceptor(&SwConfig::default(), &db, &fetcher).await;
        sw.handle_install().await.unwrap();

        let outcome = sw.handle_fetch(Request::get(url("/assets/app.js"))).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::PassThrough { reason: PassReason::NotControlled, .. }));
    }

    #[tokio::test]
    async fn test_non_get_never_touches_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let sw = active(&db, &fetcher).await;
        let calls_before = fetcher.total_calls();
        let store = db.open_store(sw.cache_name()).await.unwrap();
        let entries_before = store.len().await.unwrap();

        let req = Request::new("POST", url("/api/notes"), RequestMode::Cors);
        let outcome = sw.handle_fetch(req.clone()).await.unwrap();

        match outcome {
            FetchOutcome::PassThrough { request, reason } => {
                assert_eq!(request, req);
                assert_eq!(reason, PassReason::NonGet);
            }
            other => panic!("expected pass-through, got {other:?}"),
        }
        assert_eq!(fetcher.total_calls(), calls_before);
        assert_eq!(store.len().await.unwrap(), entries_before);
    }

    #[tokio::test]
    async fn test_static_asset_served_unchanged_offline() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        fetcher.respond("/main.js", 200, "v1");
        let sw = active(&db, &fetcher).await;

        let (source, first) = body(sw.handle_fetch(Request::get(url("/main.js"))).await.unwrap());
        assert_eq!(source, ResponseSource::Network);

        fetcher.respond("/main.js", 200, "v2");
        let (source, second) = body(sw.handle_fetch(Request::get(url("/main.js"))).await.unwrap());
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(first, second);

        fetcher.set_online(false);
        let (_, third) = body(sw.handle_fetch(Request::get(url("/main.js"))).await.unwrap());
        assert_eq!(first, third);
        assert_eq!(fetcher.calls("/main.js"), 1);
    }

    #[tokio::test]
    async fn test_offline_navigation_exact_match_over_fallback() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        fetcher.respond("/notes", 200, "notes page");
        let sw = active(&db, &fetcher).await;
        sw.handle_fetch(Request::navigate(url("/notes"))).await.unwrap();

        fetcher.set_online(false);
        let (source, bytes) = body(sw.handle_fetch(Request::navigate(url("/notes"))).await.unwrap());
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(bytes, b"notes page");
    }

    #[tokio::test]
    async fn test_offline_navigation_falls_back_to_shell() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let sw = active(&db, &fetcher).await;

        fetcher.set_online(false);
        let (source, bytes) = body(sw.handle_fetch(Request::navigate(url("/stats"))).await.unwrap());
        assert_eq!(source, ResponseSource::OfflineFallback);
        assert_eq!(bytes, b"shell");
    }

    #[tokio::test]
    async fn test_offline_dynamic_request_fails() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let sw = active(&db, &fetcher).await;

        fetcher.set_online(false);
        let result = sw.handle_fetch(Request::get(url("/api/recommendations"))).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_generative_language_requests_never_cached() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let sw = active(&db, &fetcher).await;

        let gemini = "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
        let outcome = sw.handle_fetch(Request::get(Url::parse(gemini).unwrap())).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::PassThrough { reason: PassReason::ExcludedHost, .. }));

        for name in db.store_names().await.unwrap() {
            let store = db.open_store(&name).await.unwrap();
            assert!(store.keys().await.unwrap().iter().all(|u| !u.contains("generativelanguage.googleapis.com")));
        }
    }

    #[tokio::test]
    async fn test_version_bump_replaces_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        let v5 = active(&db, &fetcher).await;
        fetcher.respond("/main.js", 200, "v5 bundle");
        v5.handle_fetch(Request::get(url("/main.js"))).await.unwrap();

        let v6_config = SwConfig { cache_version: 6, ..Default::default() };
        let v6 = interceptor(&v6_config, &db, &fetcher).await;
        v6.handle_install().await.unwrap();
        fetcher.respond("/extra.css", 200, "pre-activation");
        let store = db.open_store("mindful-cache-v6").await.unwrap();
        let extra = Request::get(url("/extra.css"));
        let snapshot = fetcher.fetch(&extra).await.unwrap().snapshot(extra.key(), "GET");
        store.put(&extra, &snapshot).await.unwrap();

        let report = v6.handle_activate().await.unwrap();
        assert_eq!(report.deleted, vec!["mindful-cache-v5"]);
        assert!(!db.has_store("mindful-cache-v5").await.unwrap());

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        let mut expected: Vec<String> = ["/", "/index.html", "/manifest.json", "/assets/logo.png", "/extra.css"]
            .iter()
            .map(|p| url(p).to_string())
            .collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_last_write_wins() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = serving_fetcher();
        fetcher.respond_numbered("/api/streak");
        let sw = active(&db, &fetcher).await;

        let (a, b) = tokio::join!(
            sw.handle_fetch(Request::get(url("/api/streak"))),
            sw.handle_fetch(Request::get(url("/api/streak")))
        );
        let (_, a) = body(a.unwrap());
        let (_, b) = body(b.unwrap());
        assert_ne!(a, b);

        let store = db.open_store(sw.cache_name()).await.unwrap();
        let streak = url("/api/streak").to_string();
        let keys = store.keys().await.unwrap();
        assert_eq!(keys.iter().filter(|k| **k == streak).count(), 1);
        let stored = store.match_request(&Request::get(url("/api/streak"))).await.unwrap().unwrap();
        assert!(stored.body.as_ref() == a.as_slice() || stored.body.as_ref() == b.as_slice());
    }

    #[tokio::test]
    async fn test_new_rejects_bad_origin() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let config = SwConfig { origin: "::nope".into(), ..Default::default() };
        let result = RequestInterceptor::new(&config, db, serving_fetcher());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
