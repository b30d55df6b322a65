use super::{ResponseSource, StrategyContext, StrategyResponse, from_cache};
use mindful_core::{Error, Request};

/// Serve `request` from the network, falling back to the cache.
///
/// On fetch failure: the exact stored entry if there is one; otherwise, for
/// navigations, the stored offline fallback page (`None` if that was never
/// cached); otherwise the original fetch error.
pub async fn network_first(ctx: &StrategyContext<'_>, request: &Request) -> Result<Option<StrategyResponse>, Error> {
    let err = match ctx.fetcher.fetch(request).await {
        Ok(response) => {
            ctx.remember(request, &response).await?;
            return Ok(Some(StrategyResponse { response, source: ResponseSource::Network }));
        }
        Err(err) => err,
    };

    if let Some(stored) = ctx.store.match_request(request).await? {
        tracing::warn!(url = %request.url, error = %err, "network failed, serving cached copy");
        return from_cache(stored, ResponseSource::Cache).map(Some);
    }

    if !request.is_navigation() {
        return Err(err);
    }

    let fallback = Request::get(ctx.fallback_url.clone());
    match ctx.store.match_request(&fallback).await? {
        Some(stored) => {
            tracing::warn!(url = %request.url, fallback = %ctx.fallback_url, error = %err, "serving offline fallback");
            from_cache(stored, ResponseSource::OfflineFallback).map(Some)
        }
        None => {
            tracing::warn!(url = %request.url, fallback = %ctx.fallback_url, "offline fallback not cached");
            Ok(None)
        }
    }
}
