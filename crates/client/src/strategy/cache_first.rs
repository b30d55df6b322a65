use super::{ResponseSource, StrategyContext, StrategyResponse, from_cache};
use mindful_core::{Error, Request};

/// Serve `request` from the cache, falling back to the network on a miss.
///
/// A network failure on a miss propagates unchanged.
pub async fn cache_first(ctx: &StrategyContext<'_>, request: &Request) -> Result<StrategyResponse, Error> {
    if let Some(stored) = ctx.store.match_request(request).await? {
        tracing::debug!(url = %request.url, "cache hit");
        return from_cache(stored, ResponseSource::Cache);
    }

    tracing::debug!(url = %request.url, "cache miss");
    let response = ctx.fetcher.fetch(request).await?;
    ctx.remember(request, &response).await?;

    Ok(StrategyResponse { response, source: ResponseSource::Network })
}
