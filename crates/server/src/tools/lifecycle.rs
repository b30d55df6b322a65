//! sw_install and sw_activate tool implementations.
//!
//! Drive the interceptor's lifecycle on behalf of the host.

use mindful_client::RequestInterceptor;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;

/// Pre-cache the core assets into the current generation.
pub async fn install_impl(sw: &RequestInterceptor) -> Result<CallToolResult, McpError> {
    let report = sw.handle_install().await?;
    json_result(&report)
}

/// Retire stale generations and start intercepting.
pub async fn activate_impl(sw: &RequestInterceptor) -> Result<CallToolResult, McpError> {
    let report = sw.handle_activate().await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::interceptor;
    use mindful_client::LifecycleState;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_install_then_activate() {
        let (sw, _) = interceptor().await;

        let result = install_impl(&sw).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(sw.state().await, LifecycleState::Installed);

        activate_impl(&sw).await.unwrap();
        assert_eq!(sw.state().await, LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_activate_before_install_fails() {
        let (sw, _) = interceptor().await;
        let err = activate_impl(&sw).await.unwrap_err();
        assert_eq!(err.code.0, -32021);
    }

    #[tokio::test]
    async fn test_install_offline_fails() {
        let (sw, site) = interceptor().await;
        site.online.store(false, Ordering::SeqCst);

        let err = install_impl(&sw).await.unwrap_err();
        assert_eq!(err.code.0, -32020);
        assert_eq!(sw.state().await, LifecycleState::Redundant);
    }
}
