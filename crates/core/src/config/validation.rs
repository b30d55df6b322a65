//! Configuration validation rules.
//!
//! Checks `SwConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::SwConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl SwConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an http(s) URL
    /// - `cache_prefix` is empty or `cache_version` is 0
    /// - `core_assets` is empty or holds a path not starting with `/`
    /// - `offline_fallback` is not one of the core assets
    /// - a static extension is empty or starts with `.`
    /// - `max_cache_body_bytes` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }

        if self.cache_prefix.trim().is_empty() {
            return Err(invalid("cache_prefix", "must not be empty"));
        }
        if self.cache_version == 0 {
            return Err(invalid("cache_version", "must be greater than 0"));
        }

        if self.core_assets.is_empty() {
            return Err(ConfigError::Missing {
                field: "core_assets".into(),
                hint: "list at least the offline fallback page".into(),
            });
        }
        if let Some(bad) = self.core_assets.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("core_assets", format!("path must start with '/': {bad}")));
        }

        if !self.offline_fallback.starts_with('/') {
            return Err(invalid("offline_fallback", "path must start with '/'"));
        }
        if !self.core_assets.contains(&self.offline_fallback) {
            return Err(invalid("offline_fallback", "must be one of core_assets so install caches it"));
        }

        if !self.static_prefix.starts_with('/') {
            return Err(invalid("static_prefix", "path must start with '/'"));
        }
        if let Some(bad) = self.static_extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return Err(invalid("static_extensions", format!("expected a bare extension, got {bad:?}")));
        }

        if self.max_cache_body_bytes == 0 {
            return Err(invalid("max_cache_body_bytes", "must be greater than 0"));
        }

        if self.excluded_hosts.is_empty() {
            tracing::warn!("excluded_hosts is empty; every GET request will be intercepted");
        }

        Ok(())
    }
}
