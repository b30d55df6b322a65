//! Interceptor configuration with layered loading.
//!
//! Everything the routing and caching policy needs is deploy-time data held
//! in one [`SwConfig`]: the generation name, the core asset list, the offline
//! fallback, and the static-asset classification rules.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (MINDFUL_SW_*)
//! 2. TOML config file (if MINDFUL_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Interceptor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwConfig {
    /// Origin the application is served from; relative asset paths resolve against it.
    ///
    /// Set via MINDFUL_SW_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache name prefix; the generation is `<prefix>-v<version>`.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Deployment version. Bumping it invalidates every older generation.
    ///
    /// Set via MINDFUL_SW_CACHE_VERSION.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Paths pre-cached at install, in order.
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,

    /// Page served for failed navigations with no exact cached match.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    /// Path prefix that marks a static asset.
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    /// File extensions (without the dot) that mark a static asset.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// Hostname substrings that are never intercepted.
    #[serde(default = "default_excluded_hosts")]
    pub excluded_hosts: Vec<String>,

    /// Path to the SQLite cache database.
    ///
    /// Set via MINDFUL_SW_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional network timeout in milliseconds. Unset means fetches may hang.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Responses with larger bodies are served but not cached opportunistically.
    #[serde(default = "default_max_cache_body_bytes")]
    pub max_cache_body_bytes: usize,
}

fn default_origin() -> String {
    "http://localhost:8550".into()
}

fn default_cache_prefix() -> String {
    "mindful-cache".into()
}

fn default_cache_version() -> u32 {
    5
}

fn default_core_assets() -> Vec<String> {
    ["/", "/index.html", "/manifest.json", "/assets/logo.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_fallback() -> String {
    "/index.html".into()
}

fn default_static_prefix() -> String {
    "/assets/".into()
}

fn default_static_extensions() -> Vec<String> {
    ["js", "css", "png", "jpg", "webp", "ico"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_hosts() -> Vec<String> {
    vec!["generativelanguage.googleapis.com".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./mindful-sw-cache.sqlite")
}

fn default_user_agent() -> String {
    "mindful-sw/0.1".into()
}

fn default_max_cache_body_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for SwConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            core_assets: default_core_assets(),
            offline_fallback: default_offline_fallback(),
            static_prefix: default_static_prefix(),
            static_extensions: default_static_extensions(),
            excluded_hosts: default_excluded_hosts(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            max_cache_body_bytes: default_max_cache_body_bytes(),
        }
    }
}

impl SwConfig {
    /// Name of the current cache generation, e.g. `mindful-cache-v5`.
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.cache_prefix, self.cache_version)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parsed application origin.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MINDFUL_SW_`
    /// 2. TOML file from `MINDFUL_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MINDFUL_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MINDFUL_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
