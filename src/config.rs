//! Client configuration
//!
//! Endpoints, credentials and transport knobs for a [`crate::SodaClient`].
//!
//! Configuration is always an explicit value. The library never reads the
//! process environment on its own; the binary calls [`ClientConfig::from_env`]
//! once at startup and hands the result to the client.

use crate::error::{Error, Result};
use crate::http::{RateLimiterConfig, RetryPolicy};
use crate::types::{BackoffType, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Chicago Data Portal resource endpoint
pub const DEFAULT_BASE_URL: &str = "https://data.cityofchicago.org/resource";

/// Chicago Data Portal metadata endpoint
pub const DEFAULT_METADATA_URL: &str = "https://data.cityofchicago.org/api/views";

/// Socrata discovery (catalog) endpoint
pub const DEFAULT_CATALOG_URL: &str = "https://api.us.socrata.com/api/catalog/v1";

/// Environment variables read by [`ClientConfig::from_env`]
pub mod env {
    pub const BASE_URL: &str = "SODA_BASE_URL";
    pub const METADATA_URL: &str = "SODA_METADATA_URL";
    pub const CATALOG_URL: &str = "SODA_CATALOG_URL";
    pub const APP_TOKEN: &str = "SODA_APP_TOKEN";
    /// Older token variable, consulted when `SODA_APP_TOKEN` is unset
    pub const LEGACY_APP_TOKEN: &str = "CHICAGO_DATA_PORTAL_TOKEN";
    pub const TIMEOUT_SECS: &str = "SODA_TIMEOUT_SECS";
    pub const PAGE_SIZE: &str = "SODA_PAGE_SIZE";
}

/// Configuration for a SODA client
#[derive(Clone)]
pub struct ClientConfig {
    /// Resource endpoint; datasets live at `{base_url}/{id}.json`
    pub base_url: String,
    /// Metadata endpoint; schemas live at `{metadata_url}/{id}`
    pub metadata_url: String,
    /// Catalog search endpoint
    pub catalog_url: String,
    /// Optional app token sent as `X-App-Token`
    pub app_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Default rows per page
    pub page_size: u32,
    /// Client-side rate limit (off unless set)
    pub rate_limit: Option<RateLimiterConfig>,
    /// Retry policy for callers that opt in
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            app_token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("soda-client/{}", env!("CARGO_PKG_VERSION")),
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit: None,
            retry: RetryPolicy::none(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("metadata_url", &self.metadata_url)
            .field("catalog_url", &self.catalog_url)
            .field("app_token", &self.app_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("rate_limit", &self.rate_limit)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load from the process environment, on top of the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup, on top of the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(env::BASE_URL) {
            config.base_url = url;
        }
        if let Some(url) = get(env::METADATA_URL) {
            config.metadata_url = url;
        }
        if let Some(url) = get(env::CATALOG_URL) {
            config.catalog_url = url;
        }
        config.app_token = get(env::APP_TOKEN).or_else(|| get(env::LEGACY_APP_TOKEN));

        if let Some(raw) = get(env::TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::invalid_value(env::TIMEOUT_SECS, e.to_string()))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(env::PAGE_SIZE) {
            config.page_size = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| Error::invalid_value(env::PAGE_SIZE, e.to_string()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file, on top of the defaults
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load from a YAML document, on top of the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(content)?;
        let config = raw.apply(Self::default());
        config.validate()?;
        Ok(config)
    }

    /// Check that endpoints parse and the page size is in range
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("base_url", &self.base_url),
            ("metadata_url", &self.metadata_url),
            ("catalog_url", &self.catalog_url),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "must not be empty"));
            }
            url::Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidPageSize {
                page_size: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        if self.timeout.is_zero() {
            return Err(Error::invalid_value("timeout", "must be greater than zero"));
        }

        Ok(())
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the resource endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the metadata endpoint
    pub fn metadata_url(mut self, url: impl Into<String>) -> Self {
        self.config.metadata_url = url.into();
        self
    }

    /// Set the catalog endpoint
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog_url = url.into();
        self
    }

    /// Set the app token
    pub fn app_token(mut self, token: impl Into<String>) -> Self {
        self.config.app_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the default page size
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Enable client-side rate limiting
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// ============================================================================
// File Format
// ============================================================================

/// On-disk config; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    base_url: Option<String>,
    metadata_url: Option<String>,
    catalog_url: Option<String>,
    app_token: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    page_size: Option<u32>,
    rate_limit: Option<RawRateLimit>,
    retry: Option<RawRetry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRateLimit {
    requests_per_second: u32,
    burst_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetry {
    max_retries: u32,
    #[serde(default)]
    backoff_type: BackoffType,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
}

impl RawConfig {
    fn apply(self, mut config: ClientConfig) -> ClientConfig {
        if let Some(v) = self.base_url {
            config.base_url = v;
        }
        if let Some(v) = self.metadata_url {
            config.metadata_url = v;
        }
        if let Some(v) = self.catalog_url {
            config.catalog_url = v;
        }
        if let Some(v) = self.app_token.filter(|t| !t.trim().is_empty()) {
            config.app_token = Some(v);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = self.user_agent {
            config.user_agent = v;
        }
        if let Some(v) = self.page_size {
            config.page_size = v;
        }
        if let Some(rl) = self.rate_limit {
            config.rate_limit = Some(RateLimiterConfig::new(
                rl.requests_per_second,
                rl.burst_size.unwrap_or(rl.requests_per_second),
            ));
        }
        if let Some(r) = self.retry {
            let defaults = RetryPolicy::default();
            config.retry = RetryPolicy {
                max_retries: r.max_retries,
                backoff_type: r.backoff_type,
                initial_backoff: r
                    .initial_backoff_ms
                    .map_or(defaults.initial_backoff, Duration::from_millis),
                max_backoff: r
                    .max_backoff_ms
                    .map_or(defaults.max_backoff, Duration::from_millis),
            };
        }
        config
    }
}
