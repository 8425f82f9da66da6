//! HTTP client
//!
//! Provides the reqwest-backed transport that handles:
//! - Dataset URL construction (`{base_url}/{id}.json`, `{base_url}/{id}.csv`)
//! - `Accept` and `X-App-Token` headers
//! - Optional client-side rate limiting
//! - Error classification (network, status, decode)

use super::rate_limit::RateLimiter;
use super::transport::Transport;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::query::PageRequest;
use crate::types::Rows;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Header carrying the optional app token
pub const APP_TOKEN_HEADER: &str = "X-App-Token";

const JSON: &str = "application/json";
const CSV: &str = "text/csv";

/// HTTP client for a SODA service
pub struct HttpClient {
    client: Client,
    resource_url: Url,
    app_token: Option<HeaderValue>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let resource_url = Url::parse(&config.base_url)?;
        let app_token = config
            .app_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| Error::invalid_value("app_token", e.to_string()))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            resource_url,
            app_token,
            rate_limiter,
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// URL of a dataset's JSON resource
    pub fn dataset_url(&self, dataset_id: &str) -> Result<Url> {
        self.export_url(dataset_id, "json")
    }

    /// URL of a dataset's CSV export
    pub fn csv_url(&self, dataset_id: &str) -> Result<Url> {
        self.export_url(dataset_id, "csv")
    }

    fn export_url(&self, dataset_id: &str, extension: &str) -> Result<Url> {
        if dataset_id.trim().is_empty() {
            return Err(Error::invalid_value("dataset_id", "must not be empty"));
        }
        join_segment(&self.resource_url, &format!("{dataset_id}.{extension}"))
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(url, query, JSON).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(e.to_string()))
    }

    /// Send one GET and map a non-success status to [`Error::Transport`]
    async fn send(
        &self,
        url: Url,
        query: &[(&str, String)],
        accept: &'static str,
    ) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept);

        if let Some(ref token) = self.app_token {
            req = req.header(APP_TOKEN_HEADER, token.clone());
        }

        if !query.is_empty() {
            req = req.query(query);
        }

        debug!("GET {} with {} params", url, query.len());
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GET {} failed with {}", url, status.as_u16());
            return Err(Error::transport(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body,
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch_page(&self, dataset_id: &str, request: &PageRequest) -> Result<Rows> {
        let url = self.dataset_url(dataset_id)?;
        let response = self.send(url, &request.to_query_pairs(), JSON).await?;
        let body = response.bytes().await?;
        serde_json::from_slice::<Rows>(&body)
            .map_err(|e| Error::decode(format!("expected a JSON array of rows: {e}")))
    }

    async fn fetch_csv(&self, dataset_id: &str, request: &PageRequest) -> Result<String> {
        let url = self.csv_url(dataset_id)?;
        let response = self.send(url, &request.to_query_pairs(), CSV).await?;
        Ok(response.text().await?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("resource_url", &self.resource_url.as_str())
            .field("has_app_token", &self.app_token.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Append one path segment to `base`, ignoring a trailing slash on it
pub(crate) fn join_segment(base: &Url, segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::invalid_value("url", format!("'{base}' cannot be a base URL")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}
