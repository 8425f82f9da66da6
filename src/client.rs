//! Client facade
//!
//! [`SodaClient`] wires a [`ClientConfig`] into the HTTP transport, the page
//! engine and the metadata lookup, so callers deal with one value.
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use soda_client::{ClientConfig, Query, SodaClient};
//!
//! let client = SodaClient::new(ClientConfig::default())?;
//! let query = Query::builder()
//!     .select(["date", "primary_type"])
//!     .filter("year = 2024")
//!     .build();
//!
//! let mut pages = client.paginate("ijzp-q8t2", query, 1000)?;
//! while let Some(batch) = pages.next().await {
//!     println!("{} rows", batch?.len());
//! }
//! ```

use crate::config::ClientConfig;
use crate::engine::{Engine, PageStream};
use crate::error::Result;
use crate::http::{HttpClient, RetryPolicy, Transport};
use crate::metadata::{CatalogPage, DatasetMetadata, MetadataClient};
use crate::query::Query;
use crate::types::Rows;
use std::sync::Arc;
use tracing::debug;

/// Entry point for querying a SODA service
#[derive(Debug, Clone)]
pub struct SodaClient {
    config: ClientConfig,
    http: Arc<HttpClient>,
    engine: Engine,
    metadata: MetadataClient,
}

impl SodaClient {
    /// Create a client from an explicit configuration.
    ///
    /// The configuration is validated; nothing is read from the environment.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Arc::new(HttpClient::from_config(&config)?);
        let transport: Arc<dyn Transport> = http.clone();
        let engine = Engine::new(transport);
        let metadata = MetadataClient::new(
            Arc::clone(&http),
            &config.metadata_url,
            &config.catalog_url,
        )?;

        debug!("SODA client ready for {}", config.base_url);

        Ok(Self {
            config,
            http,
            engine,
            metadata,
        })
    }

    /// Run a single bounded query
    pub async fn query(&self, dataset_id: &str, query: &Query) -> Result<Rows> {
        self.engine.query(dataset_id, query).await
    }

    /// Run a single bounded query against the CSV export
    pub async fn query_csv(&self, dataset_id: &str, query: &Query) -> Result<String> {
        self.engine.query_csv(dataset_id, query).await
    }

    /// Traverse every matching row, `page_size` rows per request
    pub fn paginate(
        &self,
        dataset_id: impl Into<String>,
        query: Query,
        page_size: u32,
    ) -> Result<PageStream> {
        self.engine.paginate(dataset_id, query, page_size)
    }

    /// Traverse every matching row using the query's page size
    pub fn pages(&self, dataset_id: impl Into<String>, query: Query) -> Result<PageStream> {
        self.engine.pages(dataset_id, query)
    }

    /// Traverse everything and return the concatenated rows
    pub async fn collect_all(
        &self,
        dataset_id: impl Into<String>,
        query: Query,
        page_size: u32,
    ) -> Result<Rows> {
        self.engine.collect_all(dataset_id, query, page_size).await
    }

    /// Fetch dataset schema and description
    pub async fn get_metadata(&self, dataset_id: &str) -> Result<DatasetMetadata> {
        self.metadata.get_metadata(dataset_id).await
    }

    /// Search the catalog of a domain, returning at most `limit` hits
    pub async fn search_catalog(
        &self,
        domain: &str,
        text: &str,
        limit: Option<u32>,
    ) -> Result<CatalogPage> {
        self.metadata.search_catalog(domain, text, limit).await
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The underlying HTTP transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Retry policy configured for caller-side retries
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }
}
