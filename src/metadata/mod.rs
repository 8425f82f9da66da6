//! Metadata module
//!
//! Dataset schema lookup and catalog search. Neither is used by the page
//! engine; callers consult them before building a query, e.g. to check
//! column names.

mod types;

pub use types::{CatalogPage, CatalogResource, CatalogResult, ColumnMetadata, DatasetMetadata};

use crate::error::{Error, Result};
use crate::http::{join_segment, HttpClient};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Looks up dataset metadata and searches the catalog
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: Arc<HttpClient>,
    metadata_url: Url,
    catalog_url: Url,
}

impl MetadataClient {
    /// Create a metadata client sharing `http`
    pub fn new(http: Arc<HttpClient>, metadata_url: &str, catalog_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            metadata_url: Url::parse(metadata_url)?,
            catalog_url: Url::parse(catalog_url)?,
        })
    }

    /// Fetch the schema and description of a dataset
    pub async fn get_metadata(&self, dataset_id: &str) -> Result<DatasetMetadata> {
        if dataset_id.trim().is_empty() {
            return Err(Error::invalid_value("dataset_id", "must not be empty"));
        }
        let url = join_segment(&self.metadata_url, dataset_id)?;
        let metadata: DatasetMetadata = self.http.get_json(url, &[]).await?;
        debug!(
            "Metadata for {}: {} columns",
            dataset_id,
            metadata.columns.len()
        );
        Ok(metadata)
    }

    /// Search the catalog of `domain` for datasets matching `text`.
    ///
    /// `limit` caps the hits returned; the service default applies when unset.
    pub async fn search_catalog(
        &self,
        domain: &str,
        text: &str,
        limit: Option<u32>,
    ) -> Result<CatalogPage> {
        let mut query = vec![("domains", domain.to_string())];
        if !text.trim().is_empty() {
            query.push(("q", text.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.http.get_json(self.catalog_url.clone(), &query).await
    }
}
