//! Transport trait

use crate::error::{Error, Result};
use crate::query::PageRequest;
use crate::types::Rows;
use async_trait::async_trait;

/// Performs one bounded fetch against the service.
///
/// Implementations issue exactly one request per call and never retry.
/// Failures come back classified as [`crate::Error::Network`],
/// [`crate::Error::Transport`] or [`crate::Error::Decode`]; rows come back in
/// the order the service sent them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the rows of `dataset_id` selected by `request`
    async fn fetch_page(&self, dataset_id: &str, request: &PageRequest) -> Result<Rows>;

    /// Fetch the same selection as CSV text, header row included.
    ///
    /// Transports without an export route keep the default, which fails.
    async fn fetch_csv(&self, dataset_id: &str, _request: &PageRequest) -> Result<String> {
        Err(Error::Other(format!(
            "CSV export of {dataset_id} is not supported by this transport"
        )))
    }
}
