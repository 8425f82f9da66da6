//! Execution engine module
//!
//! Single bounded queries and paginated traversal.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Engine` - Runs queries (JSON rows or CSV text) against a [`Transport`]
//! - `PageStream` - Lazy stream of pages, one request per pull
//! - `CancelHandle` - Stops a traversal between pulls
//!
//! Traversal is strictly sequential: the offset cursor starts at 0, grows by
//! exactly the page size after every full page, and at most one request is
//! outstanding. A page shorter than the page size (or empty) ends the
//! traversal, so a result set that is an exact multiple of the page size
//! costs one extra, empty request.

mod pager;
mod types;

pub use pager::PageStream;
pub use types::{CancelHandle, PagerState, PagerStats};

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::query::{build, Query};
use crate::types::{Rows, MAX_PAGE_SIZE};
use futures::StreamExt;
use std::sync::Arc;
use tracing::debug;

/// Query engine over a transport
#[derive(Clone)]
pub struct Engine {
    transport: Arc<dyn Transport>,
}

impl Engine {
    /// Create a new engine
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Run a single bounded request.
    ///
    /// Uses the query's own `limit`/`offset`, falling back to a small page
    /// at offset 0.
    pub async fn query(&self, dataset_id: &str, query: &Query) -> Result<Rows> {
        let (limit, offset) = query.single_request_bounds();
        check_page_size(limit)?;

        let request = build(query, limit, offset);
        let rows = self.transport.fetch_page(dataset_id, &request).await?;
        debug!("Query on {dataset_id} returned {} rows", rows.len());
        Ok(rows)
    }

    /// Run a single bounded request against the CSV export.
    ///
    /// Same bounds as [`Engine::query`]; the body comes back as text, header
    /// row first.
    pub async fn query_csv(&self, dataset_id: &str, query: &Query) -> Result<String> {
        let (limit, offset) = query.single_request_bounds();
        check_page_size(limit)?;

        let request = build(query, limit, offset);
        let csv = self.transport.fetch_csv(dataset_id, &request).await?;
        debug!("CSV export of {dataset_id}: {} bytes", csv.len());
        Ok(csv)
    }

    /// Traverse every row matching `query`, `page_size` rows per request.
    ///
    /// Nothing is sent until the returned stream is polled.
    pub fn paginate(
        &self,
        dataset_id: impl Into<String>,
        query: Query,
        page_size: u32,
    ) -> Result<PageStream> {
        check_page_size(page_size)?;
        Ok(PageStream::new(
            Arc::clone(&self.transport),
            Arc::from(dataset_id.into()),
            Arc::new(query),
            page_size,
        ))
    }

    /// Like [`Engine::paginate`], using the query's own page size
    pub fn pages(&self, dataset_id: impl Into<String>, query: Query) -> Result<PageStream> {
        let page_size = query.page_size();
        self.paginate(dataset_id, query, page_size)
    }

    /// Traverse everything and concatenate the pages.
    ///
    /// Fails with the first failed page; rows fetched before it are dropped.
    pub async fn collect_all(
        &self,
        dataset_id: impl Into<String>,
        query: Query,
        page_size: u32,
    ) -> Result<Rows> {
        let mut stream = self.paginate(dataset_id, query, page_size)?;
        let mut all = Vec::new();
        while let Some(batch) = stream.next().await {
            all.extend(batch?);
        }
        Ok(all)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

fn check_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::InvalidPageSize {
            page_size,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}
