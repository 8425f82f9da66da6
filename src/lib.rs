// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # SODA Client
//!
//! A paginated query client for Socrata Open Data (SODA) services such as
//! the Chicago Data Portal.
//!
//! ## Features
//!
//! - **SoQL Queries**: `$select`, `$where`, `$group`, `$having`, `$order`
//!   built from a structured [`Query`]
//! - **Lazy Pagination**: `$limit`/`$offset` traversal as a [`futures::Stream`]
//!   of row batches, one request per pull
//! - **Cancellation**: stop a traversal from any task with a [`CancelHandle`]
//! - **Metadata**: dataset schemas and catalog search
//! - **Rate Limiting & Retry**: opt-in, outside the paging logic
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use soda_client::{ClientConfig, Query, Result, SodaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = SodaClient::new(ClientConfig::from_env()?)?;
//!
//!     // Schema first, to check column names
//!     let meta = client.get_metadata("ijzp-q8t2").await?;
//!     assert!(meta.has_column("primary_type"));
//!
//!     // Then walk the result set page by page
//!     let query = Query::builder()
//!         .select(["date", "primary_type"])
//!         .filter("primary_type = 'THEFT'")
//!         .order_by("date DESC")
//!         .build();
//!     let mut pages = client.paginate("ijzp-q8t2", query, 1000)?;
//!     while let Some(batch) = pages.next().await {
//!         let rows = batch?;
//!         println!("{} rows", rows.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          SodaClient                             │
//! │  query()   paginate() → PageStream   get_metadata()   catalog   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │    Query     │            Engine             │     Metadata     │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ SoQL clauses │ Offset cursor                 │ Dataset schema   │
//! │ PageRequest  │ Short-page termination        │ Catalog search   │
//! │              │ Cancellation                  │                  │
//! └──────────────┴───────────────┬───────────────┴──────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │              Transport (HttpClient: reqwest, governor)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// SoQL query model and request builder
pub mod query;

/// HTTP transport with rate limiting and retry
pub mod http;

/// Pagination engine
pub mod engine;

/// Dataset metadata and catalog search
pub mod metadata;

/// Client facade
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::SodaClient;
pub use config::ClientConfig;
pub use engine::{CancelHandle, Engine, PageStream, PagerState, PagerStats};
pub use http::{HttpClient, RetryPolicy, Transport};
pub use metadata::{ColumnMetadata, DatasetMetadata};
pub use query::{PageRequest, Query, QueryBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
