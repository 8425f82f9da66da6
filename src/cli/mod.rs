//! CLI module
//!
//! Command-line interface for querying a SODA service.
//!
//! # Commands
//!
//! - `query` - Run a single bounded query
//! - `paginate` - Walk every matching row, page by page
//! - `metadata` - Show a dataset's schema
//! - `catalog` - Search a domain's dataset catalog

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, QueryArgs};
pub use runner::Runner;
