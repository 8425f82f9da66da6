//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Query client for Socrata Open Data (SODA) services
#[derive(Parser, Debug)]
#[command(name = "soda-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML); defaults to the environment
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Resource endpoint, e.g. https://data.cityofchicago.org/resource
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Metadata endpoint, e.g. https://data.cityofchicago.org/api/views
    #[arg(long, global = true)]
    pub metadata_url: Option<String>,

    /// App token sent as X-App-Token
    #[arg(long, global = true)]
    pub app_token: Option<String>,

    /// Retries for retryable failures of single requests
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// SoQL clauses shared by `query` and `paginate`
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Columns to select (comma-separated or repeated)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// `$where` predicate
    #[arg(short = 'w', long = "where")]
    pub filter: Option<String>,

    /// `$group` clause
    #[arg(long)]
    pub group: Option<String>,

    /// `$having` clause
    #[arg(long)]
    pub having: Option<String>,

    /// `$order` clause
    #[arg(short, long)]
    pub order: Option<String>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single bounded query
    Query {
        /// Dataset identifier (e.g. ijzp-q8t2)
        dataset: String,

        #[command(flatten)]
        query: QueryArgs,

        /// Maximum rows to return
        #[arg(short, long)]
        limit: Option<u32>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<u64>,

        /// Print the CSV export instead of JSON rows
        #[arg(long)]
        csv: bool,
    },

    /// Walk every matching row, page by page
    Paginate {
        /// Dataset identifier (e.g. ijzp-q8t2)
        dataset: String,

        #[command(flatten)]
        query: QueryArgs,

        /// Rows per page (defaults to the configured page size)
        #[arg(short, long)]
        page_size: Option<u32>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Print one summary line per page instead of the rows
        #[arg(long)]
        summary: bool,
    },

    /// Show dataset schema and description
    Metadata {
        /// Dataset identifier (e.g. ijzp-q8t2)
        dataset: String,
    },

    /// Search the dataset catalog of a domain
    Catalog {
        /// Free-text search
        #[arg(default_value = "")]
        text: String,

        /// Domain to search
        #[arg(short, long, default_value = "data.cityofchicago.org")]
        domain: String,

        /// Maximum datasets to return
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
