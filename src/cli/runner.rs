//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, QueryArgs};
use crate::client::SodaClient;
use crate::config::ClientConfig;
use crate::error::{Result, ResultExt};
use crate::query::Query;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = SodaClient::new(config)?;

        match &self.cli.command {
            Commands::Query {
                dataset,
                query,
                limit,
                offset,
                csv,
            } => {
                let query = build_query(query, *limit, *offset, None);
                if *csv {
                    self.query_csv(&client, dataset, &query).await
                } else {
                    self.query(&client, dataset, &query).await
                }
            }
            Commands::Paginate {
                dataset,
                query,
                page_size,
                max_pages,
                summary,
            } => {
                let page_size = page_size.unwrap_or(client.config().page_size);
                let query = build_query(query, None, None, Some(page_size));
                self.paginate(&client, dataset, query, *max_pages, *summary)
                    .await
            }
            Commands::Metadata { dataset } => self.metadata(&client, dataset).await,
            Commands::Catalog {
                text,
                domain,
                limit,
            } => self.catalog(&client, domain, text, *limit).await,
        }
    }

    /// Load the configuration file (or the environment) and apply flag
    /// overrides on top
    pub(crate) fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_yaml_file(path)?,
            None => ClientConfig::from_env().context("Failed to load config from environment")?,
        };

        if let Some(url) = &self.cli.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(url) = &self.cli.metadata_url {
            config.metadata_url.clone_from(url);
        }
        if let Some(token) = &self.cli.app_token {
            config.app_token = Some(token.clone()).filter(|t| !t.trim().is_empty());
        }
        if let Some(retries) = self.cli.retries {
            config.retry = config.retry.clone().with_max_retries(retries);
        }

        config.validate()?;
        Ok(config)
    }

    async fn query(&self, client: &SodaClient, dataset: &str, query: &Query) -> Result<()> {
        let start = Instant::now();
        let rows = client
            .retry_policy()
            .run(move || client.query(dataset, query))
            .await?;

        info!(
            "Fetched {} rows from {} in {:?}",
            rows.len(),
            dataset,
            start.elapsed()
        );
        for row in &rows {
            self.output(row);
        }
        Ok(())
    }

    async fn query_csv(&self, client: &SodaClient, dataset: &str, query: &Query) -> Result<()> {
        let csv = client
            .retry_policy()
            .run(move || client.query_csv(dataset, query))
            .await?;

        info!("Fetched {} bytes of CSV from {dataset}", csv.len());
        print!("{csv}");
        if !csv.is_empty() && !csv.ends_with('\n') {
            println!();
        }
        Ok(())
    }

    async fn paginate(
        &self,
        client: &SodaClient,
        dataset: &str,
        query: Query,
        max_pages: Option<usize>,
        summary: bool,
    ) -> Result<()> {
        let start = Instant::now();
        let mut stream = client.pages(dataset, query)?;
        let page_size = u64::from(stream.page_size());
        let mut page = 0usize;
        if max_pages == Some(0) {
            stream.cancel();
        }

        while let Some(batch) = stream.next().await {
            let rows = batch?;

            if summary {
                self.output(&json!({
                    "page": page,
                    "offset": page as u64 * page_size,
                    "rows": rows.len(),
                }));
            } else {
                for row in &rows {
                    self.output(row);
                }
            }

            page += 1;
            if max_pages.is_some_and(|max| page >= max) {
                info!("Reached --max-pages {page}, stopping");
                stream.cancel();
            }
        }

        let stats = stream.stats();
        info!(
            "Paginated {}: {} pages, {} rows in {:?} ({:?})",
            dataset,
            stats.pages_fetched,
            stats.rows_yielded,
            start.elapsed(),
            stream.state()
        );
        Ok(())
    }

    async fn metadata(&self, client: &SodaClient, dataset: &str) -> Result<()> {
        let metadata = client
            .retry_policy()
            .run(move || client.get_metadata(dataset))
            .await?;

        info!(
            "{} ({}): {} columns",
            metadata.name,
            dataset,
            metadata.columns.len()
        );
        self.output(&metadata);
        Ok(())
    }

    async fn catalog(
        &self,
        client: &SodaClient,
        domain: &str,
        text: &str,
        limit: Option<u32>,
    ) -> Result<()> {
        let page = client
            .retry_policy()
            .run(move || client.search_catalog(domain, text, limit))
            .await?;

        info!(
            "{} of {} datasets on {domain}",
            page.results.len(),
            page.result_set_size
        );
        for result in &page.results {
            self.output(&result.resource);
        }
        Ok(())
    }

    /// Print a document in the selected format; a document that cannot be
    /// serialized is skipped with a warning
    fn output<T: Serialize + ?Sized>(&self, value: &T) {
        if let Some(line) = render(value, self.cli.format) {
            println!("{line}");
        }
    }
}

/// Render one output document
pub(crate) fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("Failed to serialize output: {e}");
            None
        }
    }
}

/// Turn CLI clause flags into a [`Query`]
pub(crate) fn build_query(
    args: &QueryArgs,
    limit: Option<u32>,
    offset: Option<u64>,
    page_size: Option<u32>,
) -> Query {
    let mut builder = Query::builder().select(args.select.iter().map(String::as_str));

    if let Some(filter) = &args.filter {
        builder = builder.filter(filter.as_str());
    }
    if let Some(group) = &args.group {
        builder = builder.group_by(group.as_str());
    }
    if let Some(having) = &args.having {
        builder = builder.having(having.as_str());
    }
    if let Some(order) = &args.order {
        builder = builder.order_by(order.as_str());
    }
    if let Some(limit) = limit {
        builder = builder.limit(limit);
    }
    if let Some(offset) = offset {
        builder = builder.offset(offset);
    }
    if let Some(page_size) = page_size {
        builder = builder.page_size(page_size);
    }

    builder.build()
}

