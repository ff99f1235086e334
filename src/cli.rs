//! Command line interface.

use crate::config::Settings;
use crate::logging;
use crate::scraper::{
    BackdropCatalog, BackdropConfig, BackdropCrawler, EntityCrawler, Fetcher, HttpFetcher,
    ListCrawler, ListingTarget, Writer,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Input;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Films processed by `backdrops` when no usable count is given
const DEFAULT_BACKDROP_COUNT: usize = 5;

#[derive(Parser)]
#[command(name = "reelcrawl")]
#[command(about = "Crawl curated film lists into structured JSON")]
#[command(version)]
pub struct Cli {
    /// Settings file (reelcrawl.toml is used when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every film of a list with posters and reviews
    List {
        /// Address of the list
        list_url: String,
        /// Maximum number of films (invalid or 0 = all)
        limit: Option<String>,
        /// Films crawled at once
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Download backdrop images for the first films of a list
    Backdrops {
        /// Address of the list (prompted when missing)
        list_url: Option<String>,
        /// Number of films (prompted when missing, invalid = 5)
        count: Option<String>,
    },

    /// Write the JSON catalog of downloaded backdrops
    Catalog {
        /// Directory holding the backdrop images
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Catalog file to write
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Parse arguments, set up logging and run the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let _guard = logging::init(&settings.logging, cli.verbose);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match cli.command {
        Commands::List {
            list_url,
            limit,
            workers,
        } => {
            let limit = limit.as_deref().and_then(parse_limit);
            crawl_list(&settings, &list_url, limit, workers, cancel).await
        }
        Commands::Backdrops { list_url, count } => {
            let list_url = match list_url {
                Some(url) => url,
                None => Input::<String>::new()
                    .with_prompt("Enter Letterboxd list URL")
                    .interact_text()?,
            };
            let count = match count {
                Some(raw) => parse_count(&raw),
                None => parse_count(
                    &Input::<String>::new()
                        .with_prompt("How many films to process from the beginning of the list?")
                        .interact_text()?,
                ),
            };
            crawl_backdrops(&settings, &list_url, count, cancel).await
        }
        Commands::Catalog { dir, output } => {
            let dir = dir.unwrap_or_else(|| settings.output.catalog_dir.clone());
            let output = output.unwrap_or_else(|| settings.output.catalog_file.clone());
            BackdropCatalog::new(dir)
                .with_prefix(settings.output.catalog_prefix.as_str())
                .write(&output)
                .await?;
            Ok(())
        }
    }
}

async fn crawl_list(
    settings: &Settings,
    list_url: &str,
    limit: Option<usize>,
    workers: Option<usize>,
    cancel: CancellationToken,
) -> Result<()> {
    let entities = EntityCrawler::new(http_fetcher(settings)?, &settings.output.images_dir)
        .with_reviews(settings.review_config())
        .with_pacing(settings.crawl.pacing())
        .with_retry(settings.retry_policy())
        .with_cancellation(cancel);

    let records = ListCrawler::new(entities)
        .with_workers(workers.unwrap_or(settings.crawl.workers))
        .crawl(&ListingTarget::new(list_url, limit))
        .await;

    let path = settings.output.movies_path();
    Writer::write_json(&path, &records).await?;
    info!("Saved {} films to {}", records.len(), path.display());
    Ok(())
}

async fn crawl_backdrops(
    settings: &Settings,
    list_url: &str,
    count: usize,
    cancel: CancellationToken,
) -> Result<()> {
    let config = BackdropConfig {
        count,
        backdrop_dir: settings.output.backdrop_dir.clone(),
    };

    BackdropCrawler::new(http_fetcher(settings)?, config)
        .with_pacing(settings.crawl.pacing())
        .with_retry(settings.retry_policy())
        .with_cancellation(cancel)
        .run(list_url)
        .await?;
    Ok(())
}

fn http_fetcher(settings: &Settings) -> Result<Arc<dyn Fetcher>> {
    let fetcher = HttpFetcher::new(&settings.http.user_agent, settings.http.timeout())?;
    Ok(Arc::new(fetcher))
}

fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current request");
            cancel.cancel();
        }
    });
}

/// Film limit for `list`; anything unusable means no limit
fn parse_limit(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => None,
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!("Invalid limit '{}', scraping all films", raw);
            None
        }
    }
}

/// Film count for `backdrops`; anything below 1 falls back to the default
fn parse_count(raw: &str) -> usize {
    match raw.trim().parse::<i64>() {
        Ok(count) if count >= 1 => usize::try_from(count).unwrap_or(DEFAULT_BACKDROP_COUNT),
        _ => {
            warn!("Invalid count. Using default: {}", DEFAULT_BACKDROP_COUNT);
            DEFAULT_BACKDROP_COUNT
        }
    }
}
