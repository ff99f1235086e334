mod aggregator;
mod backdrop;
mod crawler;
mod downloader;
mod extractor;
mod fetcher;
mod list;
mod manifest;
mod pacing;
mod pagination;
mod types;
mod writer;


pub use aggregator::{ReviewAggregationState, SortOrder};
pub use backdrop::{BackdropConfig, BackdropCrawler};
pub use crawler::{CrawlStage, EntityCrawler, ReviewConfig};
pub use downloader::{Downloader, ImageRejection, MIN_IMAGE_BYTES, sanitize_filename};
pub use extractor::{DetailFields, is_english};
pub use fetcher::{
    DEFAULT_USER_AGENT, Document, FailureKind, FetchFailure, Fetcher, HttpFetcher, ImagePayload,
};
pub use list::ListCrawler;
pub use manifest::{BackdropCatalog, DEFAULT_PREFIX};
pub use pacing::{DelayPolicy, Pacing, RetryPolicy};
pub use types::{BackdropResult, EntityRecord, ListingTarget, ReviewRecord};
pub use writer::Writer;

/// Scraper result type
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Scraper error types
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("Image rejected: {0}")]
    Image(#[from] ImageRejection),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
