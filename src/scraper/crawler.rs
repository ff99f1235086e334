use crate::scraper::{
    Result, ScraperError,
    aggregator::{ReviewAggregationState, SortOrder},
    downloader::{Downloader, poster_path},
    extractor::{DetailFields, extract_reviews},
    fetcher::{FailureKind, FetchFailure, Fetcher},
    pacing::{Pacing, RetryPolicy, sleep},
    pagination::ReviewPages,
    types::{EntityRecord, ReviewRecord},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Review collection bounds for one film
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewConfig {
    /// Sort orders are skipped once this many unique reviews are known
    pub min_reviews: usize,
    /// Hard cap on reviews kept per film
    pub review_limit: usize,
    /// Pages followed per sort order, page 1 included
    pub max_pages: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_reviews: 50,
            review_limit: 100,
            max_pages: 20,
        }
    }
}

/// Progress of a single film crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStage {
    FetchDetail,
    ExtractFields,
    DownloadPoster,
    AggregateReviews,
    Complete,
}

impl std::fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchDetail => write!(f, "fetch detail"),
            Self::ExtractFields => write!(f, "extract fields"),
            Self::DownloadPoster => write!(f, "download poster"),
            Self::AggregateReviews => write!(f, "aggregate reviews"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Crawls one film page into an [`EntityRecord`]
#[derive(Clone)]
pub struct EntityCrawler {
    fetcher: Arc<dyn Fetcher>,
    downloader: Downloader,
    reviews: ReviewConfig,
    pacing: Pacing,
    retry: RetryPolicy,
    images_dir: PathBuf,
    cancel: CancellationToken,
}

impl EntityCrawler {
    /// Create a crawler with default review bounds, pacing and no retries
    pub fn new(fetcher: Arc<dyn Fetcher>, images_dir: impl Into<PathBuf>) -> Self {
        let retry = RetryPolicy::never();
        Self {
            downloader: Downloader::new(fetcher.clone(), retry),
            fetcher,
            reviews: ReviewConfig::default(),
            pacing: Pacing::default(),
            retry,
            images_dir: images_dir.into(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn with_reviews(mut self, reviews: ReviewConfig) -> Self {
        self.reviews = reviews;
        self
    }

    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self.downloader = Downloader::new(self.fetcher.clone(), retry);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    #[must_use]
    pub const fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Crawl a film page.
    ///
    /// Only a failed detail fetch fails the film. A missing poster or a
    /// failed review page just leaves that part empty.
    pub async fn crawl(&self, url: &str) -> Result<EntityRecord> {
        info!("Scraping: {}", url);

        debug!("{}: {}", url, CrawlStage::FetchDetail);
        let document = self
            .retry
            .fetch(self.fetcher.as_ref(), url, &self.cancel)
            .await
            .map_err(detail_error)?;

        debug!("{}: {}", url, CrawlStage::ExtractFields);
        let fields = DetailFields::extract(&document);
        debug!(
            "Found '{}' ({}), {} reviews on the film page",
            fields.title,
            fields.year,
            fields.reviews.len()
        );

        debug!("{}: {}", url, CrawlStage::DownloadPoster);
        let poster_path = self.download_poster(&fields).await;

        debug!("{}: {}", url, CrawlStage::AggregateReviews);
        let reviews = self.aggregate_reviews(url, fields.reviews).await;

        info!(
            "Scraped '{}' ({}) with {} reviews",
            fields.title,
            fields.year,
            reviews.len()
        );
        debug!("{}: {}", url, CrawlStage::Complete);

        Ok(EntityRecord {
            title: fields.title,
            year: fields.year,
            rating: fields.rating,
            genres: fields.genres,
            director: fields.director,
            actors: fields.actors,
            poster_path,
            is_liked: fields.is_liked,
            reviews,
        })
    }

    async fn download_poster(&self, fields: &DetailFields) -> Option<PathBuf> {
        let Some(url) = fields.poster_url.as_deref() else {
            warn!("No poster found for '{}'", fields.title);
            return None;
        };

        let path = poster_path(&self.images_dir, &fields.title, &fields.year);
        match self.downloader.download_image(url, &path, &self.cancel).await {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!("Poster for '{}' not saved: {}", fields.title, e);
                None
            }
        }
    }

    /// Merge the film page reviews with the sorted review listings
    async fn aggregate_reviews(&self, url: &str, seed: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
        let mut state =
            ReviewAggregationState::new(self.reviews.min_reviews, self.reviews.review_limit);
        state.merge(seed);

        for order in SortOrder::ALL {
            if self.cancel.is_cancelled() {
                info!("Review collection for {} cancelled", url);
                break;
            }
            if state.has_enough() || state.is_full() {
                debug!(
                    "Skipping '{}' reviews, already have {}",
                    order,
                    state.len()
                );
                continue;
            }

            self.crawl_sort_order(url, order, &mut state).await;
        }

        state.into_sorted()
    }

    async fn crawl_sort_order(
        &self,
        url: &str,
        order: SortOrder,
        state: &mut ReviewAggregationState,
    ) {
        let mut pages = ReviewPages::new(order.reviews_url(url), self.reviews.max_pages);

        while let Some(target) = pages.next_target().map(str::to_string) {
            if state.is_full() {
                break;
            }
            if pages.pages_fetched() > 0 && !self.pacing.review_page.wait(&self.cancel).await {
                break;
            }

            let document = match self
                .retry
                .fetch(self.fetcher.as_ref(), &target, &self.cancel)
                .await
            {
                Ok(document) => document,
                Err(e) => {
                    warn!("Failed to fetch '{}' reviews for {}: {}", order, url, e.kind);
                    if e.is_transport() {
                        sleep(self.pacing.review_cooldown, &self.cancel).await;
                    }
                    break;
                }
            };

            let added = {
                let html = document.html();
                let batch = extract_reviews(&html, &document.url);
                pages.advance(&html, &document.url);
                state.merge(batch)
            };

            debug!(
                "'{}' page {}: {} new reviews, {} total",
                order,
                pages.pages_fetched(),
                added,
                state.len()
            );
        }
    }
}

fn detail_error(failure: FetchFailure) -> ScraperError {
    if failure.kind == FailureKind::Cancelled {
        ScraperError::Cancelled
    } else {
        ScraperError::Fetch(failure)
    }
}
