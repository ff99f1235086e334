//! Backdrop-only crawl of the first films of a list

use crate::scraper::{
    Result,
    downloader::{Downloader, backdrop_path},
    extractor::{backdrop_url, extract_title, film_links},
    fetcher::Fetcher,
    pacing::{Pacing, RetryPolicy},
    pagination::listing_page_url,
    types::{BackdropResult, ListingTarget, UNKNOWN},
    writer::Writer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Summary file written next to the images
pub const SUMMARY_FILE: &str = "backdrop_summary.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackdropConfig {
    /// Films taken from the start of the list
    pub count: usize,
    /// Where images and the summary are written
    pub backdrop_dir: PathBuf,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            count: 5,
            backdrop_dir: PathBuf::from("letterboxd_backdrops"),
        }
    }
}

pub struct BackdropCrawler {
    fetcher: Arc<dyn Fetcher>,
    downloader: Downloader,
    config: BackdropConfig,
    pacing: Pacing,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl BackdropCrawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: BackdropConfig) -> Self {
        let retry = RetryPolicy::never();
        Self {
            downloader: Downloader::new(fetcher.clone(), retry),
            fetcher,
            config,
            pacing: Pacing::default(),
            retry,
            cancel: CancellationToken::new(),
        }
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

    /// Crawl backdrops for the first films of a list and write the summary
    pub async fn run(&self, list_url: &str) -> Result<Vec<BackdropResult>> {
        info!(
            "Getting backdrop images for the first {} films from {}",
            self.config.count, list_url
        );

        let links = self.collect_links(list_url).await;
        info!("Found {} film links", links.len());
        if links.is_empty() {
            warn!("No films found, check the list address");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(links.len());
        for (i, url) in links.iter().enumerate() {
            if i > 0 && !self.pacing.entity.wait(&self.cancel).await {
                break;
            }
            info!("[{}/{}] Processing: {}", i + 1, links.len(), url);
            results.push(self.scrape_film(url).await);
        }

        let summary = self.config.backdrop_dir.join(SUMMARY_FILE);
        Writer::write_json(&summary, &results).await?;

        let found = results.iter().filter(|r| r.backdrop_url.is_some()).count();
        let saved = results.iter().filter(|r| r.saved_path.is_some()).count();
        info!(
            "Processed {} films: {} backdrops found, {} saved to {}",
            results.len(),
            found,
            saved,
            self.config.backdrop_dir.display()
        );

        Ok(results)
    }

    /// The first `count` unique film addresses of a list.
    ///
    /// Pages are walked while more links are needed; a page with no film
    /// links or a failed fetch ends the walk.
    pub async fn collect_links(&self, list_url: &str) -> Vec<String> {
        let target = ListingTarget::new(list_url, Some(self.config.count));
        let mut links: Vec<String> = Vec::new();
        let mut page = 1;

        while !target.is_satisfied(links.len()) {
            if page > 1 && !self.pacing.link_page.wait(&self.cancel).await {
                break;
            }

            let url = listing_page_url(target.url(), page);
            debug!("Fetching page {}: {}", page, url);
            let document = match self.retry.fetch(self.fetcher.as_ref(), &url, &self.cancel).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("Error fetching page {}: {}", page, e.kind);
                    break;
                }
            };

            let found = {
                let html = document.html();
                film_links(&html, &document.url)
            };
            if found.is_empty() {
                debug!("No film links on page {}", page);
                break;
            }

            for link in found {
                if target.is_satisfied(links.len()) {
                    break;
                }
                if !links.contains(&link) {
                    links.push(link);
                }
            }

            debug!("Collected {} film links so far", links.len());
            page += 1;
        }

        links
    }

    async fn scrape_film(&self, url: &str) -> BackdropResult {
        let document = match self.retry.fetch(self.fetcher.as_ref(), url, &self.cancel).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to fetch film page {}: {}", url, e.kind);
                return BackdropResult {
                    title: UNKNOWN.to_string(),
                    movie_url: url.to_string(),
                    backdrop_url: None,
                    saved_path: None,
                };
            }
        };

        let (title, backdrop) = {
            let html = document.html();
            (
                extract_title(&html).unwrap_or_else(|| UNKNOWN.to_string()),
                backdrop_url(&html),
            )
        };

        let saved_path = match backdrop.as_deref() {
            Some(image) => {
                debug!("Found backdrop for '{}': {}", title, image);
                let path = backdrop_path(&self.config.backdrop_dir, &title);
                match self.downloader.download_image(image, &path, &self.cancel).await {
                    Ok(saved) => Some(saved),
                    Err(e) => {
                        warn!("Backdrop for '{}' not saved: {}", title, e);
                        None
                    }
                }
            }
            None => {
                info!("No backdrop found for '{}'", title);
                None
            }
        };

        BackdropResult {
            title,
            movie_url: url.to_string(),
            backdrop_url: backdrop,
            saved_path,
        }
    }
}
