use crate::scraper::{
    ScraperError,
    crawler::EntityCrawler,
    extractor::film_links,
    pacing::sleep,
    pagination::ListingPages,
    types::{EntityRecord, ListingTarget},
};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Walks a list's pages and crawls every film on them
pub struct ListCrawler {
    entities: EntityCrawler,
    workers: usize,
}

impl ListCrawler {
    #[must_use]
    pub const fn new(entities: EntityCrawler) -> Self {
        Self {
            entities,
            workers: 1,
        }
    }

    /// Crawl up to `workers` films at once; output order is unchanged
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Crawl a list.
    ///
    /// Failed films are logged and left out. When the first list page
    /// cannot be fetched the result is empty; a later page that fails is
    /// skipped. On cancellation the films crawled so far are returned.
    pub async fn crawl(&self, target: &ListingTarget) -> Vec<EntityRecord> {
        let cancel = self.entities.cancellation();
        let retry = self.entities.retry();
        let pacing = self.entities.pacing();

        info!("Scraping list: {}", target.url());
        let first = match retry.fetch(self.entities.fetcher(), target.url(), cancel).await {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to fetch list {}: {}", target.url(), e.kind);
                return Vec::new();
            }
        };

        let (pages, mut links) = {
            let html = first.html();
            (
                ListingPages::from_first_page(target.url(), &html),
                film_links(&html, &first.url),
            )
        };
        info!("List has {} pages", pages.total());

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut started = 0;
        let mut page = 1;

        loop {
            let fresh = take_new(links, &mut seen, target);
            debug!("Page {}: {} new films", page, fresh.len());
            records.extend(self.crawl_films(fresh, &mut started).await);

            if cancel.is_cancelled() {
                info!("List crawl cancelled after {} films", records.len());
                break;
            }
            if target.is_satisfied(seen.len()) {
                info!("Reached limit of {} films", seen.len());
                break;
            }
            if !pages.has_next(page) {
                break;
            }

            page += 1;
            if !pacing.listing_page.wait(cancel).await {
                break;
            }

            let url = pages.address(page);
            info!("Fetching page {}/{}: {}", page, pages.total(), url);
            links = match retry.fetch(self.entities.fetcher(), &url, cancel).await {
                Ok(document) => {
                    let html = document.html();
                    film_links(&html, &document.url)
                }
                Err(e) => {
                    warn!("Skipping page {}: {}", page, e.kind);
                    Vec::new()
                }
            };
        }

        info!("Scraped {} films from {}", records.len(), target.url());
        records
    }

    async fn crawl_films(&self, urls: Vec<String>, started: &mut usize) -> Vec<EntityRecord> {
        if self.workers == 1 {
            let mut records = Vec::new();
            for url in urls {
                if self.entities.cancellation().is_cancelled() {
                    break;
                }
                let pause = *started > 0;
                *started += 1;
                if let Some(record) = self.crawl_film(&url, pause).await {
                    records.push(record);
                }
            }
            return records;
        }

        let offset = *started;
        *started += urls.len();
        stream::iter(urls.into_iter().enumerate())
            .map(|(i, url)| async move { self.crawl_film(&url, offset + i > 0).await })
            .buffered(self.workers)
            .filter_map(futures::future::ready)
            .collect()
            .await
    }

    async fn crawl_film(&self, url: &str, pause: bool) -> Option<EntityRecord> {
        let cancel = self.entities.cancellation();
        if pause && !self.entities.pacing().entity.wait(cancel).await {
            return None;
        }

        match self.entities.crawl(url).await {
            Ok(record) => Some(record),
            Err(ScraperError::Cancelled) => {
                debug!("Skipped {} after cancellation", url);
                None
            }
            Err(e) => {
                error!("Failed to scrape {}: {}", url, e);
                sleep(self.entities.pacing().error_cooldown, cancel).await;
                None
            }
        }
    }
}

/// Unseen links in page order, stopping once the limit is met
fn take_new(links: Vec<String>, seen: &mut HashSet<String>, target: &ListingTarget) -> Vec<String> {
    let mut fresh = Vec::new();
    for link in links {
        if target.is_satisfied(seen.len()) {
            break;
        }
        if seen.insert(link.clone()) {
            fresh.push(link);
        }
    }
    fresh
}
