//! Request pacing: randomized delays, cooldowns and retry budgets

use crate::scraper::fetcher::{Document, FetchFailure, FetchResult, Fetcher, ImagePayload};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Random delay drawn uniformly from `[min, max]` milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelayPolicy {
    min_ms: u64,
    max_ms: u64,
}

impl DelayPolicy {
    /// Create a policy; bounds are reordered if given backwards
    #[must_use]
    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    #[must_use]
    pub const fn fixed(duration_ms: u64) -> Self {
        Self::from_millis(duration_ms, duration_ms)
    }

    /// No delay at all
    #[must_use]
    pub const fn none() -> Self {
        Self::fixed(0)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    /// Draw one delay
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleep for one sampled delay; returns `false` if cancelled meanwhile
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        let delay = self.sample();
        if !delay.is_zero() {
            debug!("Waiting {:.1} seconds", delay.as_secs_f64());
        }
        sleep(delay, cancel).await
    }
}

/// Cancellable sleep; returns `false` if the token fired first
pub async fn sleep(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// All delays used by one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between consecutive entity detail fetches
    pub entity: DelayPolicy,
    /// Between listing pages
    pub listing_page: DelayPolicy,
    /// Between review pages within one sort order
    pub review_page: DelayPolicy,
    /// Between listing pages while only collecting links
    pub link_page: DelayPolicy,
    /// Extra wait after an entity failed
    pub error_cooldown: Duration,
    /// Wait after a transport failure during review scraping
    pub review_cooldown: Duration,
}

impl Pacing {
    /// Zero delays everywhere
    #[must_use]
    pub const fn none() -> Self {
        Self {
            entity: DelayPolicy::none(),
            listing_page: DelayPolicy::none(),
            review_page: DelayPolicy::none(),
            link_page: DelayPolicy::none(),
            error_cooldown: Duration::ZERO,
            review_cooldown: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            entity: DelayPolicy::from_millis(2_000, 4_000),
            listing_page: DelayPolicy::from_millis(5_000, 8_000),
            review_page: DelayPolicy::from_millis(2_000, 4_000),
            link_page: DelayPolicy::from_millis(1_000, 3_000),
            error_cooldown: Duration::from_secs(5),
            review_cooldown: Duration::from_secs(3),
        }
    }
}

/// How many extra attempts a caller makes after a retryable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub cooldown: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(attempts: u32, cooldown: Duration) -> Self {
        Self { attempts, cooldown }
    }

    /// Give up on the first failure
    #[must_use]
    pub const fn never() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Fetch a document within the retry budget
    pub async fn fetch(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Document> {
        self.run(url, cancel, || fetcher.fetch(url)).await
    }

    /// Fetch an image within the retry budget
    pub async fn fetch_image(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<ImagePayload> {
        self.run(url, cancel, || fetcher.fetch_image(url)).await
    }

    async fn run<T, F, Fut>(&self, url: &str, cancel: &CancellationToken, mut op: F) -> FetchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(FetchFailure::cancelled(url));
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts && e.is_retryable() => {
                    attempt += 1;
                    warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url, e.kind, attempt, self.attempts
                    );
                    if !sleep(self.cooldown, cancel).await {
                        return Err(FetchFailure::cancelled(url));
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
