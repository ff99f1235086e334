//! Layered settings: built-in defaults, an optional TOML file, then
//! `REELCRAWL__SECTION__KEY` environment variables.

use crate::scraper::{
    DEFAULT_PREFIX, DEFAULT_USER_AGENT, DelayPolicy, Pacing, Result, RetryPolicy, ReviewConfig,
    ScraperError,
};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file read from the working directory when present
pub const DEFAULT_FILE: &str = "reelcrawl.toml";

const ENV_PREFIX: &str = "REELCRAWL";

/// Keys holding `[min, max]` pairs, given as `min,max` in the environment
const LIST_KEYS: &[&str] = &[
    "crawl.entity_delay_ms",
    "crawl.page_delay_ms",
    "crawl.review_page_delay_ms",
    "crawl.link_page_delay_ms",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub crawl: CrawlSettings,
    pub reviews: ReviewSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Extra attempts after a retryable failure
    pub retry_attempts: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            retry_attempts: 0,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Delay ranges are `[min, max]` milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub entity_delay_ms: [u64; 2],
    pub page_delay_ms: [u64; 2],
    pub review_page_delay_ms: [u64; 2],
    pub link_page_delay_ms: [u64; 2],
    pub error_cooldown_ms: u64,
    pub review_error_cooldown_ms: u64,
    pub workers: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            entity_delay_ms: [2_000, 4_000],
            page_delay_ms: [5_000, 8_000],
            review_page_delay_ms: [2_000, 4_000],
            link_page_delay_ms: [1_000, 3_000],
            error_cooldown_ms: 5_000,
            review_error_cooldown_ms: 3_000,
            workers: 1,
        }
    }
}

impl CrawlSettings {
    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        Pacing {
            entity: range(self.entity_delay_ms),
            listing_page: range(self.page_delay_ms),
            review_page: range(self.review_page_delay_ms),
            link_page: range(self.link_page_delay_ms),
            error_cooldown: Duration::from_millis(self.error_cooldown_ms),
            review_cooldown: Duration::from_millis(self.review_error_cooldown_ms),
        }
    }

    fn ranges(&self) -> [(&'static str, [u64; 2]); 4] {
        [
            ("crawl.entity_delay_ms", self.entity_delay_ms),
            ("crawl.page_delay_ms", self.page_delay_ms),
            ("crawl.review_page_delay_ms", self.review_page_delay_ms),
            ("crawl.link_page_delay_ms", self.link_page_delay_ms),
        ]
    }
}

const fn range([min, max]: [u64; 2]) -> DelayPolicy {
    DelayPolicy::from_millis(min, max)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    pub min_reviews: usize,
    pub review_limit: usize,
    pub max_pages: u32,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        let defaults = ReviewConfig::default();
        Self {
            min_reviews: defaults.min_reviews,
            review_limit: defaults.review_limit,
            max_pages: defaults.max_pages,
        }
    }
}

impl From<&ReviewSettings> for ReviewConfig {
    fn from(settings: &ReviewSettings) -> Self {
        Self {
            min_reviews: settings.min_reviews,
            review_limit: settings.review_limit,
            max_pages: settings.max_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub movies_file: String,
    pub images_dir: PathBuf,
    pub backdrop_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub catalog_file: PathBuf,
    pub catalog_prefix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static"),
            movies_file: "letterboxd_movies.json".to_string(),
            images_dir: PathBuf::from("static/images"),
            backdrop_dir: PathBuf::from("letterboxd_backdrops"),
            catalog_dir: PathBuf::from("static/letterboxd_backdrops"),
            catalog_file: PathBuf::from("static/backdrop_images.json"),
            catalog_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl OutputSettings {
    /// Where the list crawl result is written
    #[must_use]
    pub fn movies_path(&self) -> PathBuf {
        self.dir.join(&self.movies_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for this crate when `RUST_LOG` is unset
    pub level: String,
    /// Daily rolling log files are written here when set
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit `path` must exist; otherwise `reelcrawl.toml` is read
    /// only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_FILE, FileFormat::Toml).required(false),
        };

        let environment = LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |env, key| env.with_list_parse_key(key),
        );

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ScraperError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (key, [min, max]) in self.crawl.ranges() {
            if min > max {
                errors.push(format!("{key}: minimum {min} is above maximum {max}"));
            }
        }
        if self.reviews.review_limit == 0 {
            errors.push("reviews.review_limit must be at least 1".to_string());
        }
        if self.crawl.workers == 0 {
            errors.push("crawl.workers must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScraperError::Config(errors.join("; ")))
        }
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.http.retry_attempts,
            Duration::from_millis(self.crawl.error_cooldown_ms),
        )
    }

    #[must_use]
    pub fn review_config(&self) -> ReviewConfig {
        ReviewConfig::from(&self.reviews)
    }
}
