use crate::scraper::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::{Client, Response, header};
use scraper::Html;
use std::time::Duration;

/// Desktop browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Result of a single fetch; failures are values, never panics
pub type FetchResult<T> = std::result::Result<T, FetchFailure>;

/// A fetched HTML document together with the address it came from
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parse the body into a queryable tree.
    ///
    /// The tree is not `Send`; keep it out of `.await` points.
    #[must_use]
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Raw image bytes plus the headers used for validation
#[derive(Debug, Clone, Default)]
pub struct ImagePayload {
    /// Declared `Content-Type`
    pub content_type: Option<String>,
    /// Declared `Content-Length`
    pub content_length: Option<u64>,
    pub bytes: Vec<u8>,
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Server answered with a non-success status
    Status(u16),
    /// Connection, timeout or body read error
    Transport(String),
    /// The crawl was cancelled before the request was sent
    Cancelled,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status {code}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to fetch {url}: {kind}")]
pub struct FetchFailure {
    pub url: String,
    pub kind: FailureKind,
}

impl FetchFailure {
    pub fn status(url: impl Into<String>, code: u16) -> Self {
        Self {
            url: url.into(),
            kind: FailureKind::Status(code),
        }
    }

    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: FailureKind::Transport(message.into()),
        }
    }

    pub fn cancelled(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: FailureKind::Cancelled,
        }
    }

    /// Transport errors are what the review crawl cools down after
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport(_))
    }

    /// Whether another attempt could plausibly succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self.kind {
            FailureKind::Transport(_) => true,
            FailureKind::Status(code) => code == 429 || code >= 500,
            FailureKind::Cancelled => false,
        }
    }
}

/// Source of documents and images.
///
/// Implementations must not retry; retry policy belongs to callers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch an HTML document
    async fn fetch(&self, url: &str) -> FetchResult<Document>;

    /// Fetch an image with its declared type and size
    async fn fetch_image(&self, url: &str) -> FetchResult<ImagePayload>;
}

/// `reqwest` backed fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }

    async fn send(&self, url: &str) -> FetchResult<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::status(url, status.as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Document> {
        let response = self.send(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(url, e.to_string()))?;

        Ok(Document::new(url, body))
    }

    async fn fetch_image(&self, url: &str) -> FetchResult<ImagePayload> {
        let response = self.send(url).await?;

        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::transport(url, e.to_string()))?;

        Ok(ImagePayload {
            content_type,
            content_length,
            bytes: bytes.to_vec(),
        })
    }
}
