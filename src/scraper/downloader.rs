use crate::scraper::fetcher::{Fetcher, ImagePayload};
use crate::scraper::pacing::RetryPolicy;
use crate::scraper::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Smallest payload accepted as a real image
pub const MIN_IMAGE_BYTES: u64 = 10_000;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]").expect("Invalid filename pattern"));

/// Why a downloaded payload was not saved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRejection {
    #[error("content type {0:?} is not an image")]
    ContentType(String),

    #[error("payload of {0} bytes is too small to be an image")]
    TooSmall(u64),
}

/// Check the declared type and size of a payload
pub fn validate(payload: &ImagePayload) -> std::result::Result<(), ImageRejection> {
    let content_type = payload.content_type.as_deref().unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(ImageRejection::ContentType(content_type.to_string()));
    }

    let size = payload
        .content_length
        .unwrap_or(payload.bytes.len() as u64);
    if size < MIN_IMAGE_BYTES {
        return Err(ImageRejection::TooSmall(size));
    }

    Ok(())
}

/// Replace every character outside `[\w-]` with `_`
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// `<images_dir>/<title>_<year>.jpg`
#[must_use]
pub fn poster_path(images_dir: &Path, title: &str, year: &str) -> PathBuf {
    images_dir.join(format!(
        "{}_{}.jpg",
        sanitize_filename(title),
        sanitize_filename(year)
    ))
}

/// `<backdrop_dir>/<title>_backdrop.jpg`
#[must_use]
pub fn backdrop_path(backdrop_dir: &Path, title: &str) -> PathBuf {
    backdrop_dir.join(format!("{}_backdrop.jpg", sanitize_filename(title)))
}

/// Validating image downloader for posters and backdrops
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    retry: RetryPolicy,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, retry: RetryPolicy) -> Self {
        Self { fetcher, retry }
    }

    /// Download an image and write it to `output_path` if it validates.
    ///
    /// Rejected payloads never touch the filesystem.
    pub async fn download_image(
        &self,
        url: &str,
        output_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let payload = self
            .retry
            .fetch_image(self.fetcher.as_ref(), url, cancel)
            .await?;

        validate(&payload)?;
        debug!("Image {} accepted ({} bytes)", url, payload.bytes.len());

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(output_path).await?;
        file.write_all(&payload.bytes).await?;
        file.flush().await?;

        info!("Saved image to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::ScraperError;
    use crate::scraper::fetcher::{Document, FetchFailure, FetchResult};
    use async_trait::async_trait;
    use tempfile::tempdir;

    fn payload(content_type: Option<&str>, content_length: Option<u64>, size: usize) -> ImagePayload {
        ImagePayload {
            content_type: content_type.map(str::to_string),
            content_length,
            bytes: vec![0xff; size],
        }
    }

    struct StaticImage(ImagePayload);

    #[async_trait]
    impl Fetcher for StaticImage {
        async fn fetch(&self, url: &str) -> FetchResult<Document> {
            Err(FetchFailure::status(url, 404))
        }

        async fn fetch_image(&self, _url: &str) -> FetchResult<ImagePayload> {
            Ok(self.0.clone())
        }
    }

    fn downloader(image: ImagePayload) -> Downloader {
        Downloader::new(Arc::new(StaticImage(image)), RetryPolicy::never())
    }

    #[test]
    fn test_validate_content_type() {
        assert!(validate(&payload(Some("image/jpeg"), None, 20_000)).is_ok());
        assert_eq!(
            validate(&payload(Some("text/html; charset=utf-8"), None, 20_000)),
            Err(ImageRejection::ContentType("text/html; charset=utf-8".to_string()))
        );
        assert!(matches!(
            validate(&payload(None, None, 20_000)),
            Err(ImageRejection::ContentType(_))
        ));
    }

    #[test]
    fn test_validate_size() {
        assert_eq!(
            validate(&payload(Some("image/png"), Some(9_999), 20_000)),
            Err(ImageRejection::TooSmall(9_999))
        );
        assert!(validate(&payload(Some("image/png"), Some(10_000), 10)).is_ok());
        // Body length stands in for a missing header
        assert_eq!(
            validate(&payload(Some("image/png"), None, 512)),
            Err(ImageRejection::TooSmall(512))
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Alien"), "Alien");
        assert_eq!(sanitize_filename("Mad Max: Fury Road"), "Mad_Max__Fury_Road");
        assert_eq!(sanitize_filename("Am\u{e9}lie"), "Am\u{e9}lie");
        assert_eq!(sanitize_filename("8-bit/Heroes"), "8-bit_Heroes");
    }

    #[test]
    fn test_image_paths() {
        let dir = Path::new("static/images");
        assert_eq!(
            poster_path(dir, "Se7en", "1995"),
            PathBuf::from("static/images/Se7en_1995.jpg")
        );
        assert_eq!(
            poster_path(dir, "Unknown", "Unknown"),
            PathBuf::from("static/images/Unknown_Unknown.jpg")
        );
        assert_eq!(
            backdrop_path(Path::new("backdrops"), "The Thing"),
            PathBuf::from("backdrops/The_Thing_backdrop.jpg")
        );
    }

    #[tokio::test]
    async fn test_download_writes_valid_image() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/poster.jpg");

        let saved = downloader(payload(Some("image/jpeg"), None, 12_000))
            .download_image("https://a.ltrbxd.com/p.jpg", &target, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(saved, target);
        assert_eq!(std::fs::metadata(&target).unwrap().len(), 12_000);
    }

    #[tokio::test]
    async fn test_rejected_image_is_not_written() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("poster.jpg");

        let result = downloader(payload(Some("text/html"), None, 12_000))
            .download_image("https://a.ltrbxd.com/p.jpg", &target, &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ScraperError::Image(ImageRejection::ContentType(_)))
        ));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_cancelled_download() {
        let dir = tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = downloader(payload(Some("image/jpeg"), None, 12_000))
            .download_image("https://a.ltrbxd.com/p.jpg", &dir.path().join("p.jpg"), &cancel)
            .await;

        assert!(matches!(result, Err(ScraperError::Fetch(_))));
    }
}
