use crate::scraper::{Result, writer::Writer};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Image extensions listed in the catalog
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Web path prefix used when none is configured
pub const DEFAULT_PREFIX: &str = "/letterboxd_backdrops";

/// Lists downloaded backdrops as web paths
pub struct BackdropCatalog {
    dir: PathBuf,
    prefix: String,
}

impl BackdropCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Image files directly inside the directory as `<prefix>/<file>`, sorted
    pub fn scan(&self) -> Result<Vec<String>> {
        std::fs::metadata(&self.dir)?;

        let mut entries: Vec<String> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_image(e.path()))
            .filter_map(|e| e.file_name().to_str().map(|name| format!("{}/{}", self.prefix, name)))
            .collect();

        entries.sort();
        Ok(entries)
    }

    /// Scan and write the catalog as a single-line JSON array
    pub async fn write(&self, output: &Path) -> Result<usize> {
        let entries = self.scan()?;
        Writer::write_compact_json(output, &entries).await?;

        info!("Generated catalog with {} backdrop images", entries.len());
        Ok(entries.len())
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::ScraperError;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn test_scan_keeps_images_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        File::create(dir_path.join("Heat_backdrop.jpg")).unwrap();
        File::create(dir_path.join("Alien_backdrop.PNG")).unwrap();
        File::create(dir_path.join("Ran_backdrop.webp")).unwrap();
        File::create(dir_path.join("backdrop_summary.json")).unwrap();
        File::create(dir_path.join("notes.txt")).unwrap();

        let entries = BackdropCatalog::new(dir_path).scan().unwrap();

        assert_eq!(
            entries,
            vec![
                "/letterboxd_backdrops/Alien_backdrop.PNG",
                "/letterboxd_backdrops/Heat_backdrop.jpg",
                "/letterboxd_backdrops/Ran_backdrop.webp",
            ]
        );
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        let subdir = dir_path.join("old.jpg");
        fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("nested.jpeg")).unwrap();
        File::create(dir_path.join("top.jpeg")).unwrap();

        let entries = BackdropCatalog::new(dir_path)
            .with_prefix("/backdrops/")
            .scan()
            .unwrap();

        assert_eq!(entries, vec!["/backdrops/top.jpeg"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = BackdropCatalog::new(temp_dir.path().join("missing")).scan();

        assert!(matches!(result, Err(ScraperError::Io(_))));
    }

    #[tokio::test]
    async fn test_write_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let images = temp_dir.path().join("letterboxd_backdrops");
        fs::create_dir(&images).unwrap();
        File::create(images.join("b.jpg")).unwrap();
        File::create(images.join("a.jpg")).unwrap();

        let output = temp_dir.path().join("backdrop_images.json");
        let count = BackdropCatalog::new(&images).write(&output).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            r#"["/letterboxd_backdrops/a.jpg","/letterboxd_backdrops/b.jpg"]"#
        );
    }
}
