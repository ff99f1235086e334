use crate::scraper::Result;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// JSON output files
pub struct Writer;

impl Writer {
    /// Write `value` as indented UTF-8 JSON, creating parent directories
    pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_vec_pretty(value)?;
        Self::write(path, &content).await
    }

    /// Write `value` as single-line JSON, creating parent directories
    pub async fn write_compact_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_vec(value)?;
        Self::write(path, &content).await
    }

    async fn write(path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(content).await?;
        file.flush().await?;

        info!("Wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::types::{EntityRecord, ReviewRecord};
    use tempfile::tempdir;

    fn record() -> EntityRecord {
        EntityRecord {
            title: "Am\u{e9}lie".to_string(),
            year: "2001".to_string(),
            rating: "4.0".to_string(),
            genres: vec!["Comedy".to_string(), "Romance".to_string()],
            director: "Jean-Pierre Jeunet".to_string(),
            actors: vec!["Audrey Tautou as Am\u{e9}lie Poulain".to_string()],
            poster_path: None,
            is_liked: false,
            reviews: vec![ReviewRecord {
                text: "Whimsical from start to finish.".to_string(),
                rating: "9".to_string(),
                has_rating: true,
                is_liked: true,
                likes: 12,
                url: "https://letterboxd.com/someone/film/amelie/".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_write_json_pretty_and_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/letterboxd_movies.json");

        Writer::write_json(&path, &[record()]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {"));
        assert!(content.contains("Am\u{e9}lie"));
        assert!(content.contains("\"poster_path\": null"));

        let parsed: Vec<EntityRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![record()]);
    }

    #[tokio::test]
    async fn test_write_compact_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        Writer::write_compact_json(&path, &["/a.jpg", "/b.png"]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"["/a.jpg","/b.png"]"#
        );
    }
}
