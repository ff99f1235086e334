use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder for a field no extraction rule could fill
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for a missing average rating
pub const NOT_RATED: &str = "Not rated";

/// Number of characters of review text used as a key when there is no permalink
const TEXT_KEY_CHARS: usize = 100;

/// One scraped film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display title
    pub title: String,
    /// Release year as printed on the page
    pub year: String,
    /// Average rating, first token of the rating meta tag
    pub rating: String,
    /// Genres in page order
    pub genres: Vec<String>,
    /// Director display name
    pub director: String,
    /// Top billed cast, at most five
    pub actors: Vec<String>,
    /// Local poster file, absent if nothing was saved
    pub poster_path: Option<PathBuf>,
    /// Whether the page carried the liked icon
    pub is_liked: bool,
    /// Unique reviews, most liked first
    pub reviews: Vec<ReviewRecord>,
}

/// One user review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub text: String,
    /// Rating value from the `rated-<value>` class, empty if absent
    pub rating: String,
    pub has_rating: bool,
    pub is_liked: bool,
    pub likes: u32,
    /// Absolute permalink, empty if the page gave none
    pub url: String,
}

impl ReviewRecord {
    /// Dedup key: the permalink, or a text prefix when there is none
    #[must_use]
    pub fn key(&self) -> String {
        if self.url.is_empty() {
            self.text.chars().take(TEXT_KEY_CHARS).collect()
        } else {
            self.url.clone()
        }
    }
}
