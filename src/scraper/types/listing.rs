use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A list to crawl and how many films to take from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTarget {
    url: String,
    limit: Option<usize>,
}

impl ListingTarget {
    /// Create a target; the address always ends with `/`
    pub fn new(url: impl Into<String>, limit: Option<usize>) -> Self {
        let mut url = url.into().trim().to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self { url, limit }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether `count` discovered films already satisfy the limit
    #[must_use]
    pub fn is_satisfied(&self, count: usize) -> bool {
        self.limit.is_some_and(|limit| count >= limit)
    }
}

/// Outcome of the backdrop scraper for one film
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackdropResult {
    pub title: String,
    pub movie_url: String,
    pub backdrop_url: Option<String>,
    pub saved_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_normalizes_trailing_slash() {
        let target = ListingTarget::new("https://letterboxd.com/dave/list/top-250", None);
        assert_eq!(target.url(), "https://letterboxd.com/dave/list/top-250/");

        let target = ListingTarget::new("https://letterboxd.com/dave/list/top-250/", Some(3));
        assert_eq!(target.url(), "https://letterboxd.com/dave/list/top-250/");
        assert_eq!(target.limit(), Some(3));
    }

    #[test]
    fn test_target_limit() {
        let unlimited = ListingTarget::new("https://example.com/", None);
        assert!(!unlimited.is_satisfied(10_000));

        let limited = ListingTarget::new("https://example.com/", Some(2));
        assert!(!limited.is_satisfied(1));
        assert!(limited.is_satisfied(2));
    }
}
