//! Page walking for list pages and review listings

use crate::scraper::extractor::{next_page_link, page_count};
use scraper::Html;

/// Address of page `page` of a list; page 1 is the list itself
#[must_use]
pub fn listing_page_url(base: &str, page: u32) -> String {
    if page <= 1 {
        return base.to_string();
    }

    let base = base.trim_end_matches('/');
    format!("{base}/page/{page}/")
}

/// Numbered pages of a list, counted once from the first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPages {
    base: String,
    total: u32,
}

impl ListingPages {
    #[must_use]
    pub fn from_first_page(base: &str, first_page: &Html) -> Self {
        Self {
            base: base.to_string(),
            total: page_count(first_page),
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn has_next(&self, current: u32) -> bool {
        current < self.total
    }

    #[must_use]
    pub fn address(&self, page: u32) -> String {
        listing_page_url(&self.base, page)
    }
}

/// Review pages of one sort order, followed through "next" anchors.
///
/// There is no page count up front: a page without a next anchor ends
/// the walk, as does reaching `max_pages`. Callers stop on a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPages {
    next: Option<String>,
    fetched: u32,
    max_pages: u32,
}

impl ReviewPages {
    pub fn new(first_page: impl Into<String>, max_pages: u32) -> Self {
        Self {
            next: Some(first_page.into()),
            fetched: 0,
            max_pages,
        }
    }

    /// Address to fetch next, if the walk should go on
    #[must_use]
    pub fn next_target(&self) -> Option<&str> {
        if self.fetched >= self.max_pages {
            return None;
        }
        self.next.as_deref()
    }

    /// Record a fetched page and read its continuation link
    pub fn advance(&mut self, page: &Html, page_url: &str) {
        self.fetched += 1;
        self.next = next_page_link(page, page_url);
    }

    #[must_use]
    pub const fn pages_fetched(&self) -> u32 {
        self.fetched
    }
}
