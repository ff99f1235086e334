//! Field extraction from catalog pages.
//!
//! Every field is read through an ordered list of rules. The first rule
//! that yields a value wins; when all miss the caller substitutes a
//! sentinel instead of failing the record.

mod backdrop;
mod detail;
mod language;
mod listing;
mod poster;
mod review;
mod selectors;

pub use backdrop::backdrop_url;
pub use detail::DetailFields;
pub use language::is_english;
pub use listing::{film_links, next_page_link, page_count};
pub use poster::poster_url;
pub use review::extract_reviews;

pub(crate) use detail::extract_title;

use scraper::{ElementRef, Html};

/// One way of reading a value from a page
pub(crate) type Rule<T> = fn(&Html) -> Option<T>;

/// Apply rules in order and keep the first hit
pub(crate) fn first_match<T>(html: &Html, rules: &[Rule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(html))
}

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text, treating an empty element as a miss
pub(crate) fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    Some(element_text(element)).filter(|text| !text.is_empty())
}

/// Resolve a path against the page it was found on
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    if let Ok(base) = url::Url::parse(base_url)
        && let Ok(resolved) = base.join(path)
    {
        return resolved.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_absolute() {
        assert_eq!(
            resolve_url("https://letterboxd.com/film/x/", "https://a.ltrbxd.com/p.jpg"),
            "https://a.ltrbxd.com/p.jpg"
        );
    }

    #[test]
    fn test_resolve_url_root_relative() {
        assert_eq!(
            resolve_url("https://letterboxd.com/film/alien/reviews/", "/someone/film/alien/"),
            "https://letterboxd.com/someone/film/alien/"
        );
    }

    #[test]
    fn test_resolve_url_protocol_relative() {
        assert_eq!(
            resolve_url("https://letterboxd.com/film/alien/", "//a.ltrbxd.com/p.jpg"),
            "https://a.ltrbxd.com/p.jpg"
        );
    }

    #[test]
    fn test_first_match_order() {
        let html = Html::parse_document("<p>x</p>");
        let rules: &[Rule<u8>] = &[|_| None, |_| Some(2), |_| Some(3)];
        assert_eq!(first_match(&html, rules), Some(2));
    }
}
