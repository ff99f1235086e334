use super::selectors::{PATTERNS, SELECTORS};
use super::{element_text, is_english, resolve_url};
use crate::scraper::types::ReviewRecord;
use scraper::{ElementRef, Html};

const RATING_CLASS_PREFIX: &str = "rated-";

/// Every English review entry on a page, in page order
#[must_use]
pub fn extract_reviews(html: &Html, page_url: &str) -> Vec<ReviewRecord> {
    html.select(&SELECTORS.review_item)
        .filter_map(|item| parse_review(item, page_url))
        .collect()
}

fn parse_review(item: ElementRef<'_>, page_url: &str) -> Option<ReviewRecord> {
    let text = review_text(item);
    if !is_english(&text) {
        return None;
    }

    let url = item
        .select(&SELECTORS.review_context)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(|href| resolve_url(page_url, href))
        .unwrap_or_default();

    let rating_element = item.select(&SELECTORS.review_rating).next();
    let rating = rating_element
        .and_then(|element| {
            element
                .value()
                .classes()
                .find_map(|class| class.strip_prefix(RATING_CLASS_PREFIX))
                .map(str::to_string)
        })
        .unwrap_or_default();

    let likes = item
        .select(&SELECTORS.like_count)
        .next()
        .map(|element| parse_likes(&element_text(element)))
        .unwrap_or(0);

    Some(ReviewRecord {
        text,
        rating,
        has_rating: rating_element.is_some(),
        is_liked: item.select(&SELECTORS.liked_icon).next().is_some(),
        likes,
        url,
    })
}

/// Paragraphs joined by a space, or the whole body when it has none
fn review_text(item: ElementRef<'_>) -> String {
    let Some(body) = item.select(&SELECTORS.review_body).next() else {
        return String::new();
    };

    let paragraphs: Vec<String> = body.select(&SELECTORS.paragraph).map(element_text).collect();
    if paragraphs.is_empty() {
        element_text(body)
    } else {
        paragraphs.join(" ")
    }
}

fn parse_likes(label: &str) -> u32 {
    PATTERNS
        .digits
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
