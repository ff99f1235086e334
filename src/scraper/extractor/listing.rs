use super::selectors::SELECTORS;
use super::{Rule, element_text, first_match, resolve_url};
use scraper::Html;

/// Marker every film detail address contains
const FILM_PATH: &str = "/film/";

const FILM_LINK_RULES: &[Rule<Vec<String>>] =
    &[links_from_poster_targets, links_from_poster_anchors, links_from_any_anchor];

/// Number of list pages, from the last numbered pagination link
#[must_use]
pub fn page_count(html: &Html) -> u32 {
    html.select(&SELECTORS.pagination_link)
        .last()
        .and_then(|link| element_text(link).parse().ok())
        .filter(|&pages| pages > 0)
        .unwrap_or(1)
}

/// Absolute film addresses on a list page, in page order
#[must_use]
pub fn film_links(html: &Html, page_url: &str) -> Vec<String> {
    first_match(html, FILM_LINK_RULES)
        .unwrap_or_default()
        .into_iter()
        .map(|link| resolve_url(page_url, &link))
        .collect()
}

/// Target of the "next" anchor on a paginated review page
#[must_use]
pub fn next_page_link(html: &Html, page_url: &str) -> Option<String> {
    html.select(&SELECTORS.next_page)
        .next()
        .and_then(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(page_url, href))
}

fn non_empty(links: Vec<String>) -> Option<Vec<String>> {
    (!links.is_empty()).then_some(links)
}

fn links_from_poster_targets(html: &Html) -> Option<Vec<String>> {
    non_empty(
        html.select(&SELECTORS.poster_target)
            .filter_map(|poster| poster.value().attr("data-target-link"))
            .filter(|link| link.contains(FILM_PATH))
            .map(str::to_string)
            .collect(),
    )
}

fn links_from_poster_anchors(html: &Html) -> Option<Vec<String>> {
    non_empty(
        html.select(&SELECTORS.film_poster_anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
    )
}

/// Film pages sit directly under `/film/`; member activity links such as
/// `/<user>/film/<slug>/` only contain it
fn is_film_href(href: &str) -> bool {
    href.starts_with(FILM_PATH)
        || url::Url::parse(href).is_ok_and(|url| url.path().starts_with(FILM_PATH))
}

fn links_from_any_anchor(html: &Html) -> Option<Vec<String>> {
    non_empty(
        html.select(&SELECTORS.film_anchor)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| is_film_href(href))
            .map(str::to_string)
            .collect(),
    )
}
