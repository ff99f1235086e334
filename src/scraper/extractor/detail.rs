use super::selectors::SELECTORS;
use super::{Rule, element_text, extract_reviews, first_match, non_empty_text, poster_url};
use crate::scraper::fetcher::Document;
use crate::scraper::types::{NOT_RATED, ReviewRecord, UNKNOWN};
use scraper::Html;

/// Number of top billed cast members kept
const MAX_ACTORS: usize = 5;
/// Tooltip text for cast members without a credited role
const UNCREDITED: &str = "(uncredited)";

const TITLE_RULES: &[Rule<String>] = &[title_from_headline, title_from_film_title];
const DIRECTOR_RULES: &[Rule<String>] = &[director_from_contributor, director_from_lockup];

/// Everything read from a film's detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub genres: Vec<String>,
    pub director: String,
    pub actors: Vec<String>,
    pub is_liked: bool,
    /// Absolute poster image address, if any rule found one
    pub poster_url: Option<String>,
    /// Reviews shown on the detail page itself
    pub reviews: Vec<ReviewRecord>,
}

impl DetailFields {
    /// Extract all fields, substituting sentinels for misses
    #[must_use]
    pub fn extract(document: &Document) -> Self {
        let html = document.html();
        Self::from_html(&html, &document.url)
    }

    #[must_use]
    pub fn from_html(html: &Html, page_url: &str) -> Self {
        let title = extract_title(html).unwrap_or_else(|| UNKNOWN.to_string());
        let poster_url = poster_url(html, &title, page_url);

        Self {
            year: extract_year(html).unwrap_or_else(|| UNKNOWN.to_string()),
            rating: extract_rating(html).unwrap_or_else(|| NOT_RATED.to_string()),
            genres: extract_genres(html),
            director: first_match(html, DIRECTOR_RULES).unwrap_or_else(|| UNKNOWN.to_string()),
            actors: extract_actors(html),
            is_liked: html.select(&SELECTORS.liked_icon).next().is_some(),
            reviews: extract_reviews(html, page_url),
            poster_url,
            title,
        }
    }
}

pub(crate) fn extract_title(html: &Html) -> Option<String> {
    first_match(html, TITLE_RULES)
}

fn title_from_headline(html: &Html) -> Option<String> {
    html.select(&SELECTORS.headline_title)
        .next()
        .and_then(non_empty_text)
}

fn title_from_film_title(html: &Html) -> Option<String> {
    html.select(&SELECTORS.film_title)
        .next()
        .and_then(non_empty_text)
}

fn extract_year(html: &Html) -> Option<String> {
    html.select(&SELECTORS.year_link)
        .next()
        .and_then(non_empty_text)
}

fn extract_rating(html: &Html) -> Option<String> {
    html.select(&SELECTORS.rating_meta)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .and_then(|content| content.split_whitespace().next())
        .map(str::to_string)
}

fn extract_genres(html: &Html) -> Vec<String> {
    html.select(&SELECTORS.genre_link).map(element_text).collect()
}

fn director_from_contributor(html: &Html) -> Option<String> {
    let link = html.select(&SELECTORS.director_link).next()?;
    link.select(&SELECTORS.display_name)
        .next()
        .and_then(non_empty_text)
        .or_else(|| non_empty_text(link))
}

fn director_from_lockup(html: &Html) -> Option<String> {
    html.select(&SELECTORS.director_lockup)
        .next()
        .and_then(non_empty_text)
}

fn extract_actors(html: &Html) -> Vec<String> {
    let Some(cast) = html.select(&SELECTORS.cast_list).next() else {
        return Vec::new();
    };

    cast.select(&SELECTORS.cast_link)
        .take(MAX_ACTORS)
        .map(|link| {
            let name = element_text(link);
            match link.value().attr("data-original-title").and_then(character_name) {
                Some(character) => format!("{name} as {character}"),
                None => name,
            }
        })
        .collect()
}

/// Character name from a cast tooltip, without the uncredited marker
fn character_name(tooltip: &str) -> Option<String> {
    let character = tooltip.trim();
    let character = character
        .strip_suffix(UNCREDITED)
        .map_or(character, str::trim_end);

    (!character.is_empty()).then(|| character.to_string())
}
