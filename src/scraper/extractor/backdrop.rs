use super::Rule;
use super::selectors::{PATTERNS, SELECTORS};
use scraper::Html;

const BACKDROP_RULES: &[Rule<String>] =
    &[backdrop_attribute, backdrop_from_style, mobile_backdrop_attribute];

/// Backdrop image address of a film page
#[must_use]
pub fn backdrop_url(html: &Html) -> Option<String> {
    super::first_match(html, BACKDROP_RULES)
}

fn backdrop_attribute(html: &Html) -> Option<String> {
    backdrop_data(html, "data-backdrop")
}

fn mobile_backdrop_attribute(html: &Html) -> Option<String> {
    backdrop_data(html, "data-backdrop-mobile")
}

fn backdrop_data(html: &Html, attribute: &str) -> Option<String> {
    html.select(&SELECTORS.backdrop)
        .next()
        .and_then(|div| div.value().attr(attribute))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn backdrop_from_style(html: &Html) -> Option<String> {
    let style = html
        .select(&SELECTORS.backdrop_image)
        .next()?
        .value()
        .attr("style")?;

    PATTERNS
        .background_url
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|url| !url.is_empty())
}
