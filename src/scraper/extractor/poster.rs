use super::resolve_url;
use super::selectors::SELECTORS;
use scraper::{ElementRef, Html};
use serde_json::Value;
use tracing::debug;

/// One way of locating the poster `<img>` element
type ImageRule = for<'a> fn(&'a Html, &str) -> Option<ElementRef<'a>>;

const IMAGE_RULES: &[ImageRule] = &[image_by_class, image_by_source, image_by_alt_text];

/// Poster address for a detail page.
///
/// The linked-data block is preferred; the `<img>` rules are only
/// consulted when it is missing or malformed.
#[must_use]
pub fn poster_url(html: &Html, title: &str, page_url: &str) -> Option<String> {
    poster_from_linked_data(html)
        .or_else(|| poster_from_image(html, title))
        .map(|url| resolve_url(page_url, &url))
}

fn poster_from_linked_data(html: &Html) -> Option<String> {
    let script = html.select(&SELECTORS.json_ld).next()?;
    let raw: String = script.text().collect();

    match serde_json::from_str::<Value>(strip_comment_wrapper(&raw)) {
        Ok(data) => image_field(&data),
        Err(e) => {
            debug!("Malformed linked data block, falling back to HTML: {}", e);
            None
        }
    }
}

/// Remove the `/* <![CDATA[ */ ... /* ]]> */` wrapper around the JSON body
fn strip_comment_wrapper(raw: &str) -> &str {
    if raw.contains("/*")
        && let Some((_, rest)) = raw.split_once("*/")
    {
        let body = rest.split_once("/* ]]>").map_or(rest, |(body, _)| body);
        return body.trim();
    }
    raw.trim()
}

fn image_field(data: &Value) -> Option<String> {
    match data.get("image")? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str()).map(str::to_string),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn poster_from_image(html: &Html, title: &str) -> Option<String> {
    let Some(img) = IMAGE_RULES.iter().find_map(|rule| rule(html, title)) else {
        debug!("No poster image element found for {}", title);
        return None;
    };

    let src = img.value().attr("src").filter(|s| !s.is_empty());
    img.value()
        .attr("srcset")
        .and_then(double_density_candidate)
        .or_else(|| src.map(str::to_string))
}

fn image_by_class<'a>(html: &'a Html, _title: &str) -> Option<ElementRef<'a>> {
    html.select(&SELECTORS.poster_img).next()
}

fn image_by_source<'a>(html: &'a Html, _title: &str) -> Option<ElementRef<'a>> {
    html.select(&SELECTORS.poster_img_by_src).next()
}

fn image_by_alt_text<'a>(html: &'a Html, title: &str) -> Option<ElementRef<'a>> {
    let needle = title.to_lowercase();
    if needle.is_empty() {
        return None;
    }

    html.select(&SELECTORS.img_with_alt).find(|img| {
        img.value()
            .attr("alt")
            .is_some_and(|alt| alt.to_lowercase().contains(&needle))
    })
}

/// The `2x` entry of a `srcset`, accepting comma or space separators
fn double_density_candidate(srcset: &str) -> Option<String> {
    let parts: Vec<&str> = srcset
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();

    parts
        .windows(2)
        .find(|pair| pair[1].contains("2x") && !pair[0].ends_with("2x"))
        .map(|pair| pair[0].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://letterboxd.com/film/alien/";

    fn poster(body: &str, title: &str) -> Option<String> {
        poster_url(&Html::parse_document(body), title, PAGE)
    }

    #[test]
    fn test_linked_data_with_cdata_wrapper() {
        let body = r#"<script type="application/ld+json">
            /* <![CDATA[ */
            {"@type":"Movie","name":"Alien","image":"https://a.ltrbxd.com/resized/film-poster/alien.jpg"}
            /* ]]> */
        </script>
        <div class="film-poster"><img src="https://example.com/ignored.jpg"></div>"#;

        assert_eq!(
            poster(body, "Alien").as_deref(),
            Some("https://a.ltrbxd.com/resized/film-poster/alien.jpg")
        );
    }

    #[test]
    fn test_malformed_linked_data_falls_through() {
        let body = r#"<script type="application/ld+json">{"image": </script>
        <div class="film-poster"><img src="/img/alien.jpg"></div>"#;

        assert_eq!(
            poster(body, "Alien").as_deref(),
            Some("https://letterboxd.com/img/alien.jpg")
        );
    }

    #[test]
    fn test_prefers_double_density_srcset() {
        let body = r#"<div class="poster"><img src="https://a.ltrbxd.com/small.jpg"
            srcset="https://a.ltrbxd.com/small.jpg 1x, https://a.ltrbxd.com/large.jpg 2x"></div>"#;

        assert_eq!(
            poster(body, "Alien").as_deref(),
            Some("https://a.ltrbxd.com/large.jpg")
        );
    }

    #[test]
    fn test_source_pattern_rule() {
        let body = r#"<img src="https://example.com/logo.png">
            <img src="https://a.ltrbxd.com/resized/sm/upload/ab/cd/alien.jpg">"#;

        assert_eq!(
            poster(body, "Alien").as_deref(),
            Some("https://a.ltrbxd.com/resized/sm/upload/ab/cd/alien.jpg")
        );
    }

    #[test]
    fn test_alt_text_rule_is_case_insensitive() {
        let body = r#"<img alt="Logo" src="https://example.com/logo.png">
            <img alt="Poster for ALIEN (1979)" src="https://example.com/alien.jpg">"#;

        assert_eq!(
            poster(body, "Alien").as_deref(),
            Some("https://example.com/alien.jpg")
        );
    }

    #[test]
    fn test_no_poster() {
        assert!(poster("<p>no images</p>", "Alien").is_none());
    }

    #[test]
    fn test_double_density_candidate() {
        assert_eq!(
            double_density_candidate("a.jpg 1x,b.jpg 2x").as_deref(),
            Some("b.jpg")
        );
        assert!(double_density_candidate("a.jpg 1x").is_none());
    }
}
