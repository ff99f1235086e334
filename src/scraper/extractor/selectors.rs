use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

pub static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);
pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("Invalid selector {css:?}: {e:?}"))
}

/// Pre-compiled CSS selectors for catalog pages
pub struct Selectors {
    // Detail page fields
    pub headline_title: Selector,
    pub film_title: Selector,
    pub year_link: Selector,
    pub rating_meta: Selector,
    pub genre_link: Selector,
    pub director_link: Selector,
    pub display_name: Selector,
    pub director_lockup: Selector,
    pub cast_list: Selector,
    pub cast_link: Selector,
    pub liked_icon: Selector,

    // Poster image, most reliable first
    pub json_ld: Selector,
    pub poster_img: Selector,
    pub poster_img_by_src: Selector,
    pub img_with_alt: Selector,

    // Review listings
    pub review_item: Selector,
    pub review_body: Selector,
    pub paragraph: Selector,
    pub review_rating: Selector,
    pub like_count: Selector,
    pub review_context: Selector,
    pub next_page: Selector,

    // List pages
    pub pagination_link: Selector,
    pub poster_target: Selector,
    pub film_poster_anchor: Selector,
    pub film_anchor: Selector,

    // Backdrops
    pub backdrop: Selector,
    pub backdrop_image: Selector,
}

impl Selectors {
    pub fn new() -> Self {
        Self {
            headline_title: selector("h1.headline-1"),
            film_title: selector("h1.film-title"),
            year_link: selector(r#"a[href^="/films/year/"]"#),
            rating_meta: selector(r#"meta[name="twitter:data2"]"#),
            genre_link: selector(r#"a[href^="/films/genre/"]"#),
            director_link: selector(r#"a.contributor[href*="/director/"]"#),
            display_name: selector(".prettify"),
            director_lockup: selector(".film-header-lockup .directors a"),
            cast_list: selector(".cast-list"),
            cast_link: selector("a.text-slug"),
            liked_icon: selector(".has-icon.icon-liked"),

            json_ld: selector(r#"script[type="application/ld+json"]"#),
            poster_img: selector(".film-poster img, .poster img, img.image"),
            poster_img_by_src: selector(
                r#"img[src*="ltrbxd.com/resized/sm/upload"], img[src*="ltrbxd.com/resized/alternative-poster"]"#,
            ),
            img_with_alt: selector("img[alt]"),

            review_item: selector("li.film-detail"),
            review_body: selector(".js-review-body"),
            paragraph: selector("p"),
            review_rating: selector(".rating"),
            like_count: selector(".like-count"),
            review_context: selector("a.context"),
            next_page: selector("a.next"),

            pagination_link: selector(".pagination li a"),
            poster_target: selector(".poster-container .film-poster[data-target-link]"),
            film_poster_anchor: selector(r#"div.film-poster a[href*="/film/"]"#),
            film_anchor: selector(r#"a[href*="/film/"]"#),

            backdrop: selector("div#backdrop"),
            backdrop_image: selector("div.backdropimage"),
        }
    }
}

/// Pre-compiled regex patterns
pub struct Patterns {
    /// First run of digits, e.g. in "1,204 likes"
    pub digits: Regex,
    /// `background-image: url(...)` inside a style attribute
    pub background_url: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").expect("Invalid digits regex"),
            background_url: Regex::new(r#"background-image:\s*url\(["']?(.*?)["']?\)"#)
                .expect("Invalid background_url regex"),
        }
    }
}
