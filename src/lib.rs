//! Crawl curated film lists into structured JSON with posters and reviews.

pub mod cli;
pub mod config;
pub mod logging;
pub mod scraper;
