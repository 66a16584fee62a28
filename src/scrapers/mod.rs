//! Page source trait and common types for the site scraper.
//!
//! This module defines the interface the fetch engine drives, the small
//! document query capability extraction code is written against, and the
//! record types pulled out of listing pages.

mod goodreads;

pub use goodreads::{GENRES_RESOURCE, GenrePages, GoodreadsClient, ShelfPages};

use crate::config::HttpConfig;
use crate::engine::Keyed;
use crate::error::ScraperError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A single book scraped from a shelf page.
///
/// Fields that could not be found keep their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookRecord {
    /// Book title.
    pub title: String,

    /// Primary author name.
    pub author: String,

    /// Cover image URL.
    pub cover_url: String,

    /// Average rating, 0.0 when unknown.
    pub avg_rating: f64,

    /// Number of ratings, 0 when unknown.
    pub rating_count: u64,

    /// Year of first publication, 0 when unknown.
    pub published_year: i32,

    /// Absolute URL of the book page, possibly empty.
    pub url: String,
}

impl Keyed for BookRecord {
    type Key = (String, String, i32);

    fn identity_key(&self) -> Self::Key {
        (
            self.title.to_lowercase(),
            self.author.to_lowercase(),
            self.published_year,
        )
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.author.is_empty() {
            write!(f, " by {}", self.author)?;
        }
        if self.published_year != 0 {
            write!(f, " ({})", self.published_year)?;
        }
        write!(
            f,
            " - {:.2} avg, {} ratings",
            self.avg_rating, self.rating_count
        )
    }
}

/// Query capability over a parsed document or one of its elements.
pub trait DocumentQuery {
    /// All descendants matching `selector`, in document order.
    fn find_all(&self, selector: &Selector) -> Vec<ElementRef<'_>>;

    /// First descendant matching `selector`.
    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'_>>;
}

impl DocumentQuery for Html {
    fn find_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.select(selector).collect()
    }

    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.select(selector).next()
    }
}

impl DocumentQuery for ElementRef<'_> {
    fn find_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.select(selector).collect()
    }

    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.select(selector).next()
    }
}

/// Attribute, text and class access on a single element.
pub trait ElementQuery<'a> {
    /// Raw value of attribute `name`.
    fn attribute(&self, name: &str) -> Option<&'a str>;

    /// Concatenated, trimmed text of the element and its descendants.
    fn text_content(&self) -> String;

    /// True if the `class` attribute contains `class` as a token.
    fn has_class(&self, class: &str) -> bool;

    /// Nearest enclosing element.
    fn parent_element(&self) -> Option<ElementRef<'a>>;
}

impl<'a> ElementQuery<'a> for ElementRef<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        self.text().collect::<String>().trim().to_string()
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn parent_element(&self) -> Option<ElementRef<'a>> {
        self.parent().and_then(ElementRef::wrap)
    }
}

/// Builds a selector matching `tag` elements carrying every class in
/// `classes` (whitespace separated).
///
/// Only used with selectors written in this crate.
pub fn tag_with_classes(tag: &str, classes: &str) -> Selector {
    let mut css = tag.to_string();
    for class in classes.split_whitespace() {
        css.push('.');
        css.push_str(class);
    }
    Selector::parse(&css).unwrap()
}

/// A paginated listing the fetch engine can walk page by page.
///
/// `fetch_page` is the only method that touches the network; extraction and
/// next-page detection work on the already fetched page.
#[async_trait(?Send)]
pub trait PageSource {
    /// A fetched page.
    type Page;

    /// Records extracted from a page.
    type Record: Keyed + Serialize + DeserializeOwned;

    /// Deterministic cache name for `resource_id`.
    fn cache_key(&self, resource_id: &str) -> String;

    /// Fetches page `page` (1-based) of `resource_id`.
    async fn fetch_page(&self, resource_id: &str, page: u32) -> Result<Self::Page, ScraperError>;

    /// Extracts the records on a page, in page order.
    fn extract(&self, page: &Self::Page) -> Vec<Self::Record>;

    /// True if the page links to a usable next page.
    fn has_next_page(&self, page: &Self::Page) -> bool;
}

/// Common HTTP client configuration for scrapers.
pub fn create_http_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_sec))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, year: i32, cover: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            author: author.to_string(),
            cover_url: cover.to_string(),
            published_year: year,
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_key_ignores_cover_and_case() {
        let a = book("Dune", "Frank Herbert", 1965, "https://img/a.jpg");
        let b = book("DUNE", "frank herbert", 1965, "https://img/b.jpg");
        assert_eq!(a.identity_key(), b.identity_key());

        let c = book("Dune", "Frank Herbert", 1984, "https://img/a.jpg");
        assert_ne!(a.identity_key(), c.identity_key());
    }

    #[test]
    fn test_book_display() {
        let mut b = book("Dune", "Frank Herbert", 1965, "");
        b.avg_rating = 4.27;
        b.rating_count = 1_500_000;
        assert_eq!(
            b.to_string(),
            "Dune by Frank Herbert (1965) - 4.27 avg, 1500000 ratings"
        );

        let unknown = book("Untitled", "", 0, "");
        assert_eq!(unknown.to_string(), "Untitled - 0.00 avg, 0 ratings");
    }

    #[test]
    fn test_document_query() {
        let doc = Html::parse_document(
            r#"<div class="outer"><p class="a b" data-x="1"> Hello <b>world</b> </p><p class="a">Second</p></div>"#,
        );
        let para = tag_with_classes("p", "a");
        assert_eq!(doc.find_all(&para).len(), 2);

        let first = doc.find_first(&tag_with_classes("p", "a b")).unwrap();
        assert_eq!(first.text_content(), "Hello world");
        assert_eq!(first.attribute("data-x"), Some("1"));
        assert!(first.has_class("b"));
        assert!(!first.has_class("c"));

        let parent = first.parent_element().unwrap();
        assert!(parent.has_class("outer"));
        assert_eq!(parent.find_all(&para).len(), 2);
    }
}
