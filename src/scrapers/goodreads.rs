//! Goodreads (goodreads.com) scraper implementation.
//!
//! Walks the genre list and per-genre shelf listings.

use super::{
    BookRecord, DocumentQuery, ElementQuery, PageSource, create_http_client, rate_limit,
    tag_with_classes,
};
use crate::config::HttpConfig;
use crate::engine::Harvester;
use crate::error::ScraperError;
use crate::utils::{check_response_status, resolve_url, title_to_slug, validate_url};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Resource id of the genre list.
pub const GENRES_RESOURCE: &str = "genres";

/// Matches "avg rating 4.19".
static RATING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)avg rating\s+([0-9.]+)").unwrap());

/// Matches "9,421,443 ratings".
static RATINGS_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9][0-9,]*)\s+ratings").unwrap());

/// Matches "published 1997".
static PUBLISHED_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)published\s+(\d{4})").unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    /// One genre entry on the genre list.
    genre_block: Selector,
    /// Genre name link inside a genre entry.
    genre_link: Selector,
    /// One book entry on a shelf page.
    book_block: Selector,
    /// Title link inside a book entry.
    book_title: Selector,
    /// Author link inside a book entry.
    author_name: Selector,
    /// Cover image.
    image: Selector,
    /// Grey "avg rating ... ratings ... published" line.
    ratings_text: Selector,
    /// Next link marked with rel="next".
    next_rel: Selector,
    /// Next link by class.
    next_class: Selector,
    /// Next link inside the pagination container.
    next_in_pagination: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            genre_block: tag_with_classes("div", "shelfStat"),
            genre_link: tag_with_classes("a", "mediumText actionLinkLite"),
            book_block: tag_with_classes("div", "elementList"),
            book_title: tag_with_classes("a", "bookTitle"),
            author_name: tag_with_classes("a", "authorName"),
            image: Selector::parse("img").unwrap(),
            ratings_text: tag_with_classes("span", "greyText smallText"),
            next_rel: Selector::parse(r#"a[rel~="next"]"#).unwrap(),
            next_class: tag_with_classes("a", "next_page"),
            next_in_pagination: Selector::parse("div.pagination a.next_page").unwrap(),
        }
    }
}

/// Goodreads client. Owns the HTTP client and is passed to every command.
pub struct GoodreadsClient {
    client: reqwest::Client,
    config: HttpConfig,
    selectors: Selectors,
}

impl GoodreadsClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self, ScraperError> {
        let client = create_http_client(&config)?;

        Ok(Self {
            client,
            config,
            selectors: Selectors::new(),
        })
    }

    /// Site root URLs are built from.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// URL of page `page` of the genre list.
    pub fn genres_url(&self, page: u32) -> String {
        format!("{}/genres/list?page={}", self.base_url(), page)
    }

    /// URL of page `page` of the shelf for `slug`.
    pub fn shelf_url(&self, slug: &str, page: u32) -> String {
        format!("{}/shelf/show/{}?page={}", self.base_url(), slug, page)
    }

    /// GETs `url` and returns the body text.
    ///
    /// The URL is validated before anything is sent.
    pub async fn get_request(&self, url: &str) -> Result<String, ScraperError> {
        let url = validate_url(url)?;
        rate_limit(self.config.delay_between_requests_sec).await;

        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = check_response_status(response)?;
        Ok(response.text().await?)
    }

    /// Fetches a page and returns the HTML document.
    async fn fetch_document(&self, url: &str) -> Result<Html, ScraperError> {
        let text = self.get_request(url).await?;
        Ok(Html::parse_document(&text))
    }

    /// Fetches every genre slug.
    pub async fn genres(&self, harvester: &Harvester) -> Result<Vec<String>, ScraperError> {
        harvester.fetch_all(&GenrePages(self), GENRES_RESOURCE).await
    }

    /// Fetches every book on the shelf for `genre`.
    pub async fn books_for_genre(
        &self,
        harvester: &Harvester,
        genre: &str,
    ) -> Result<Vec<BookRecord>, ScraperError> {
        harvester.fetch_all(&ShelfPages(self), genre).await
    }

    /// Extracts genre slugs from a genre list page.
    ///
    /// Names containing anything outside printable ASCII are dropped; the
    /// site lists some whose URLs do not resolve.
    pub fn extract_genres(&self, doc: &Html) -> Vec<String> {
        doc.find_all(&self.selectors.genre_block)
            .into_iter()
            .filter_map(|block| block.find_first(&self.selectors.genre_link).map(|a| a.text_content()))
            .filter(|name| name.chars().all(|c| (' '..='~').contains(&c)))
            .map(|name| title_to_slug(&name))
            .filter(|slug| !slug.is_empty())
            .collect()
    }

    /// Extracts books from a shelf page. Missing fields keep zero values.
    pub fn extract_books(&self, doc: &Html) -> Vec<BookRecord> {
        doc.find_all(&self.selectors.book_block)
            .into_iter()
            .map(|block| {
                let mut book = BookRecord::default();

                if let Some(link) = block.find_first(&self.selectors.book_title) {
                    book.title = link.text_content();
                    book.url = link
                        .attribute("href")
                        .map(|href| resolve_url(self.base_url(), href.trim()))
                        .unwrap_or_default();
                }

                if let Some(author) = block.find_first(&self.selectors.author_name) {
                    book.author = author.text_content();
                }

                if let Some(src) = block
                    .find_first(&self.selectors.image)
                    .and_then(|img| img.attribute("src"))
                {
                    book.cover_url = src.trim().to_string();
                }

                if let Some(grey) = block.find_first(&self.selectors.ratings_text) {
                    let stats = parse_ratings_text(&grey.text_content());
                    book.avg_rating = stats.avg_rating;
                    book.rating_count = stats.rating_count;
                    book.published_year = stats.published_year;
                }

                book
            })
            .collect()
    }

    /// Checks whether the page links to a usable next page.
    pub fn has_next_page(&self, doc: &Html) -> bool {
        let link = doc
            .find_first(&self.selectors.next_rel)
            .or_else(|| doc.find_first(&self.selectors.next_class))
            .or_else(|| doc.find_first(&self.selectors.next_in_pagination));

        let Some(link) = link else {
            return false;
        };

        if link.has_class("disabled") || link.attribute("aria-disabled") == Some("true") {
            return false;
        }

        if let Some(parent) = link.parent_element()
            && parent.has_class("next_page")
            && parent.has_class("disabled")
        {
            return false;
        }

        true
    }
}

/// Numbers parsed from a book's grey stats line.
#[derive(Debug, Default, PartialEq)]
struct RatingStats {
    avg_rating: f64,
    rating_count: u64,
    published_year: i32,
}

fn first_capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_ratings_text(text: &str) -> RatingStats {
    RatingStats {
        avg_rating: first_capture(&RATING_REGEX, text)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0),
        rating_count: first_capture(&RATINGS_COUNT_REGEX, text)
            .and_then(|s| s.replace(',', "").parse().ok())
            .unwrap_or(0),
        published_year: first_capture(&PUBLISHED_YEAR_REGEX, text)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}

/// The genre list as a page source.
pub struct GenrePages<'a>(pub &'a GoodreadsClient);

#[async_trait(?Send)]
impl PageSource for GenrePages<'_> {
    type Page = Html;
    type Record = String;

    fn cache_key(&self, _resource_id: &str) -> String {
        GENRES_RESOURCE.to_string()
    }

    async fn fetch_page(&self, _resource_id: &str, page: u32) -> Result<Html, ScraperError> {
        self.0.fetch_document(&self.0.genres_url(page)).await
    }

    fn extract(&self, page: &Html) -> Vec<String> {
        self.0.extract_genres(page)
    }

    fn has_next_page(&self, page: &Html) -> bool {
        self.0.has_next_page(page)
    }
}

/// One genre's shelf as a page source. The resource id is the genre slug.
pub struct ShelfPages<'a>(pub &'a GoodreadsClient);

#[async_trait(?Send)]
impl PageSource for ShelfPages<'_> {
    type Page = Html;
    type Record = BookRecord;

    fn cache_key(&self, resource_id: &str) -> String {
        format!("shelf-{}", title_to_slug(resource_id))
    }

    async fn fetch_page(&self, resource_id: &str, page: u32) -> Result<Html, ScraperError> {
        let slug = title_to_slug(resource_id);
        self.0.fetch_document(&self.0.shelf_url(&slug, page)).await
    }

    fn extract(&self, page: &Html) -> Vec<BookRecord> {
        self.0.extract_books(page)
    }

    fn has_next_page(&self, page: &Html) -> bool {
        self.0.has_next_page(page)
    }
}
