//! Paginated fetch-and-extract engine.
//!
//! Walks a [`PageSource`] one page at a time, accumulating unique records
//! until the listing runs out, starts repeating itself, or hits the page cap.
//! Results of complete runs are written to the [`Cache`].

use crate::cache::Cache;
use crate::error::ScraperError;
use crate::scrapers::PageSource;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use tracing::{debug, info, warn};

/// A record with an identity used for de-duplication across pages.
pub trait Keyed {
    /// Identity key type.
    type Key: Eq + Hash;

    /// Records with equal keys are the same record.
    fn identity_key(&self) -> Self::Key;
}

impl Keyed for String {
    type Key = String;

    fn identity_key(&self) -> String {
        self.to_lowercase()
    }
}

/// Why a fetch run stopped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Served from cache without touching the network.
    CacheHit,
    /// A page yielded no records.
    EmptyPage,
    /// A page had exactly the same records as an earlier one.
    RepeatedPage,
    /// Every record on a page had already been seen.
    NoNewRecords,
    /// The page had no usable next-page link.
    LastPage,
    /// The configured page cap was reached.
    PageCap,
}

impl StopReason {
    /// True if the run saw the whole listing, so the result may be cached.
    pub fn is_complete(self) -> bool {
        !matches!(self, StopReason::PageCap | StopReason::CacheHit)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::CacheHit => "cache hit",
            StopReason::EmptyPage => "empty page",
            StopReason::RepeatedPage => "repeated page",
            StopReason::NoNewRecords => "no new records",
            StopReason::LastPage => "last page",
            StopReason::PageCap => "page cap reached",
        };
        f.write_str(text)
    }
}

/// Per-run fetch settings.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Read from and write to the cache.
    pub use_cache: bool,
    /// Stop after this many pages.
    pub max_pages: Option<u32>,
    /// Instrumented run: results are never written to the cache.
    pub debug: bool,
}

/// Outcome of one fetch run.
#[derive(Debug, Clone)]
pub struct Harvest<R> {
    /// Unique records in first-seen order.
    pub records: Vec<R>,
    /// Why the run ended.
    pub stop: StopReason,
    /// Pages fetched from the network.
    pub pages_fetched: u32,
}

impl<R> Harvest<R> {
    /// True if the records came from the cache.
    pub fn from_cache(&self) -> bool {
        self.stop == StopReason::CacheHit
    }
}

/// Drives page sources and manages their cache entries.
#[derive(Debug, Clone)]
pub struct Harvester {
    cache: Cache,
    options: FetchOptions,
}

impl Harvester {
    /// Creates a harvester backed by `cache`.
    pub fn new(cache: Cache, options: FetchOptions) -> Self {
        Self { cache, options }
    }

    /// Fetches every record of `resource_id`, returning them in order.
    pub async fn fetch_all<S: PageSource>(
        &self,
        source: &S,
        resource_id: &str,
    ) -> Result<Vec<S::Record>, ScraperError> {
        Ok(self.harvest(source, resource_id).await?.records)
    }

    /// Like [`Harvester::fetch_all`] but also reports how the run ended.
    ///
    /// A fetch error aborts the run: nothing is returned and nothing is
    /// cached.
    pub async fn harvest<S: PageSource>(
        &self,
        source: &S,
        resource_id: &str,
    ) -> Result<Harvest<S::Record>, ScraperError> {
        let cache_key = source.cache_key(resource_id);

        if self.options.use_cache {
            if let Some(records) = self.read_cache::<S::Record>(&cache_key) {
                debug!(key = %cache_key, count = records.len(), "cache hit");
                return Ok(Harvest {
                    records,
                    stop: StopReason::CacheHit,
                    pages_fetched: 0,
                });
            }
            debug!(key = %cache_key, "cache miss");
        }

        let mut records = Vec::new();
        let mut seen_keys = HashSet::new();
        let mut seen_pages = HashSet::new();
        let mut page: u32 = 1;

        let stop = loop {
            debug!(resource = resource_id, page, "fetching page");
            let doc = source.fetch_page(resource_id, page).await?;
            let page_records = source.extract(&doc);

            if page_records.is_empty() {
                break StopReason::EmptyPage;
            }

            let signature: Vec<_> = page_records.iter().map(Keyed::identity_key).collect();
            if !seen_pages.insert(signature) {
                warn!(resource = resource_id, page, "page repeats an earlier page, stopping");
                break StopReason::RepeatedPage;
            }

            let mut added = 0usize;
            for record in page_records {
                if seen_keys.insert(record.identity_key()) {
                    records.push(record);
                    added += 1;
                }
            }

            if added == 0 {
                warn!(resource = resource_id, page, "no new records on page, stopping");
                break StopReason::NoNewRecords;
            }

            if !source.has_next_page(&doc) {
                break StopReason::LastPage;
            }

            if let Some(max) = self.options.max_pages
                && page >= max
            {
                warn!(resource = resource_id, max_pages = max, "page cap reached, results may be incomplete");
                break StopReason::PageCap;
            }

            page += 1;
        };

        info!(
            resource = resource_id,
            count = records.len(),
            pages = page,
            reason = %stop,
            "fetch finished"
        );

        if self.should_cache(stop, records.is_empty()) {
            if let Err(e) = self.cache.set(&cache_key, &records) {
                debug!(key = %cache_key, error = %e, "cache write failed");
            }
        }

        Ok(Harvest {
            records,
            stop,
            pages_fetched: page,
        })
    }

    fn should_cache(&self, stop: StopReason, empty: bool) -> bool {
        self.options.use_cache && !self.options.debug && stop.is_complete() && !empty
    }

    fn read_cache<R: serde::de::DeserializeOwned>(&self, key: &str) -> Option<Vec<R>> {
        match self.cache.get(key) {
            Ok(records) => records,
            Err(e) => {
                debug!(key, error = %e, "unreadable cache entry treated as miss");
                None
            }
        }
    }
}
