//! Goodreader - Goodreads genre and book lookup.
//!
//! This library provides functionality for:
//! - Converting between genre slugs and display titles
//! - Fetching paginated listings with loop detection, deduplication and caching
//! - Fuzzy matching free text against the known genres
//! - Browsing long result lists in an interactive terminal pager

pub mod cache;
pub mod commands;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod pager;
pub mod scrapers;
pub mod utils;

// Re-export commonly used types
pub use cache::Cache;
pub use config::Config;
pub use console::Console;
pub use engine::{FetchOptions, Harvest, Harvester, StopReason};
pub use error::{CacheError, ConfigError, PaginatorError, ScraperError};
pub use matcher::{MatchCandidate, Resolution, resolve_genre};
pub use pager::{LineSource, Paginator};
pub use scrapers::{BookRecord, GoodreadsClient};
pub use utils::{slug_to_title, title_to_slug};
