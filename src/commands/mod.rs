//! Command handlers behind the CLI subcommands.
//!
//! `genres` and `genre` talk to the site through the injected [`App`];
//! `search`, `author` and `isbn` are placeholders that only echo their input.

pub mod author;
pub mod genre;
pub mod genres;
pub mod isbn;
pub mod search;

use crate::cache::Cache;
use crate::config::Config;
use crate::console::Console;
use crate::engine::{FetchOptions, Harvester};
use crate::scrapers::GoodreadsClient;
use anyhow::{Context, Result};

/// Everything a network-backed command needs, built once per run.
pub struct App {
    /// Site client.
    pub client: GoodreadsClient,
    /// Fetch engine with its cache.
    pub harvester: Harvester,
    /// Status output.
    pub console: Console,
    /// Items per pager page.
    pub page_size: usize,
}

impl App {
    /// Builds the context from a validated configuration.
    pub fn from_config(config: &Config, options: FetchOptions, console: Console) -> Result<Self> {
        let client =
            GoodreadsClient::new(config.http.clone()).context("Failed to create HTTP client")?;
        let cache_dir = config.cache_dir()?;
        let cache = Cache::new(cache_dir, config.cache.ttl_seconds);

        Ok(Self {
            client,
            harvester: Harvester::new(cache, options),
            console,
            page_size: config.pager.page_size,
        })
    }
}
