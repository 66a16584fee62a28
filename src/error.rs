//! Error types for the goodreader application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Main error type for fetching and scraping operations.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed (network, DNS, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL uses a scheme other than http/https
    #[error("Invalid URL scheme '{0}'. Allowed schemes are: http, https")]
    UnsupportedScheme(String),

    /// No URL was given at all
    #[error("URL cannot be empty")]
    EmptyUrl,
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Cache directory not found
    #[error("Could not determine cache directory")]
    NoCacheDir,
}

/// Error type for cache reads and writes.
///
/// The fetch engine never propagates these: a failed read is a miss and a
/// failed write is dropped.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to read, write or stat the cache file
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file holds something other than the expected JSON
    #[error("Corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Error type for the interactive paginator.
#[derive(Error, Debug)]
pub enum PaginatorError {
    /// Page size must be at least one item
    #[error("page_size must be > 0")]
    InvalidPageSize,

    /// Writing to the output failed
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
