//! Configuration management for goodreader.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "goodreader";

/// Directory name under the platform cache dir.
const CACHE_DIR_NAME: &str = "goodreads";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings.
    pub http: HttpConfig,

    /// On-disk cache settings.
    pub cache: CacheConfig,

    /// Multi-page fetch settings.
    pub fetch: FetchConfig,

    /// Interactive pager settings.
    pub pager: PagerConfig,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Site root every page URL is built from.
    pub base_url: String,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_sec: u64,

    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.goodreads.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_sec: 30,
            delay_between_requests_sec: 0.5,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Read and write cached genre/book lists.
    pub enabled: bool,

    /// Maximum age of a cache file, measured from its last write.
    pub ttl_seconds: u64,

    /// Directory holding the cache files.
    /// Defaults to `<cache dir>/goodreads`.
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 86400,
            directory: None,
        }
    }
}

/// Multi-page fetch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Stop after this many pages. Unlimited when unset.
    pub max_pages: Option<u32>,
}

/// Pager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Items shown per page.
    pub page_size: usize,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.http.base_url.trim();
        if base_url.is_empty() {
            return Err(invalid("http.base_url", "must not be empty"));
        }

        match url::Url::parse(base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(invalid(
                    "http.base_url",
                    &format!("scheme '{}' is not http or https", parsed.scheme()),
                ));
            }
            Err(e) => return Err(invalid("http.base_url", &e.to_string())),
        }

        if self.http.timeout_sec == 0 {
            return Err(invalid("http.timeout_sec", "must be greater than 0"));
        }

        if self.http.delay_between_requests_sec < 0.0 {
            return Err(invalid("http.delay_between_requests_sec", "must not be negative"));
        }

        if self.fetch.max_pages == Some(0) {
            return Err(invalid("fetch.max_pages", "must be greater than 0"));
        }

        if self.pager.page_size == 0 {
            return Err(invalid("pager.page_size", "must be greater than 0"));
        }

        Ok(())
    }

    /// Returns the effective cache directory, using config or default.
    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.cache.directory {
            Ok(dir.clone())
        } else {
            dirs::cache_dir()
                .map(|p| p.join(CACHE_DIR_NAME))
                .ok_or(ConfigError::NoCacheDir)
        }
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.base_url, "https://www.goodreads.com");
        assert_eq!(config.cache.ttl_seconds, 86400);
        assert!(config.cache.enabled);
        assert_eq!(config.fetch.max_pages, None);
        assert_eq!(config.pager.page_size, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.fetch.max_pages = Some(5);
        config.pager.page_size = 15;
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.fetch.max_pages, Some(5));
        assert_eq!(loaded.pager.page_size, 15);
        assert_eq!(loaded.http.base_url, config.http.base_url);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.pager.page_size, 20);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pager]\npage_size = 7\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pager.page_size, 7);
        assert_eq!(config.cache.ttl_seconds, 86400);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.pager.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.base_url = "ftp://www.goodreads.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.base_url = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetch.max_pages = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.timeout_sec = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_dir_override() {
        let mut config = Config::default();
        config.cache.directory = Some(PathBuf::from("/tmp/goodreader-cache"));
        assert_eq!(
            config.cache_dir().unwrap(),
            PathBuf::from("/tmp/goodreader-cache")
        );
    }
}
