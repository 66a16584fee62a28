//! File-based JSON cache with a time-to-live.
//!
//! Each logical name maps to `<dir>/<name>.json`. The file's modification
//! time is the only expiry signal, so rewriting an entry renews it.

use crate::error::CacheError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Default TTL for genre and per-genre book lists.
pub const DEFAULT_TTL_SECONDS: u64 = 86400;

/// TTL cache storing one JSON file per logical name.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Creates a cache rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>, ttl_seconds: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Path of the file backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Returns true when `name` has no entry or its last write is older than
    /// the TTL at `now`.
    pub fn is_expired_at(&self, name: &str, now: SystemTime) -> bool {
        let modified = match std::fs::metadata(self.path_for(name)).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };

        // A modification time in the future counts as fresh.
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        age > self.ttl
    }

    /// Returns true when `name` is missing or stale right now.
    pub fn is_expired(&self, name: &str) -> bool {
        self.is_expired_at(name, SystemTime::now())
    }

    /// Reads the entry for `name`.
    ///
    /// Missing or expired entries are `Ok(None)`; unreadable or malformed
    /// files are reported as faults so the caller can decide what to do.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CacheError> {
        if self.is_expired(name) {
            return Ok(None);
        }

        let content = std::fs::read_to_string(self.path_for(name))?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Replaces the entry for `name` with `data`.
    pub fn set<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(data)?;
        std::fs::write(self.path_for(name), content)?;
        Ok(())
    }

    /// Deletes the entry for `name` if present.
    pub fn clear(&self, name: &str) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
