//! Config store for persisting cache entries and settings to one JSON file
//!
//! Provides a `ConfigStore` that merges partial updates into the file and
//! timestamps cache entries so callers can decide whether to refetch.

use chrono::Utc;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::FetchError;
use crate::extract::Record;

/// Time-to-live for cache entries in seconds
pub const CACHE_TTL_SECS: f64 = 30.0;

/// Current time as fractional epoch seconds
pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// A cached record as stored under `<key>_cache`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached record
    pub data: Record,
    /// When the record was fetched, in epoch seconds
    #[serde(default)]
    pub timestamp: f64,
}

impl CacheEntry {
    /// Whether the entry is still within its TTL at `now`
    pub fn is_fresh_at(&self, now: f64) -> bool {
        now - self.timestamp < CACHE_TTL_SECS
    }
}

/// Reads and writes the shared config file
///
/// The file lives in the XDG config directory (`~/.config/creditline/config.json`
/// on Linux). A missing or unparsable file reads as an empty map; it is only
/// created on the first write.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Path to the JSON file
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a ConfigStore at the XDG-compliant default location
    ///
    /// Returns `None` if the config directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "creditline")?;
        Some(Self::with_path(project_dirs.config_dir().join("config.json")))
    }

    /// Creates a ConfigStore backed by a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the name of the config field holding the cache entry for `key`
    pub fn cache_field(key: &str) -> String {
        format!("{}_cache", key)
    }

    /// Reads the whole config
    ///
    /// Missing, corrupt or non-object files all read as an empty map.
    pub fn load(&self) -> Record {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Record::new();
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                debug!(path = %self.path.display(), "config file unreadable, treating as empty");
                Record::new()
            }
        }
    }

    /// Merges `updates` into the latest config on disk and writes it back
    ///
    /// Fields not named in `updates` are preserved as they were on disk at the
    /// time of this call.
    pub fn update(&self, updates: Record) -> Result<(), FetchError> {
        let mut config = self.load();
        config.extend(updates);
        self.write_all(&config)
    }

    /// Sets a single field, preserving all others
    pub fn set_field(&self, key: &str, value: Value) -> Result<(), FetchError> {
        let mut updates = Record::new();
        updates.insert(key.to_string(), value);
        self.update(updates)
    }

    /// Returns a single field, if present
    pub fn get_field(&self, key: &str) -> Option<Value> {
        self.load().remove(key)
    }

    /// Removes a single field, preserving all others
    pub fn delete_field(&self, key: &str) -> Result<(), FetchError> {
        let mut config = self.load();
        if config.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&config)
    }

    /// Reads the cache entry for `key`, ignoring entries that do not parse
    pub fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let raw = self.get_field(&Self::cache_field(key))?;
        serde_json::from_value(raw).ok()
    }

    /// Stores `data` as the cache entry for `key`
    pub fn write_entry(&self, key: &str, data: Record, timestamp: f64) -> Result<(), FetchError> {
        let entry = CacheEntry { data, timestamp };
        let value = serde_json::to_value(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.set_field(&Self::cache_field(key), value)
    }

    /// Ensures the parent directory exists and writes the full config
    fn write_all(&self, config: &Record) -> Result<(), FetchError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&self.path, json)?;
        Ok(())
    }
}
