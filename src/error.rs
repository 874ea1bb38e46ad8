//! Error taxonomy shared by the extractor, the cache store and the fetchers
//!
//! None of these errors reach the end user. Every public entry point degrades
//! to "no data" and logs the cause instead.

use thiserror::Error;

/// Errors that can occur while fetching, extracting or persisting credit data
#[derive(Debug, Error)]
pub enum FetchError {
    /// A required field or span could not be located (upstream format drift)
    #[error("Required data not found: {0}")]
    NotFound(String),

    /// An assembled fragment or JSON document failed to parse
    #[error("Malformed structure: {0}")]
    Malformed(#[from] serde_json::Error),

    /// HTTP request failed or timed out
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The config file could not be written
    #[error("Config file error: {0}")]
    Persistence(#[from] std::io::Error),
}

impl FetchError {
    /// Builds a `Malformed` error from a plain message
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        FetchError::Malformed(<serde_json::Error as serde::de::Error>::custom(msg))
    }

    /// Whether the error belongs to the transport class (network, status, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Status(_))
    }
}
