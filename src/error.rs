//! Error types for ocds-collect.
//!
//! The taxonomy mirrors how failures propagate through a collection run:
//! configuration problems abort before any network activity, fetch and
//! persistence problems terminate a single pagination lineage, and parse
//! problems are surfaced rather than silently swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ocds-collect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ocds-collect.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is missing or invalid.
    /// Fatal: the run refuses to start.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration issue.
        message: String,
        /// The configuration key that caused the error (e.g., "ingest.api_key").
        key: Option<String>,
    },

    /// No source is registered under the given id.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// Fetching a download target failed. Terminates one lineage only.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Persisted content (or continuation content) was not valid JSON.
    #[error("parse error in {path}: {source}")]
    Parse {
        /// The file that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing retrieved content to the content store failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// The destination path of the failed write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP client error outside the fetch path (delivery dispatch).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a keyed configuration error.
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Errors from the external fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed (connection, timeout, redirect loop).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The target URL.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The target URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}
