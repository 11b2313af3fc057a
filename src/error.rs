//! Error types for chapter-dl
//!
//! This module provides error handling for the library, including:
//! - The crate-level [`Error`] type with context information
//! - The [`FetchError`] taxonomy for per-request failures (timeout,
//!   connection, HTTP status, other)
//!
//! Per-task fetch failures are never fatal: workers capture a [`FetchError`]
//! into the task's outcome record instead of propagating it.

use thiserror::Error;

/// Result type alias for chapter-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chapter-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "crawl.max_workers")
        key: Option<String>,
    },

    /// Invalid CSS selector in the extraction or harvest profile
    #[error("invalid selector '{selector}': {reason}")]
    Selector {
        /// The selector string that failed to parse
        selector: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Invalid regular expression pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Could not resolve a collision-free destination path
    #[error("could not resolve destination for '{title}': {reason}")]
    Naming {
        /// The chapter title being resolved
        title: String,
        /// Why resolution failed
        reason: String,
    },

    /// Network error (client construction, transport)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Per-request fetch failures
///
/// The worker maps each variant's message into the failed task's diagnostic,
/// so the rendered text is part of the interface: operators grep summaries for
/// "timed out" and status codes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the remote host
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with a non-success status code
    #[error("request failed with status {0}")]
    Status(u16),

    /// Anything else (protocol error, decode failure, ...)
    #[error("unknown error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Other(err.to_string())
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_messages_carry_the_taxonomy() {
        assert!(FetchError::Timeout.to_string().contains("timed out"));
        assert!(FetchError::Status(404).to_string().contains("404"));
        assert!(
            FetchError::Connection("refused".into())
                .to_string()
                .contains("connection")
        );
    }

    #[test]
    fn config_error_renders_message() {
        let err = Error::Config {
            message: "max_workers must be between 1 and 20".into(),
            key: Some("crawl.max_workers".into()),
        };
        assert!(err.to_string().contains("max_workers"));
    }
}
