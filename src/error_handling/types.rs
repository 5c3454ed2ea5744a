//! Error type definitions.
//!
//! This module defines the typed errors of each component and the failure
//! kinds counted over a run.

use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `Config`.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error types for loading the start document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The local HTML file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document address is not a valid absolute URL.
    #[error("Invalid document URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A local file was given without `--base-url`.
    #[error("A local file needs --base-url so page links can be resolved")]
    MissingBaseUrl,
}

/// A page fetch that did not produce a body.
///
/// Every variant rolls the page counter back so the same page is retried on
/// the next trigger.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with something other than 200.
    #[error("HTTP {0}")]
    Status(u16),

    /// No complete response within the fetch timeout.
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Connection, TLS, or body transfer failure.
    #[error("network error: {0}")]
    Network(#[from] ReqwestError),

    /// The fetch task ended without a result (panic or cancellation).
    #[error("fetch aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// The user-facing notice text for this failure.
    pub fn notice_message(&self) -> String {
        match self {
            FetchError::Status(status) => format!("Failed to load: HTTP {status}"),
            FetchError::Timeout(_) => "Load timed out, check your network".to_string(),
            FetchError::Network(_) => "Network connection failed".to_string(),
            FetchError::Aborted(_) => "Error while loading".to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status(_) => FailureKind::HttpStatus,
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Network(_) => FailureKind::Network,
            FetchError::Aborted(_) => FailureKind::Aborted,
        }
    }
}

/// A fetched page that could not be merged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    /// No content container in the host document.
    #[error("content container not found in the current document")]
    LiveContainerMissing,

    /// No content container in the fetched document.
    #[error("content container not found in the fetched page")]
    FetchedContainerMissing,
}

/// Navigation detection that had to fall back to the configured page count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// None of the page-number selectors could be parsed.
    #[error("no usable page-number selector")]
    NoUsableSelectors,
}

/// Failure kinds counted over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    HttpStatus,
    Network,
    Timeout,
    Aborted,
    ContainerMissing,
    DetectionFallback,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::HttpStatus => "HTTP status error",
            FailureKind::Network => "Network error",
            FailureKind::Timeout => "Fetch timeout",
            FailureKind::Aborted => "Fetch aborted",
            FailureKind::ContainerMissing => "Content container missing",
            FailureKind::DetectionFallback => "Page count fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_notice_messages() {
        assert_eq!(
            FetchError::Status(404).notice_message(),
            "Failed to load: HTTP 404"
        );
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(30)).notice_message(),
            "Load timed out, check your network"
        );
        assert_eq!(
            FetchError::Aborted("panic".into()).notice_message(),
            "Error while loading"
        );
    }

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::Status(500).kind(), FailureKind::HttpStatus);
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(1)).kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            FetchError::Aborted(String::new()).kind(),
            FailureKind::Aborted
        );
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP 503");
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(30)).to_string(),
            "timed out after 30s"
        );
    }
}
