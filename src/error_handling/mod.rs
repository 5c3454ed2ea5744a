//! Error handling and load statistics.
//!
//! This module provides:
//! - Typed errors for configuration, fetching, merging, and detection
//! - Failure kinds and a per-run statistics tracker
//!
//! None of the component errors is fatal to a run: fetch failures roll the
//! page counter back, merge failures abandon one page, detection failures fall
//! back to the configured page count.

mod stats;
mod types;

// Re-export public API
pub use stats::LoadStats;
pub use types::{
    ConfigError, DetectionError, DocumentError, FailureKind, FetchError, InitializationError,
    MergeError,
};
