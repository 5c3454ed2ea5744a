//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timings, markers, default selectors)
//! - The library `Config` and its JSON loading/validation
//! - CLI option parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
