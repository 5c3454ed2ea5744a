//! Configuration types.
//!
//! `Config` is the library configuration: it can be built programmatically,
//! deserialized from a JSON file, or assembled from CLI flags (see `cli.rs`).

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::constants::*;
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Loader configuration.
///
/// Every selector field is an ordered candidate list: the first candidate that
/// matches anything wins.
///
/// # Examples
///
/// ```
/// use autopager::Config;
///
/// let config = Config {
///     max_page_number: 20,
///     continuous_loading: false,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback "next page" links, used when the page map has no entry.
    pub next_page_selectors: Vec<String>,

    /// The navigation block holding the numbered page links.
    pub navigation_selectors: Vec<String>,

    /// Numbered page links, searched within the navigation block.
    pub page_number_selectors: Vec<String>,

    /// Class marking the link of the page being viewed.
    pub current_page_class: String,

    /// The content container, on the host page and on every fetched page.
    pub content_selectors: Vec<String>,

    /// Images whose deferred source should be activated.
    pub image_selectors: Vec<String>,

    /// Attributes holding a deferred image source, in priority order.
    pub deferred_source_attributes: Vec<String>,

    /// Top-level children with any of these classes are skipped by the fallback merge.
    pub excluded_classes: Vec<String>,

    /// Top-level children containing a match for any of these are skipped by the fallback merge.
    pub excluded_descendant_selectors: Vec<String>,

    /// Scrolled fraction (0.0-1.0) at which the next page is fetched.
    pub scroll_threshold_percent: f64,

    /// Proximity timer period in milliseconds.
    pub check_interval_ms: u64,

    /// Delay before the chained check that follows a merge, in milliseconds.
    pub load_delay_ms: u64,

    /// Per-fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Total page count used when detection is disabled or fails.
    pub max_page_number: u32,

    /// Chain fetches after a merge instead of waiting for the next tick.
    pub continuous_loading: bool,

    /// Read the total page count from the navigation block.
    pub auto_detect_total_pages: bool,

    /// Undo the page increment when a fetched page has no content container.
    pub rollback_on_merge_failure: bool,

    /// Inline style of the separator inserted before each merged page.
    pub separator_style: String,

    /// HTTP User-Agent header value.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            next_page_selectors: default_next_page_selectors(),
            navigation_selectors: default_navigation_selectors(),
            page_number_selectors: default_page_number_selectors(),
            current_page_class: "current".to_string(),
            content_selectors: default_content_selectors(),
            image_selectors: default_image_selectors(),
            deferred_source_attributes: default_deferred_source_attributes(),
            excluded_classes: default_excluded_classes(),
            excluded_descendant_selectors: default_excluded_descendant_selectors(),
            scroll_threshold_percent: DEFAULT_SCROLL_THRESHOLD,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            load_delay_ms: DEFAULT_LOAD_DELAY_MS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_page_number: DEFAULT_MAX_PAGE_NUMBER,
            continuous_loading: true,
            auto_detect_total_pages: true,
            rollback_on_merge_failure: false,
            separator_style: DEFAULT_SEPARATOR_STYLE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks numeric ranges and required selector lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scroll_threshold_percent > 0.0 && self.scroll_threshold_percent <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "scroll_threshold_percent must be in (0, 1], got {}",
                self.scroll_threshold_percent
            )));
        }
        if self.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "check_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_page_number == 0 {
            return Err(ConfigError::Invalid(
                "max_page_number must be at least 1".to_string(),
            ));
        }
        if self.content_selectors.is_empty() {
            return Err(ConfigError::Invalid(
                "content_selectors must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
