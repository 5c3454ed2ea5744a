//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::constants::DEFAULT_OUTPUT_PATH;
use crate::config::types::{Config, LogFormat, LogLevel};
use crate::error_handling::ConfigError;

/// Command-line options.
///
/// Options left unset fall back to the `--config` file, then to `Config::default()`.
///
/// # Examples
///
/// ```bash
/// # Stitch every page of a gallery post into one file
/// autopager https://example.com/gallery/post-1/ --output post-1.html
///
/// # Work from a saved page, resolving links against its original address
/// autopager saved.html --base-url https://example.com/gallery/post-1/
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "autopager",
    about = "Loads every page of a paginated gallery post and stitches the images into one document."
)]
pub struct Opt {
    /// Start page: an http(s) URL or a local HTML file
    pub source: String,

    /// Address of the start page when `source` is a local file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Where to write the stitched document
    #[arg(long, value_parser, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// JSON configuration file (selectors, timings)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Scrolled fraction reported by the simulated reader (1.0 = always at the bottom)
    #[arg(long, default_value_t = 1.0)]
    pub scroll_fraction: f64,

    /// Scrolled fraction that triggers the next page
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Proximity timer period in milliseconds
    #[arg(long)]
    pub check_interval_ms: Option<u64>,

    /// Delay before the chained check after a merge, in milliseconds
    #[arg(long)]
    pub load_delay_ms: Option<u64>,

    /// Total page count used when the navigation block cannot be read
    #[arg(long)]
    pub max_page_number: Option<u32>,

    /// Per-fetch timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// HTTP User-Agent header value
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Wait for the next timer tick after each merge instead of chaining
    #[arg(long)]
    pub no_continuous: bool,

    /// Skip navigation detection and assume `max_page_number` pages
    #[arg(long)]
    pub no_auto_detect: bool,
}

impl Opt {
    /// Builds the loader configuration: file values first, then CLI overrides.
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(threshold) = self.threshold {
            config.scroll_threshold_percent = threshold;
        }
        if let Some(interval) = self.check_interval_ms {
            config.check_interval_ms = interval;
        }
        if let Some(delay) = self.load_delay_ms {
            config.load_delay_ms = delay;
        }
        if let Some(max) = self.max_page_number {
            config.max_page_number = max;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.fetch_timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if self.no_continuous {
            config.continuous_loading = false;
        }
        if self.no_auto_detect {
            config.auto_detect_total_pages = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opt = Opt::parse_from(["autopager", "https://example.com/post/"]);
        assert_eq!(opt.source, "https://example.com/post/");
        assert_eq!(opt.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(opt.scroll_fraction, 1.0);

        let config = opt.to_config().expect("defaults are valid");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let opt = Opt::parse_from([
            "autopager",
            "page.html",
            "--base-url",
            "https://example.com/post/",
            "--threshold",
            "0.5",
            "--max-page-number",
            "9",
            "--load-delay-ms",
            "0",
            "--no-continuous",
            "--no-auto-detect",
        ]);
        let config = opt.to_config().expect("overrides are valid");
        assert_eq!(config.scroll_threshold_percent, 0.5);
        assert_eq!(config.max_page_number, 9);
        assert_eq!(config.load_delay_ms, 0);
        assert!(!config.continuous_loading);
        assert!(!config.auto_detect_total_pages);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let opt = Opt::parse_from(["autopager", "page.html", "--threshold", "2.0"]);
        assert!(opt.to_config().is_err());
    }
}
