//! autopager library: loads the pages of a paginated gallery post into one document
//!
//! The start page's numbered navigation is read once; each time the (simulated)
//! reader nears the bottom of the page, the next page is fetched, its images are
//! appended to the content container behind a separator, and deferred image
//! sources are activated.
//!
//! # Example
//!
//! ```no_run
//! use autopager::{run_autoload, Config, RunRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = RunRequest {
//!     source: "https://example.com/gallery/post-1/".to_string(),
//!     base_url: None,
//!     output: "post-1.html".into(),
//!     scroll_fraction: 1.0,
//! };
//!
//! let report = run_autoload(Config::default(), request).await?;
//! println!("Merged {} pages ({} images)", report.pages_merged, report.images_appended);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The loader owns a parsed HTML tree,
//! which is not `Send`: drive it from the task that created it.

pub mod config;
pub mod dom;
pub mod engine;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod lazy_images;
pub mod merge;
pub mod monitor;
pub mod notice;
pub mod pagination;
mod run;
pub mod selector;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use dom::LiveDocument;
pub use engine::{run_loop, AutoLoader, Check, LoadOutcome, Phase, RunExit};
pub use fetch::PageFetcher;
pub use monitor::{ScrollMetrics, ViewportEvent};
pub use run::{load_document, run_autoload, DocumentSource, LoadReport, RunRequest};
