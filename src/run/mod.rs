//! Run orchestration: load the start page, drive the loader until every page
//! is merged (or Ctrl-C), then write the stitched document.

mod source;
mod statistics;

pub use source::{load_document, DocumentSource};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Opt};
use crate::engine::{run_loop, AutoLoader, RunExit};
use crate::fetch::PageFetcher;
use crate::initialization::init_client;
use crate::monitor::{ScrollMetrics, ViewportEvent};
use statistics::print_load_statistics;

/// Page geometry reported by the simulated reader.
const READER_PAGE_HEIGHT: f64 = 10_000.0;
const READER_VIEWPORT_HEIGHT: f64 = 1_000.0;
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// What to load and where to write it.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// An http(s) URL or a local HTML file.
    pub source: String,
    /// Address of a local start page.
    pub base_url: Option<String>,
    pub output: PathBuf,
    /// Scrolled fraction the simulated reader reports.
    pub scroll_fraction: f64,
}

impl From<&Opt> for RunRequest {
    fn from(opt: &Opt) -> Self {
        RunRequest {
            source: opt.source.clone(),
            base_url: opt.base_url.clone(),
            output: opt.output.clone(),
            scroll_fraction: opt.scroll_fraction,
        }
    }
}

/// Results of an auto-load run.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// False when the run was interrupted before the last page.
    pub completed: bool,
    /// Number of the last page merged (or claimed).
    pub last_page: u32,
    /// Known total page count.
    pub total_pages: Option<u32>,
    pub pages_merged: usize,
    pub images_appended: usize,
    pub images_activated: usize,
    pub failures: usize,
    /// Where the stitched document was written.
    pub output: PathBuf,
    pub elapsed_seconds: f64,
}

/// Loads every page of a gallery post into one document.
///
/// The start page is fetched (or read from disk), a simulated reader reports
/// one scroll position, and the loader runs until it is done or Ctrl-C is
/// pressed. Whatever was merged is written to `request.output` either way.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the start page cannot
/// be loaded, or the output cannot be written. Failures of individual pages
/// are not errors; they are counted in the report.
pub async fn run_autoload(config: Config, request: RunRequest) -> Result<LoadReport> {
    let start_time = Instant::now();

    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let source = DocumentSource::parse(&request.source, request.base_url.as_deref())
        .context("Invalid start page")?;
    let start_fetcher = PageFetcher::new(Arc::clone(&client), config.fetch_timeout());
    let document = load_document(&source, &start_fetcher).await?;
    info!("Loaded start page {}", document.url());

    if request.scroll_fraction < config.scroll_threshold_percent {
        warn!(
            "Scroll fraction {} is below the threshold {}; no page will load until interrupted",
            request.scroll_fraction, config.scroll_threshold_percent
        );
    }

    let fetcher = PageFetcher::new(client, config.fetch_timeout()).with_referer(document.url());
    let mut loader = AutoLoader::new(config, document, fetcher);

    let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    events
        .send(ViewportEvent::Scrolled(ScrollMetrics::at_fraction(
            request.scroll_fraction,
            READER_PAGE_HEIGHT,
            READER_VIEWPORT_HEIGHT,
        )))
        .await
        .context("Viewport event channel closed before the run started")?;
    drop(events);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, writing the pages loaded so far");
            signal_cancel.cancel();
        }
    });

    let exit = run_loop(&mut loader, receiver, cancel).await;
    signal_task.abort();

    tokio::fs::write(&request.output, loader.document().to_html())
        .await
        .with_context(|| format!("Failed to write {}", request.output.display()))?;
    info!("Stitched document written to {}", request.output.display());

    let stats = loader.stats();
    print_load_statistics(stats);

    Ok(LoadReport {
        completed: exit == RunExit::Completed,
        last_page: loader.state().current_page(),
        total_pages: loader.state().total_pages().limit(),
        pages_merged: stats.pages_merged(),
        images_appended: stats.images_appended(),
        images_activated: stats.images_activated(),
        failures: stats.total_failures(),
        output: request.output.clone(),
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
