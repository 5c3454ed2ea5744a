//! The auto-loader state machine.
//!
//! `AutoLoader` owns the live document and the pagination state and moves
//! through `Idle → Checking → Fetching → Merging → Idle | Done`. It never
//! awaits by itself except in [`AutoLoader::load_next`]; the runner spawns
//! fetches and feeds their results back through
//! [`AutoLoader::complete_load`], so scroll and timer events keep flowing
//! while a fetch is outstanding.

mod runner;

pub use runner::{run_loop, RunExit};

use std::time::Duration;

use log::{error, info, warn};
use url::Url;

use crate::config::{Config, NOTICE_LONG, NOTICE_SHORT};
use crate::dom::LiveDocument;
use crate::error_handling::{FailureKind, FetchError, LoadStats, MergeError};
use crate::fetch::PageFetcher;
use crate::lazy_images::{resolve_lazy_images, ImageSelectors};
use crate::merge::{merge_page, MergeReport, MergeSelectors};
use crate::monitor::{ProximityMonitor, ScrollMetrics};
use crate::notice::{Notice, NoticeBoard, Severity};
use crate::pagination::{Detection, PaginationSelectors, PaginationState};

/// Where the loader is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A proximity check is running, or a chained check is scheduled.
    Checking,
    Fetching,
    Merging,
    /// Terminal: every page has been loaded.
    Done,
}

/// Result of a proximity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Nothing to do now.
    Wait,
    /// Page `page` was claimed; fetch `url` and pass the result to `complete_load`.
    Load { page: u32, url: Url },
    /// The loader is done.
    Finished,
}

/// What happened to a page once its fetch completed.
#[derive(Debug)]
pub enum LoadOutcome {
    Merged(MergeReport),
    MergeFailed(MergeError),
    FetchFailed(FetchError),
}

/// Loads the pages of a gallery post into one live document.
pub struct AutoLoader {
    config: Config,
    document: LiveDocument,
    state: PaginationState,
    pagination: PaginationSelectors,
    merge: MergeSelectors,
    images: ImageSelectors,
    monitor: ProximityMonitor,
    fetcher: PageFetcher,
    notices: NoticeBoard,
    stats: LoadStats,
    phase: Phase,
    detection: Option<Detection>,
}

impl AutoLoader {
    pub fn new(config: Config, document: LiveDocument, fetcher: PageFetcher) -> Self {
        AutoLoader {
            pagination: PaginationSelectors::from_config(&config),
            merge: MergeSelectors::from_config(&config),
            images: ImageSelectors::from_config(&config),
            monitor: ProximityMonitor::new(config.scroll_threshold_percent),
            config,
            document,
            state: PaginationState::default(),
            fetcher,
            notices: NoticeBoard::new(),
            stats: LoadStats::new(),
            phase: Phase::Idle,
            detection: None,
        }
    }

    /// Reads the navigation block and activates the images already on the page.
    ///
    /// Runs once; later calls return the first detection unchanged.
    pub fn start(&mut self) -> Detection {
        if let Some(detection) = &self.detection {
            return detection.clone();
        }
        self.notify("Auto-loader started", Severity::Success, Some(NOTICE_LONG));

        let (state, detection) =
            PaginationState::detect(&self.document, &self.pagination, &self.config);
        self.state = state;
        self.announce_detection(&detection);
        self.detection = Some(detection.clone());

        self.resolve_current_images();
        detection
    }

    fn announce_detection(&mut self, detection: &Detection) {
        match detection {
            Detection::Detected { current, total, .. } => self.notify(
                format!("Page {current} of {total}"),
                Severity::Success,
                Some(NOTICE_SHORT),
            ),
            Detection::NoNavigation { fallback } => self.notify(
                format!("No navigation found, using default max pages: {fallback}"),
                Severity::Info,
                Some(NOTICE_SHORT),
            ),
            Detection::Disabled { fallback } => {
                info!("Page detection disabled, assuming {fallback} pages");
            }
            Detection::Failed { fallback, error } => {
                error!("Page detection failed: {error}");
                self.stats.record_failure(FailureKind::DetectionFallback);
                self.notify(
                    format!("Page detection failed, using default: {fallback}"),
                    Severity::Error,
                    Some(NOTICE_LONG),
                );
            }
        }
    }

    fn resolve_current_images(&mut self) {
        let Some(container) = self
            .merge
            .content
            .first_match(self.document.html())
            .map(|element| element.id())
        else {
            warn!("No content container on the start page; images left as they are");
            return;
        };
        let activated = resolve_lazy_images(self.document.html_mut(), container, &self.images);
        self.report_activated(activated);
    }

    /// Evaluates the proximity predicate and claims the next page if it holds.
    ///
    /// A reader at the threshold with nothing left to fetch finishes the loader
    /// instead of polling forever.
    pub fn check(&mut self, metrics: &ScrollMetrics) -> Check {
        if self.is_done() {
            return Check::Finished;
        }
        if self.state.is_loading() {
            return Check::Wait;
        }

        let near_bottom = self.monitor.is_near_bottom(&self.state, metrics, || {
            self.state
                .next_url(&self.document, &self.pagination.next_page)
                .is_some()
        });
        if near_bottom || self.monitor.reached_threshold(metrics) {
            return self.begin_load();
        }

        self.phase = Phase::Idle;
        Check::Wait
    }

    /// Claims the next page: increments the counter, sets the loading guard and
    /// returns the address to fetch.
    ///
    /// Finishes the loader when no next address exists or the current page is
    /// already the last one.
    pub fn begin_load(&mut self) -> Check {
        if self.is_done() {
            return Check::Finished;
        }
        if self.state.is_loading() {
            return Check::Wait;
        }
        self.phase = Phase::Checking;

        let Some(url) = self.next_url() else {
            self.finish("All pages loaded".to_string());
            return Check::Finished;
        };
        if self.state.reached_last_page() {
            self.finish(self.all_loaded_message());
            return Check::Finished;
        }

        let Some(page) = self.state.begin_fetch() else {
            self.finish("All pages loaded".to_string());
            return Check::Finished;
        };
        self.phase = Phase::Fetching;
        info!("Loading page {page} from {url}");
        self.notify(format!("Loading page {page}..."), Severity::Loading, None);
        Check::Load { page, url }
    }

    /// Applies the result of the fetch claimed by [`begin_load`](Self::begin_load).
    ///
    /// A fetch failure rolls the page back and returns to idle. A fetched page
    /// is merged; afterwards the loader either finishes (last page), schedules
    /// a chained check (phase `Checking`), or goes idle.
    pub fn complete_load(&mut self, result: Result<String, FetchError>) -> LoadOutcome {
        let page = self.state.current_page();

        let markup = match result {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Page {page} failed: {e}");
                self.stats.record_failure(e.kind());
                self.state.finish_fetch();
                self.state.roll_back();
                self.phase = Phase::Idle;
                self.notify(e.notice_message(), Severity::Error, Some(NOTICE_LONG));
                return LoadOutcome::FetchFailed(e);
            }
        };

        self.phase = Phase::Merging;
        let merged = merge_page(&mut self.document, &markup, page, &self.merge, &self.images);
        let outcome = match merged {
            Ok(report) => {
                self.stats.record_merge(report.images_appended);
                self.notify(
                    format!("Page {page} loaded"),
                    Severity::Success,
                    Some(NOTICE_SHORT),
                );
                self.report_activated(report.images_activated);
                LoadOutcome::Merged(report)
            }
            Err(e) => {
                error!("Page {page} not merged: {e}");
                self.stats.record_failure(FailureKind::ContainerMissing);
                if self.config.rollback_on_merge_failure {
                    self.state.roll_back();
                }
                self.notify(
                    "Could not find the content container",
                    Severity::Error,
                    Some(NOTICE_LONG),
                );
                LoadOutcome::MergeFailed(e)
            }
        };

        self.state.finish_fetch();
        if self.state.reached_last_page() {
            self.finish(self.all_loaded_message());
        } else if self.config.continuous_loading && self.next_url().is_some() {
            self.phase = Phase::Checking;
        } else {
            self.phase = Phase::Idle;
        }
        outcome
    }

    /// Runs one check and, if a page was claimed, fetches and merges it inline.
    ///
    /// Returns `None` when no page was claimed.
    pub async fn load_next(&mut self, metrics: &ScrollMetrics) -> Option<LoadOutcome> {
        match self.check(metrics) {
            Check::Load { url, .. } => {
                let result = self.fetcher.fetch(&url).await;
                Some(self.complete_load(result))
            }
            Check::Wait | Check::Finished => None,
        }
    }

    fn next_url(&self) -> Option<Url> {
        self.state.next_url(&self.document, &self.pagination.next_page)
    }

    fn all_loaded_message(&self) -> String {
        match self.state.total_pages().limit() {
            Some(total) => format!("All {total} pages loaded"),
            None => "All pages loaded".to_string(),
        }
    }

    fn finish(&mut self, message: String) {
        self.state.mark_all_loaded();
        self.phase = Phase::Done;
        self.notify(message, Severity::Success, Some(NOTICE_LONG));
    }

    fn report_activated(&mut self, activated: usize) {
        if activated > 0 {
            self.stats.record_images_activated(activated);
            self.notify(
                format!("Loaded {activated} images"),
                Severity::Success,
                Some(NOTICE_SHORT),
            );
        }
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity, duration: Option<Duration>) {
        self.notices.show(Notice::new(message, severity, duration));
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn document(&self) -> &LiveDocument {
        &self.document
    }

    pub fn into_document(self) -> LiveDocument {
        self.document
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }
}

#[cfg(test)]
mod tests;
