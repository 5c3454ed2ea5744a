//! The event loop driving an [`AutoLoader`].

use std::future::pending;
use std::pin::Pin;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;

use super::{AutoLoader, Check, Phase};
use crate::error_handling::FetchError;
use crate::monitor::{ScrollMetrics, ViewportEvent};

type FetchTask = JoinHandle<Result<String, FetchError>>;

/// Why [`run_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Every page was loaded.
    Completed,
    /// The cancellation token fired first.
    Cancelled,
}

/// Drives `loader` until it is done or `cancel` fires.
///
/// Three sources feed the proximity check: the interval timer, scroll events,
/// and the chained check scheduled `load_delay` after a merge. While the page
/// is hidden the timer is suspended and scroll events only record the
/// position; the first tick after it becomes visible again acts on it. The fetch runs as a spawned task; its result is
/// applied here, so the loader and its document never leave this task.
///
/// If the event channel closes, the last reported scroll position is kept
/// and the timer keeps running.
pub async fn run_loop(
    loader: &mut AutoLoader,
    mut events: mpsc::Receiver<ViewportEvent>,
    cancel: CancellationToken,
) -> RunExit {
    loader.start();

    let mut metrics = ScrollMetrics::default();
    let mut visible = true;
    let mut events_open = true;
    let mut in_flight: Option<FetchTask> = None;
    let mut chained: Option<Pin<Box<Sleep>>> = None;

    let mut ticker = interval(loader.config().check_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if loader.is_done() {
            info!("All pages loaded, stopping the check timer");
            return RunExit::Completed;
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                if let Some(task) = in_flight.take() {
                    task.abort();
                }
                info!("Run cancelled at page {}", loader.state().current_page());
                return RunExit::Cancelled;
            }

            result = join_fetch(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                loader.complete_load(result);
                if loader.phase() == Phase::Checking {
                    debug!("Chained check in {:?}", loader.config().load_delay());
                    chained = Some(Box::pin(sleep(loader.config().load_delay())));
                }
            }

            event = events.recv(), if events_open => match event {
                Some(ViewportEvent::Scrolled(latest)) => {
                    metrics = latest;
                    if visible {
                        dispatch(loader, &metrics, &mut in_flight);
                    }
                }
                Some(ViewportEvent::Hidden) => {
                    debug!("Page hidden, suspending the check timer");
                    visible = false;
                }
                Some(ViewportEvent::Visible) => {
                    debug!("Page visible, resuming the check timer");
                    visible = true;
                    ticker.reset();
                }
                None => {
                    debug!("Viewport event channel closed");
                    events_open = false;
                }
            },

            _ = wait_chained(&mut chained), if chained.is_some() => {
                chained = None;
                dispatch(loader, &metrics, &mut in_flight);
            }

            _ = ticker.tick(), if visible => {
                dispatch(loader, &metrics, &mut in_flight);
            }
        }
    }
}

/// Runs a proximity check and spawns the fetch it claims, if any.
fn dispatch(loader: &mut AutoLoader, metrics: &ScrollMetrics, in_flight: &mut Option<FetchTask>) {
    if in_flight.is_some() {
        return;
    }
    if let Check::Load { page, url } = loader.check(metrics) {
        let fetcher = loader.fetcher().clone();
        debug!("Spawning fetch of page {page}");
        *in_flight = Some(tokio::spawn(async move { fetcher.fetch(&url).await }));
    }
}

async fn join_fetch(task: &mut Option<FetchTask>) -> Result<String, FetchError> {
    match task {
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Fetch task ended abnormally: {e}");
                Err(FetchError::Aborted(e.to_string()))
            }
        },
        None => pending().await,
    }
}

async fn wait_chained(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
