//! Scroll position and the proximity predicate.
//!
//! The predicate is evaluated on every timer tick and every scroll event; both
//! triggers go through [`ProximityMonitor::is_near_bottom`].

use crate::pagination::PaginationState;

/// A sample of the reader's scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// A reader scrolled `fraction` of the way down a page of the given size.
    pub fn at_fraction(fraction: f64, scroll_height: f64, viewport_height: f64) -> Self {
        let scrollable = (scroll_height - viewport_height).max(0.0);
        ScrollMetrics::new(scrollable * fraction, scroll_height, viewport_height)
    }

    /// `scroll_top / (scroll_height - viewport_height)`, or `None` for a page
    /// that cannot scroll or carries non-finite values.
    pub fn scrolled_fraction(&self) -> Option<f64> {
        let scrollable = self.scroll_height - self.viewport_height;
        if !scrollable.is_finite() || scrollable <= 0.0 || !self.scroll_top.is_finite() {
            return None;
        }
        Some(self.scroll_top / scrollable)
    }
}

impl Default for ScrollMetrics {
    /// The top of a page that has not been measured yet.
    fn default() -> Self {
        ScrollMetrics::new(0.0, 0.0, 0.0)
    }
}

/// Events delivered to the runner by whatever hosts the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Scrolled(ScrollMetrics),
    /// The page was hidden; the timer is suspended.
    Hidden,
    /// The page is visible again; the timer resumes.
    Visible,
}

/// Decides when the next page should be fetched.
#[derive(Debug, Clone, Copy)]
pub struct ProximityMonitor {
    threshold: f64,
}

impl ProximityMonitor {
    pub fn new(threshold: f64) -> Self {
        ProximityMonitor { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reached_threshold(&self, metrics: &ScrollMetrics) -> bool {
        metrics
            .scrolled_fraction()
            .is_some_and(|fraction| fraction >= self.threshold)
    }

    /// True iff nothing is loading, the loader is not finished, the page count
    /// allows another page, the reader is past the threshold, and a next URL
    /// resolves. `has_next_url` is only called when everything else holds.
    pub fn is_near_bottom(
        &self,
        state: &PaginationState,
        metrics: &ScrollMetrics,
        has_next_url: impl FnOnce() -> bool,
    ) -> bool {
        if state.all_pages_loaded() || state.is_loading() || !state.below_last_page() {
            return false;
        }
        self.reached_threshold(metrics) && has_next_url()
    }
}
