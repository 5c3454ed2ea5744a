//! Load statistics tracking.
//!
//! Counts failures per kind plus merged pages and activated images over a run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Run statistics tracker.
///
/// All failure kinds are initialized to zero on creation.
pub struct LoadStats {
    failures: HashMap<FailureKind, AtomicUsize>,
    pages_merged: AtomicUsize,
    images_appended: AtomicUsize,
    images_activated: AtomicUsize,
}

impl LoadStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        LoadStats {
            failures,
            pages_merged: AtomicUsize::new(0),
            images_appended: AtomicUsize::new(0),
            images_activated: AtomicUsize::new(0),
        }
    }

    pub fn record_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in LoadStats initialization.",
                kind
            );
        }
    }

    pub fn record_merge(&self, images_appended: usize) {
        self.pages_merged.fetch_add(1, Ordering::Relaxed);
        self.images_appended
            .fetch_add(images_appended, Ordering::Relaxed);
    }

    pub fn record_images_activated(&self, count: usize) {
        self.images_activated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    pub fn pages_merged(&self) -> usize {
        self.pages_merged.load(Ordering::SeqCst)
    }

    pub fn images_appended(&self) -> usize {
        self.images_appended.load(Ordering::SeqCst)
    }

    pub fn images_activated(&self) -> usize {
        self.images_activated.load(Ordering::SeqCst)
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}
