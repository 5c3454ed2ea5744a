//! Pagination tracking.
//!
//! Reads the gallery's numbered navigation once, then tracks which page has
//! been merged last and where the next one lives.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use url::Url;

use crate::config::Config;
use crate::dom::LiveDocument;
use crate::error_handling::DetectionError;
use crate::selector::SelectorList;


/// Leading digits of a link label, the way `parseInt` reads "3" or "3 »".
static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+").unwrap_or_else(|e| {
        panic!("Page number pattern failed to compile: {e}. This is a programming error.")
    })
});

/// Total page count and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPages {
    /// Detection has not run yet.
    Unknown,
    /// Read from the navigation block.
    Detected(u32),
    /// The configured `max_page_number`, used when detection was skipped or failed.
    Fallback(u32),
}

impl TotalPages {
    pub fn limit(&self) -> Option<u32> {
        match self {
            TotalPages::Unknown => None,
            TotalPages::Detected(total) | TotalPages::Fallback(total) => Some(*total),
        }
    }
}

/// Outcome of reading the navigation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Page links were read from the navigation block.
    Detected { current: u32, total: u32, links: usize },
    /// The page has no navigation block.
    NoNavigation { fallback: u32 },
    /// Detection is turned off in the configuration.
    Disabled { fallback: u32 },
    /// The navigation block exists but could not be read.
    Failed { fallback: u32, error: DetectionError },
}

/// Selectors used by the tracker.
#[derive(Debug, Clone)]
pub struct PaginationSelectors {
    pub navigation: SelectorList,
    pub page_numbers: SelectorList,
    pub next_page: SelectorList,
    pub current_class: String,
}

impl PaginationSelectors {
    pub fn from_config(config: &Config) -> Self {
        PaginationSelectors {
            navigation: SelectorList::compile(&config.navigation_selectors, "navigation block"),
            page_numbers: SelectorList::compile(&config.page_number_selectors, "page numbers"),
            next_page: SelectorList::compile(&config.next_page_selectors, "next page link"),
            current_class: config.current_page_class.clone(),
        }
    }
}

/// Current/total page numbers, the page → URL map, and the fetch guards.
///
/// The map is written once by [`detect`](Self::detect) and only read after
/// that. `is_loading` admits one fetch at a time; `all_pages_loaded` is
/// terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    current_page: u32,
    total_pages: TotalPages,
    page_urls: BTreeMap<u32, Url>,
    is_loading: bool,
    all_pages_loaded: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState {
            current_page: 1,
            total_pages: TotalPages::Unknown,
            page_urls: BTreeMap::new(),
            is_loading: false,
            all_pages_loaded: false,
        }
    }
}

impl PaginationState {
    /// Scans the document's navigation block and builds the initial state.
    ///
    /// Every numbered link records `number → URL`, except the one carrying the
    /// current class, whose number becomes the current page. The largest
    /// number seen becomes the total. Without a navigation block (or with
    /// detection disabled) the total falls back to `max_page_number`.
    pub fn detect(
        document: &LiveDocument,
        selectors: &PaginationSelectors,
        config: &Config,
    ) -> (Self, Detection) {
        let fallback = config.max_page_number;
        let mut state = PaginationState::default();

        if !config.auto_detect_total_pages {
            state.total_pages = TotalPages::Fallback(fallback);
            return (state, Detection::Disabled { fallback });
        }

        let Some(navigation) = selectors.navigation.first_match(document.html()) else {
            state.total_pages = TotalPages::Fallback(fallback);
            return (state, Detection::NoNavigation { fallback });
        };

        if selectors.page_numbers.is_empty() {
            log::error!("Cannot read page links: no usable page-number selector");
            state.total_pages = TotalPages::Fallback(fallback);
            return (
                state,
                Detection::Failed {
                    fallback,
                    error: DetectionError::NoUsableSelectors,
                },
            );
        }

        let mut current = 1;
        let mut max_page = 1;
        for link in selectors.page_numbers.first_match_all(navigation) {
            let label: String = link.text().collect();
            let Some(number) = parse_page_number(&label) else {
                continue;
            };

            let is_current = link
                .value()
                .classes()
                .any(|class| class == selectors.current_class);
            if is_current {
                current = number;
            } else if let Some(url) = link.value().attr("href").and_then(|h| document.resolve(h)) {
                debug!("Page {number} -> {url}");
                state.page_urls.insert(number, url);
            }

            max_page = max_page.max(number);
        }

        state.current_page = current;
        state.total_pages = TotalPages::Detected(max_page);
        info!(
            "Detected page {current} of {max_page} ({} page links)",
            state.page_urls.len()
        );
        let links = state.page_urls.len();
        (
            state,
            Detection::Detected {
                current,
                total: max_page,
                links,
            },
        )
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> TotalPages {
        self.total_pages
    }

    pub fn page_urls(&self) -> &BTreeMap<u32, Url> {
        &self.page_urls
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn all_pages_loaded(&self) -> bool {
        self.all_pages_loaded
    }

    /// Whether the current page is the last known page.
    pub fn reached_last_page(&self) -> bool {
        self.total_pages
            .limit()
            .is_some_and(|total| self.current_page >= total)
    }

    /// Whether the page count still allows another page.
    pub fn below_last_page(&self) -> bool {
        !self.reached_last_page()
    }

    /// Address of the page after the current one.
    ///
    /// Prefers the navigation map, then the first "next page" link in the live
    /// document. `None` once everything is loaded or the next page would pass
    /// the known total.
    pub fn next_url(&self, document: &LiveDocument, next_page: &SelectorList) -> Option<Url> {
        if self.all_pages_loaded {
            return None;
        }

        let next = self.current_page.checked_add(1)?;
        if self.total_pages.limit().is_some_and(|total| next > total) {
            return None;
        }

        if let Some(url) = self.page_urls.get(&next) {
            return Some(url.clone());
        }

        next_page
            .first_match(document.html())
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| document.resolve(href))
    }

    /// Claims the next page for fetching: increments the page and sets the loading guard.
    ///
    /// Returns the page number now being fetched, or `None` (state unchanged)
    /// when the page counter cannot go any higher.
    pub(crate) fn begin_fetch(&mut self) -> Option<u32> {
        debug_assert!(!self.is_loading, "a fetch is already in flight");
        debug_assert!(!self.all_pages_loaded, "fetch after all pages loaded");
        self.current_page = self.current_page.checked_add(1)?;
        self.is_loading = true;
        Some(self.current_page)
    }

    /// Clears the loading guard.
    pub(crate) fn finish_fetch(&mut self) {
        self.is_loading = false;
    }

    /// Undoes the increment of [`begin_fetch`](Self::begin_fetch) so the page is retried.
    pub(crate) fn roll_back(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub(crate) fn mark_all_loaded(&mut self) {
        self.all_pages_loaded = true;
    }
}

/// Reads the leading integer of a page link label.
pub fn parse_page_number(label: &str) -> Option<u32> {
    PAGE_NUMBER
        .find(label.trim())
        .and_then(|m| m.as_str().parse().ok())
}
