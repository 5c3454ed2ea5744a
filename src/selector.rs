//! Ordered CSS selector candidate lists.
//!
//! Gallery themes disagree on class names, so every lookup is expressed as a
//! list of candidates tried in order: the first candidate that matches
//! anything decides the result.

use scraper::{ElementRef, Html, Selector};

/// A compiled, ordered list of selector candidates.
#[derive(Debug, Clone)]
pub struct SelectorList {
    entries: Vec<(String, Selector)>,
}

impl SelectorList {
    /// Compiles candidates, skipping (and logging) any that fail to parse.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Selector strings in priority order
    /// * `context` - What the list is used for, for error logging
    pub fn compile(candidates: &[String], context: &str) -> Self {
        let entries = candidates
            .iter()
            .filter_map(|candidate| match Selector::parse(candidate) {
                Ok(selector) => Some((candidate.clone(), selector)),
                Err(e) => {
                    log::error!(
                        "Failed to parse CSS selector '{}' in {}: {}. Skipping it.",
                        candidate,
                        context,
                        e
                    );
                    None
                }
            })
            .collect();
        SelectorList { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.entries.iter().map(|(_, selector)| selector)
    }

    /// First element of the whole document matched by the first matching candidate.
    pub fn first_match<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// Like [`first_match`](Self::first_match), restricted to `scope`'s subtree.
    pub fn first_match_within<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.iter().find_map(|selector| scope.select(selector).next())
    }

    /// Every element within `scope` matched by the first candidate that matches anything.
    ///
    /// Returns an empty vector when no candidate matches.
    pub fn first_match_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for (source, selector) in &self.entries {
            let matched: Vec<_> = scope.select(selector).collect();
            if !matched.is_empty() {
                log::trace!("Selector '{}' matched {} elements", source, matched.len());
                return matched;
            }
        }
        Vec::new()
    }

    /// Whether any candidate matches `element` itself.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.iter().any(|selector| selector.matches(element))
    }
}
