//! Configuration constants.
//!
//! Defaults for the loader configuration plus the fixed markers written into
//! the stitched document.

use std::time::Duration;

/// Fraction of the scrollable height that must be passed before the next page loads.
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 0.85;
/// Period of the proximity timer in milliseconds.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1500;
/// Delay before a chained check after a page has been merged, in milliseconds.
pub const DEFAULT_LOAD_DELAY_MS: u64 = 1500;
/// Upper bound on a single page fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Total page count assumed when the navigation block cannot be read.
pub const DEFAULT_MAX_PAGE_NUMBER: u32 = 50;

/// TCP connect timeout for the page client.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent string for page requests.
///
/// Gallery hosts commonly serve a reduced page (or a bot wall) to non-browser
/// agents, so a current desktop Chrome string is used unless `--user-agent`
/// overrides it.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default output path for the stitched document.
pub const DEFAULT_OUTPUT_PATH: &str = "./autopager.html";

/// Class added to images whose source has been activated.
pub const LOADED_CLASS: &str = "loaded";
/// Class removed from images whose source has been activated.
pub const LAZY_CLASS: &str = "lazy";
/// Class of the separator inserted before each merged page.
pub const SEPARATOR_CLASS: &str = "autopager-separator";

/// Inline style of the page separator.
pub const DEFAULT_SEPARATOR_STYLE: &str = "text-align: center; padding: 25px 20px; margin: 30px 0; \
     background: linear-gradient(90deg, #f8f9fa 0%, #e9ecef 50%, #f8f9fa 100%); \
     border: 2px solid #e74c3c; border-radius: 8px; font-size: 18px; font-weight: bold; \
     color: #e74c3c; box-shadow: 0 4px 6px rgba(231, 76, 60, 0.1);";

/// Inline style of the paragraph wrapping each merged image.
pub const IMAGE_WRAPPER_STYLE: &str = "text-align: center;";

/// How long a success notice stays visible.
pub const NOTICE_SHORT: Duration = Duration::from_millis(2000);
/// How long an error or final notice stays visible.
pub const NOTICE_LONG: Duration = Duration::from_millis(3000);

pub(crate) fn default_next_page_selectors() -> Vec<String> {
    to_strings(&[
        ".page-link a.post-page-numbers:not(.current)",
        ".post-page-numbers:not(.current)",
        "a.page-numbers:not(.current)",
        ".wp-pagenavi a:not(.current)",
        ".pagination-next",
        ".next",
    ])
}

pub(crate) fn default_navigation_selectors() -> Vec<String> {
    to_strings(&[".page-link", ".wp-pagenavi", ".pagination"])
}

pub(crate) fn default_page_number_selectors() -> Vec<String> {
    to_strings(&[
        ".page-link .post-page-numbers",
        ".post-page-numbers",
        ".page-numbers",
        ".wp-pagenavi a",
        ".pagination a",
    ])
}

pub(crate) fn default_content_selectors() -> Vec<String> {
    to_strings(&[
        ".entry",
        ".post-inner",
        ".post-content",
        ".content",
        "article",
        ".entry-content",
        "main",
    ])
}

pub(crate) fn default_image_selectors() -> Vec<String> {
    to_strings(&[
        "img.aligncenter.lazy:not(.loaded)",
        "img.lazy:not(.loaded)",
        "img[data-src]:not(.loaded)",
        "img[data-original]:not(.loaded)",
        "img[loading=\"lazy\"]:not(.loaded)",
    ])
}

pub(crate) fn default_deferred_source_attributes() -> Vec<String> {
    to_strings(&["data-src", "data-original", "data-lazy-src"])
}

pub(crate) fn default_excluded_classes() -> Vec<String> {
    to_strings(&["page-link", "e3lan"])
}

pub(crate) fn default_excluded_descendant_selectors() -> Vec<String> {
    to_strings(&[".page-link"])
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
