//! Splicing a fetched page into the live document.
//!
//! Images are the payload: when the fetched content container has any, only
//! the images are copied (each in its own centered paragraph), which keeps
//! repeated headers, navigation and ads out of the stitched page. Pages
//! without images fall back to copying the container's top-level elements,
//! minus navigation and ad blocks.

use std::sync::LazyLock;

use ego_tree::NodeId;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};

use crate::config::{Config, IMAGE_WRAPPER_STYLE, SEPARATOR_CLASS};
use crate::dom::{append_clone, append_element, append_text, create_element, LiveDocument};
use crate::error_handling::MergeError;
use crate::lazy_images::{resolve_lazy_images, ImageSelectors};
use crate::selector::SelectorList;

static IMAGES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img").unwrap_or_else(|e| {
        panic!("Image selector failed to parse: {e}. This is a programming error.")
    })
});

/// Selectors and markup settings the merger works with.
#[derive(Debug, Clone)]
pub struct MergeSelectors {
    pub content: SelectorList,
    pub excluded_descendants: SelectorList,
    pub excluded_classes: Vec<String>,
    pub separator_style: String,
}

impl MergeSelectors {
    pub fn from_config(config: &Config) -> Self {
        MergeSelectors {
            content: SelectorList::compile(&config.content_selectors, "content container"),
            excluded_descendants: SelectorList::compile(
                &config.excluded_descendant_selectors,
                "fallback merge exclusions",
            ),
            excluded_classes: config.excluded_classes.clone(),
            separator_style: config.separator_style.clone(),
        }
    }
}

/// What one successful merge appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub page: u32,
    /// Wrapped image copies appended (zero when the fallback branch ran).
    pub images_appended: usize,
    /// Top-level elements appended by the fallback branch.
    pub nodes_appended: usize,
    /// Images activated by the lazy-image pass that followed.
    pub images_activated: usize,
}

/// Merges the fetched `markup` of page `page` into `document`.
///
/// Appends a separator, then the fetched images (or the filtered top-level
/// elements), then activates deferred image sources in the live container.
pub fn merge_page(
    document: &mut LiveDocument,
    markup: &str,
    page: u32,
    selectors: &MergeSelectors,
    images: &ImageSelectors,
) -> Result<MergeReport, MergeError> {
    let fetched = Html::parse_document(markup);

    let container: NodeId = selectors
        .content
        .first_match(document.html())
        .map(|element| element.id())
        .ok_or(MergeError::LiveContainerMissing)?;
    let source = selectors
        .content
        .first_match(&fetched)
        .ok_or(MergeError::FetchedContainerMissing)?;

    append_separator(document.html_mut(), container, page, &selectors.separator_style);

    let fetched_images: Vec<ElementRef<'_>> = source.select(&IMAGES).collect();
    let mut report = MergeReport {
        page,
        images_appended: 0,
        nodes_appended: 0,
        images_activated: 0,
    };

    if fetched_images.is_empty() {
        debug!("Page {page} has no images; copying its content blocks");
        for child in source.children().filter_map(ElementRef::wrap) {
            if is_excluded(&child, selectors) {
                debug!("Skipping <{}> navigation/ad block", child.value().name());
                continue;
            }
            if append_clone(document.html_mut(), container, *child).is_some() {
                report.nodes_appended += 1;
            }
        }
    } else {
        for image in fetched_images {
            let wrapper = create_element("p", &[("style", IMAGE_WRAPPER_STYLE)]);
            let Some(wrapper) = append_element(document.html_mut(), container, wrapper) else {
                continue;
            };
            if append_clone(document.html_mut(), wrapper, *image).is_some() {
                report.images_appended += 1;
            }
        }
    }

    report.images_activated = resolve_lazy_images(document.html_mut(), container, images);
    info!(
        "Merged page {page}: {} images, {} blocks, {} activated",
        report.images_appended, report.nodes_appended, report.images_activated
    );
    Ok(report)
}

fn append_separator(html: &mut Html, container: NodeId, page: u32, style: &str) {
    let page_number = page.to_string();
    let separator = create_element(
        "div",
        &[
            ("class", SEPARATOR_CLASS),
            ("data-page", page_number.as_str()),
            ("style", style),
        ],
    );
    let Some(separator) = append_element(html, container, separator) else {
        return;
    };
    append_chevron(html, separator, "margin-right: 10px;");
    append_text(html, separator, &format!("Page {page}"));
    append_chevron(html, separator, "margin-left: 10px;");
}

fn append_chevron(html: &mut Html, parent: NodeId, style: &str) {
    let icon = create_element("i", &[("class", "fa fa-chevron-down"), ("style", style)]);
    append_element(html, parent, icon);
}

/// A top-level block is excluded when it carries an excluded class or contains
/// an excluded descendant.
fn is_excluded(child: &ElementRef<'_>, selectors: &MergeSelectors) -> bool {
    let has_excluded_class = child
        .value()
        .classes()
        .any(|class| selectors.excluded_classes.iter().any(|excluded| excluded == class));
    if has_excluded_class {
        return true;
    }
    child
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|descendant| selectors.excluded_descendants.matches(&descendant))
}
