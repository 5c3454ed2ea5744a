//! Activation of deferred image sources.
//!
//! Lazy-loading themes park the real image address in a `data-*` attribute
//! and swap it in with JavaScript. Merged pages never run that script, so the
//! swap is done here: the deferred address becomes `src`, the element is
//! marked `loaded` and forced visible.

use ego_tree::NodeId;
use log::{debug, error};
use scraper::{ElementRef, Html};

use crate::config::{Config, LAZY_CLASS, LOADED_CLASS};
use crate::dom::{replace_element, ElementEdit};
use crate::selector::SelectorList;

/// Selectors and attribute names the resolver works with.
#[derive(Debug, Clone)]
pub struct ImageSelectors {
    pub images: SelectorList,
    pub deferred_attributes: Vec<String>,
}

impl ImageSelectors {
    pub fn from_config(config: &Config) -> Self {
        ImageSelectors {
            images: SelectorList::compile(&config.image_selectors, "lazy images"),
            deferred_attributes: config.deferred_source_attributes.clone(),
        }
    }
}

/// Activates every unresolved image under `scope`.
///
/// All image selectors are applied in order; elements already carrying the
/// `loaded` class are skipped. A failing image is logged and does not stop
/// the others.
///
/// Returns the number of images touched.
pub fn resolve_lazy_images(html: &mut Html, scope: NodeId, selectors: &ImageSelectors) -> usize {
    let mut touched = 0;

    for selector in selectors.images.iter() {
        let pending: Vec<NodeId> = match html.tree.get(scope).and_then(ElementRef::wrap) {
            Some(root) => root
                .select(selector)
                .filter(|img| !img.value().classes().any(|c| c == LOADED_CLASS))
                .map(|img| img.id())
                .collect(),
            None => {
                error!("Lazy image scope no longer exists in the document");
                return touched;
            }
        };

        for (index, id) in pending.into_iter().enumerate() {
            match activate_image(html, id, &selectors.deferred_attributes) {
                Ok(()) => touched += 1,
                Err(reason) => error!("Failed to activate image {}: {}", index + 1, reason),
            }
        }
    }

    debug!("Activated {touched} images");
    touched
}

fn activate_image(html: &mut Html, id: NodeId, deferred_attributes: &[String]) -> Result<(), String> {
    let element = html
        .tree
        .get(id)
        .and_then(ElementRef::wrap)
        .ok_or_else(|| "element disappeared".to_string())?;

    let mut edit = ElementEdit::from_element(element.value());
    // Another selector may already have handled this element.
    if edit.has_class(LOADED_CLASS) {
        return Ok(());
    }

    let deferred = deferred_attributes
        .iter()
        .filter_map(|name| edit.attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string);

    edit.set_attr("loading", "eager");
    if let Some(source) = deferred {
        let already_active = edit
            .attr("src")
            .is_some_and(|src| src.contains(source.as_str()));
        if !already_active {
            edit.set_attr("src", &source);
        }
    }
    edit.remove_class(LAZY_CLASS);
    edit.add_class(LOADED_CLASS);
    edit.set_style("display", "block");
    edit.set_style("opacity", "1");

    if replace_element(html, id, edit.build()) {
        Ok(())
    } else {
        Err("element could not be replaced".to_string())
    }
}
