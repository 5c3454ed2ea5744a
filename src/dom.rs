//! The live document and the tree edits the merger performs on it.
//!
//! The document is a `scraper::Html`, whose `ego_tree` arena is mutated in
//! place: nodes are appended by copying node values from another tree or by
//! creating them with `Element::new`, and elements are edited by rebuilding
//! them (a rebuilt element starts with fresh id/class caches, so later
//! selector matching sees the new classes).

use ego_tree::{NodeId, NodeRef};
use html5ever::{namespace_url, ns, Attribute, LocalName, QualName};
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, StrTendril};
use url::Url;

/// The host page being extended, plus the address its links resolve against.
pub struct LiveDocument {
    html: Html,
    url: Url,
}

impl LiveDocument {
    pub fn parse(markup: &str, url: Url) -> Self {
        LiveDocument {
            html: Html::parse_document(markup),
            url,
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub(crate) fn html_mut(&mut self) -> &mut Html {
        &mut self.html
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolves an `href` against the document address.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.url.join(href).ok()
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Serializes the whole document, doctype included.
    pub fn to_html(&self) -> String {
        self.html.html()
    }
}

/// Deep-copies `source` (from any tree) as the last child of `parent`.
///
/// Returns the id of the copy, or `None` if `parent` does not exist.
pub(crate) fn append_clone(
    html: &mut Html,
    parent: NodeId,
    source: NodeRef<'_, Node>,
) -> Option<NodeId> {
    let id = html.tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        append_clone(html, id, child);
    }
    Some(id)
}

/// Appends `element` (childless) as the last child of `parent`.
pub(crate) fn append_element(html: &mut Html, parent: NodeId, element: Element) -> Option<NodeId> {
    Some(html.tree.get_mut(parent)?.append(Node::Element(element)).id())
}

pub(crate) fn append_text(html: &mut Html, parent: NodeId, text: &str) -> Option<NodeId> {
    let text = Text {
        text: StrTendril::from_slice(text),
    };
    Some(html.tree.get_mut(parent)?.append(Node::Text(text)).id())
}

/// A new HTML element with the given attributes.
pub(crate) fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Element {
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: attribute_name(name),
            value: StrTendril::from_slice(value),
        })
        .collect();
    Element::new(QualName::new(None, ns!(html), LocalName::from(tag)), attributes)
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

/// Replaces the element at `id` with `element`, keeping its children.
pub(crate) fn replace_element(html: &mut Html, id: NodeId, element: Element) -> bool {
    let Some(mut node) = html.tree.get_mut(id) else {
        return false;
    };
    if !node.value().is_element() {
        return false;
    }
    *node.value() = Node::Element(element);
    true
}

/// An editable copy of one element's tag and attributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementEdit {
    name: QualName,
    attrs: Vec<(QualName, String)>,
}

impl ElementEdit {
    pub(crate) fn from_element(element: &Element) -> Self {
        ElementEdit {
            name: element.name.clone(),
            attrs: element
                .attrs
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        }
    }

    fn find_attribute_index(&self, name: &str) -> Option<usize> {
        self.attrs
            .iter()
            .position(|(attr_name, _)| attr_name.local.as_ref() == name)
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.find_attribute_index(name)
            .map(|index| self.attrs[index].1.as_str())
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
        match self.find_attribute_index(name) {
            Some(index) => self.attrs[index].1 = value.to_string(),
            None => self.attrs.push((attribute_name(name), value.to_string())),
        }
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let updated = match self.attr("class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", &updated);
    }

    pub(crate) fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let remaining = remaining.join(" ");
        self.set_attr("class", &remaining);
    }

    /// Sets one declaration of the inline `style`, keeping the others.
    pub(crate) fn set_style(&mut self, property: &str, value: &str) {
        let mut declarations: Vec<(String, String)> = self
            .attr("style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|decl| {
                let (prop, val) = decl.split_once(':')?;
                let prop = prop.trim();
                (!prop.is_empty()).then(|| (prop.to_string(), val.trim().to_string()))
            })
            .collect();
        match declarations
            .iter_mut()
            .find(|(prop, _)| prop.eq_ignore_ascii_case(property))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let style = declarations
            .iter()
            .map(|(prop, val)| format!("{prop}: {val};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("style", &style);
    }

    /// Builds a fresh element from the edited tag and attributes.
    pub(crate) fn build(&self) -> Element {
        let attributes = self
            .attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: StrTendril::from_slice(value),
            })
            .collect();
        Element::new(self.name.clone(), attributes)
    }
}
