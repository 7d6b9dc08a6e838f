//! Mutable host document.
//!
//! A thin layer over a `scraper::Html` tree that adds what a browser page
//! gives a script and `scraper` does not:
//! - writes (`set_inner_html`, `set_attribute`, `append_html`, `remove`)
//! - mutation observers fed by those writes
//! - media reload requests
//!
//! Selector matching is `scraper`'s. Every write goes through this type, so
//! the page's own changes and the overrider's changes produce the same
//! mutation records.
//!
//! # Example
//!
//! ```ignore
//! let mut doc = Document::parse("<body><p id=a>hi</p></body>");
//! let body = doc.body().unwrap();
//! let observer = doc.observe(body, ObserveOptions::subtree_with_attributes(&[]));
//! doc.append_html(body, "<p>new</p>")?;
//! assert_eq!(doc.take_records(observer).len(), 1);
//! ```

mod fragment;
mod mutation;

pub use ego_tree::NodeId;
pub use fragment::Fragment;
pub use mutation::{MutationKind, MutationRecord, ObserveOptions, ObserverId};

use std::sync::LazyLock;

use ego_tree::{NodeRef, Tree};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

use crate::utils::html::{element_markup, is_raw_text_element};
use mutation::Observers;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("`body` is a valid selector"));

/// Errors raised by document writes and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("node is not an element")]
    NotAnElement,

    #[error("node is not attached to the document")]
    Detached,

    #[error("`<{tag}>` is not a media element")]
    NotMedia { tag: String },

    #[error("`<{tag}>` does not hold raw text")]
    NotRawText { tag: String },
}

/// Parse a selector, turning the engine's error into a `DomError`.
pub fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|err| DomError::InvalidSelector {
        selector: selector.to_owned(),
        reason: err.to_string(),
    })
}

/// A live, observable HTML document.
pub struct Document {
    html: Html,
    observers: Observers,
    reloads: Vec<NodeId>,
}

impl Document {
    /// Parse a complete HTML document.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
            observers: Observers::default(),
            reloads: Vec::new(),
        }
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn body(&self) -> Option<NodeId> {
        self.select_all(&BODY_SELECTOR).into_iter().next()
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.value().name())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.value().attr(name))
    }

    pub fn inner_html(&self, id: NodeId) -> Option<String> {
        self.element(id).map(|el| el.inner_html())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self, id: NodeId) -> Option<String> {
        self.element(id).map(|el| el.text().collect())
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.html.tree.get(id)?.parent()?;
        parent.value().is_element().then(|| parent.id())
    }

    /// Element children in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(id)
            .map(|node| {
                node.children()
                    .filter(|child| child.value().is_element())
                    .map(|child| child.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the node is still reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let root = self.html.tree.root().id();
        self.html
            .tree
            .get(id)
            .is_some_and(|node| node.id() == root || node.ancestors().any(|a| a.id() == root))
    }

    /// Whether the element itself matches `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_some_and(|el| selector.matches(&el))
    }

    /// Descendants of `scope` (not `scope` itself) matching `selector`.
    pub fn select_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.element(scope)
            .map(|el| el.select(selector).map(|m| m.id()).collect())
            .unwrap_or_default()
    }

    /// `scope` itself when it matches, then its matching descendants.
    pub fn select_inclusive(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        if self.matches(scope, selector) {
            found.push(scope);
        }
        found.extend(self.select_within(scope, selector));
        found
    }

    /// Every connected element of the document matching `selector`.
    ///
    /// Walks from the root instead of using `Html::select`, which scans the
    /// whole node arena and so still yields the contents of removed subtrees.
    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| el.id())
            .collect()
    }

    /// String-selector convenience over [`Document::select_all`].
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(self.select_all(&parse_selector(selector)?))
    }

    pub fn query_first(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query(selector)?.into_iter().next())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Replace all children of `id` with a copy of `fragment`.
    ///
    /// Returns `Ok(false)` without touching the tree when the current
    /// content already equals the fragment's canonical rendering.
    pub fn set_inner_html(&mut self, id: NodeId, fragment: &Fragment) -> Result<bool, DomError> {
        let current = self.inner_html(id).ok_or(DomError::NotAnElement)?;
        if current == fragment.canonical() {
            return Ok(false);
        }

        let removed = detach_children(&mut self.html.tree, id);
        let added = fragment
            .nodes()
            .filter_map(|node| graft(&mut self.html.tree, id, node))
            .collect();

        self.queue(MutationRecord::child_list(id, added, removed));
        Ok(true)
    }

    /// Parse `markup` and append the resulting nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DomError> {
        if !self.is_element(parent) {
            return Err(DomError::NotAnElement);
        }

        let fragment = Fragment::parse(markup);
        let added: Vec<NodeId> = fragment
            .nodes()
            .filter_map(|node| graft(&mut self.html.tree, parent, node))
            .collect();

        self.queue(MutationRecord::child_list(parent, added.clone(), Vec::new()));
        Ok(added)
    }

    /// Detach `id` from its parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self
            .html
            .tree
            .get(id)
            .and_then(|node| node.parent())
            .map(|p| p.id())
            .ok_or(DomError::Detached)?;

        // Record while the parent chain is still intact.
        self.queue(MutationRecord::child_list(parent, Vec::new(), vec![id]));
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
        Ok(())
    }

    /// Set (or add) an attribute on an element.
    ///
    /// `scraper` elements are immutable, so the node's value is swapped for
    /// a new element with the same qualified name and updated attributes.
    /// Children, position and namespace are untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element(id).ok_or(DomError::NotAnElement)?.value();
        let old_value = element.attr(name).map(str::to_owned);

        let mut attrs: Vec<Attribute> = element
            .attrs
            .iter()
            .map(|(key, current)| Attribute {
                name: key.clone(),
                value: if &*key.local == name {
                    StrTendril::from(value)
                } else {
                    StrTendril::from(&**current)
                },
            })
            .collect();
        if old_value.is_none() {
            attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from(value),
            });
        }
        let replacement = Element::new(element.name.clone(), attrs);

        if let Some(mut node) = self.html.tree.get_mut(id) {
            *node.value() = Node::Element(replacement);
        }
        self.queue(MutationRecord::attribute(id, name, old_value));
        Ok(())
    }

    /// Replace the text of a raw text element (`<style>`, `<script>`).
    pub fn set_raw_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let tag = self.tag_name(id).ok_or(DomError::NotAnElement)?.to_owned();
        if !is_raw_text_element(&tag) {
            return Err(DomError::NotRawText { tag });
        }

        let rebuilt = Html::parse_fragment(&element_markup(&tag, std::iter::empty(), text));
        let Some(source) = rebuilt
            .root_element()
            .children()
            .find(|node| node.value().as_element().is_some_and(|el| el.name() == tag))
        else {
            return Err(DomError::NotRawText { tag });
        };

        let removed = detach_children(&mut self.html.tree, id);
        let added = source
            .children()
            .filter_map(|node| graft(&mut self.html.tree, id, node))
            .collect();
        self.queue(MutationRecord::child_list(id, added, removed));
        Ok(())
    }

    /// Ask a `<video>`/`<audio>` element to reload its media.
    pub fn request_reload(&mut self, id: NodeId) -> Result<(), DomError> {
        let tag = self.tag_name(id).ok_or(DomError::NotAnElement)?;
        if !matches!(tag, "video" | "audio") {
            return Err(DomError::NotMedia {
                tag: tag.to_owned(),
            });
        }
        if !self.is_connected(id) {
            return Err(DomError::Detached);
        }
        self.reloads.push(id);
        Ok(())
    }

    /// Media elements asked to reload, oldest first.
    pub fn reload_requests(&self) -> &[NodeId] {
        &self.reloads
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        self.observers.register(target, options)
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.disconnect(observer)
    }

    /// Drain the records queued for `observer`.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take(observer)
    }

    /// Whether any observer has undelivered records.
    pub fn has_pending_records(&self) -> bool {
        self.observers.has_pending()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn queue(&mut self, record: MutationRecord) {
        let tree = &self.html.tree;
        self.observers.dispatch(&record, |observed, target| {
            tree.get(target)
                .is_some_and(|node| node.ancestors().any(|a| a.id() == observed))
        });
    }
}

/// Detach every child of `id`, returning the detached ids.
fn detach_children(tree: &mut Tree<Node>, id: NodeId) -> Vec<NodeId> {
    let children: Vec<NodeId> = tree
        .get(id)
        .map(|node| node.children().map(|c| c.id()).collect())
        .unwrap_or_default();

    for child in &children {
        if let Some(mut node) = tree.get_mut(*child) {
            node.detach();
        }
    }
    children
}

/// Deep-copy `source` (from another tree) as the last child of `parent`.
fn graft(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        graft(tree, id, child);
    }
    Some(id)
}
