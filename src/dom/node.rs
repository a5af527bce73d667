//! Element Arena - Elements, attributes, classes, styles and geometry.
//!
//! Elements are indices into a thread-local arena, the same way components are
//! indices into parallel arrays elsewhere in the spark family. Three well-known
//! nodes always exist: the document root, the body (child of the root) and the
//! window (outside the tree, top of every event path).
//!
//! Operations on removed or unknown elements are silent no-ops; reads return
//! `None` / defaults.

use std::cell::RefCell;

use crate::types::Rect;

// =============================================================================
// TYPES
// =============================================================================

/// Handle to an element in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

pub(crate) struct Node {
    pub tag: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub attributes: Vec<(String, String)>,
    pub classes: Vec<String>,
    pub styles: Vec<(String, String)>,
    pub rect: Rect,
    pub rect_reads: u64,
    /// Raw value property once written (range inputs only).
    pub dirty_value: Option<String>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            classes: Vec::new(),
            styles: Vec::new(),
            rect: Rect::default(),
            rect_reads: 0,
            dirty_value: None,
        }
    }
}

struct Document {
    nodes: Vec<Option<Node>>,
}

const ROOT: ElementId = ElementId(0);
const BODY: ElementId = ElementId(1);
const WINDOW: ElementId = ElementId(2);

impl Document {
    fn new() -> Self {
        let mut root = Node::new("#document");
        let mut body = Node::new("body");
        body.parent = Some(ROOT);
        root.children.push(BODY);
        Self {
            nodes: vec![Some(root), Some(body), Some(Node::new("#window"))],
        }
    }
}

thread_local! {
    static DOCUMENT: RefCell<Document> = RefCell::new(Document::new());
}

pub(crate) fn with_node<R>(el: ElementId, f: impl FnOnce(&Node) -> R) -> Option<R> {
    DOCUMENT.with(|doc| doc.borrow().nodes.get(el.0).and_then(|n| n.as_ref()).map(f))
}

pub(crate) fn with_node_mut<R>(el: ElementId, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
    DOCUMENT.with(|doc| {
        doc.borrow_mut()
            .nodes
            .get_mut(el.0)
            .and_then(|n| n.as_mut())
            .map(f)
    })
}

// =============================================================================
// TREE
// =============================================================================

/// The document root. Capture listeners here observe every event in the tree.
pub fn document_root() -> ElementId {
    ROOT
}

/// The document body.
pub fn body() -> ElementId {
    BODY
}

/// The window. Sits above the document root in every event path.
pub fn window() -> ElementId {
    WINDOW
}

/// Create a detached element.
pub fn create_element(tag: &str) -> ElementId {
    DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        doc.nodes.push(Some(Node::new(tag)));
        ElementId(doc.nodes.len() - 1)
    })
}

/// Append `child` under `parent`, detaching it from any previous parent.
pub fn append_child(parent: ElementId, child: ElementId) {
    if parent == child || !exists(parent) || !exists(child) {
        return;
    }
    detach(child);
    with_node_mut(child, |n| n.parent = Some(parent));
    with_node_mut(parent, |n| n.children.push(child));
}

fn detach(el: ElementId) {
    if let Some(Some(old)) = with_node(el, |n| n.parent) {
        with_node_mut(old, |n| n.children.retain(|c| *c != el));
    }
    with_node_mut(el, |n| n.parent = None);
}

/// Parent of an element, if attached.
pub fn parent(el: ElementId) -> Option<ElementId> {
    with_node(el, |n| n.parent).flatten()
}

/// Children in insertion order.
pub fn children(el: ElementId) -> Vec<ElementId> {
    with_node(el, |n| n.children.clone()).unwrap_or_default()
}

/// Whether the element exists (was created and not removed).
pub fn exists(el: ElementId) -> bool {
    with_node(el, |_| ()).is_some()
}

/// Lowercase tag name.
pub fn tag_name(el: ElementId) -> Option<String> {
    with_node(el, |n| n.tag.clone())
}

/// Whether `el` is `ancestor` or lives somewhere below it.
pub fn contains(ancestor: ElementId, el: ElementId) -> bool {
    let mut current = Some(el);
    while let Some(node) = current {
        if node == ancestor {
            return true;
        }
        current = parent(node);
    }
    false
}

/// Whether the element is connected to the document root.
pub fn is_connected(el: ElementId) -> bool {
    contains(ROOT, el)
}

/// Remove an element and its subtree. Listeners on removed nodes are dropped.
pub fn remove_element(el: ElementId) {
    if el == ROOT || el == BODY || el == WINDOW {
        return;
    }
    detach(el);
    let mut stack = vec![el];
    while let Some(node) = stack.pop() {
        stack.extend(children(node));
        super::event::remove_listeners_for(node);
        DOCUMENT.with(|doc| {
            if let Some(slot) = doc.borrow_mut().nodes.get_mut(node.0) {
                *slot = None;
            }
        });
    }
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// Set (or replace) an attribute.
pub fn set_attribute(el: ElementId, name: &str, value: &str) {
    with_node_mut(el, |n| {
        match n.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => n.attributes.push((name.to_string(), value.to_string())),
        }
    });
}

/// Read an attribute.
pub fn get_attribute(el: ElementId, name: &str) -> Option<String> {
    with_node(el, |n| {
        n.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    })
    .flatten()
}

/// Whether an attribute is present.
pub fn has_attribute(el: ElementId, name: &str) -> bool {
    with_node(el, |n| n.attributes.iter().any(|(k, _)| k == name)).unwrap_or(false)
}

/// Remove an attribute if present.
pub fn remove_attribute(el: ElementId, name: &str) {
    with_node_mut(el, |n| n.attributes.retain(|(k, _)| k != name));
}

// =============================================================================
// CLASSES
// =============================================================================

pub fn add_class(el: ElementId, class: &str) {
    with_node_mut(el, |n| {
        if !n.classes.iter().any(|c| c == class) {
            n.classes.push(class.to_string());
        }
    });
}

pub fn remove_class(el: ElementId, class: &str) {
    with_node_mut(el, |n| n.classes.retain(|c| c != class));
}

pub fn has_class(el: ElementId, class: &str) -> bool {
    with_node(el, |n| n.classes.iter().any(|c| c == class)).unwrap_or(false)
}

/// Toggle a class on or off.
pub fn set_class(el: ElementId, class: &str, on: bool) {
    if on {
        add_class(el, class);
    } else {
        remove_class(el, class);
    }
}

// =============================================================================
// STYLES
// =============================================================================

pub fn set_style(el: ElementId, property: &str, value: &str) {
    with_node_mut(el, |n| {
        match n.styles.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => n.styles.push((property.to_string(), value.to_string())),
        }
    });
}

pub fn remove_style(el: ElementId, property: &str) {
    with_node_mut(el, |n| n.styles.retain(|(k, _)| k != property));
}

pub fn style(el: ElementId, property: &str) -> Option<String> {
    with_node(el, |n| {
        n.styles
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.clone())
    })
    .flatten()
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Set the layout rectangle the host computed for an element.
pub fn set_bounding_rect(el: ElementId, rect: Rect) {
    with_node_mut(el, |n| n.rect = rect);
}

/// Read an element's rectangle. Every call counts as one synchronous layout read.
pub fn bounding_client_rect(el: ElementId) -> Rect {
    with_node_mut(el, |n| {
        n.rect_reads += 1;
        n.rect
    })
    .unwrap_or_default()
}

/// Number of synchronous rectangle reads performed on an element.
pub fn rect_reads(el: ElementId) -> u64 {
    with_node(el, |n| n.rect_reads).unwrap_or(0)
}

pub(crate) fn reset_nodes() {
    DOCUMENT.with(|doc| *doc.borrow_mut() = Document::new());
}

// =============================================================================
// TESTS
// =============================================================================
