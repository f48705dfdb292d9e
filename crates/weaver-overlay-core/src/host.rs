//! Host abstraction traits for the overlay.
//!
//! These traits define the interface between the overlay state machine and
//! the document it runs against. The browser implementation wraps the live
//! DOM, `MemoryDocument` keeps an arena in memory for tests and headless use.

use serde::{Deserialize, Serialize};

use crate::types::ModeFamily;

/// Handle to a node in the hosted document.
///
/// Handles are identity only: they never own the node. A handle whose node
/// has been freed (or whose slot has been reused) resolves to nothing, so a
/// stale reference held across a tree mutation degrades to a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Kind of node behind a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Comments, processing instructions, doctype.
    Other,
}

/// Bounding box of a rendered element, in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            top: y,
            left: x,
        }
    }
}

/// Read/write access to the hosted document.
///
/// Tag names are reported lower-case. All mutating methods are best effort:
/// a stale handle is ignored rather than reported, matching how the overlay
/// treats every failure as a benign no-op.
pub trait DocumentHost {
    // === Required: tree structure ===

    /// The root `<html>` element.
    fn document_element(&self) -> Option<NodeId>;

    /// The `<body>` element.
    fn body(&self) -> Option<NodeId>;

    /// The `<head>` element, where overlay style sheets are mounted.
    fn head(&self) -> Option<NodeId>;

    /// Whether the handle still resolves to a node.
    ///
    /// Lookups take `&self`; hosts that allocate handles lazily keep their
    /// registry behind interior mutability.
    fn contains(&self, node: NodeId) -> bool;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Lower-case tag name for elements, `None` for other nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// All child nodes, text included, in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: NodeId) -> String;

    /// Look up an element by id.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    // === Required: attributes and style ===

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Every attribute in document order.
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Resolved style value for a CSS property (kebab-case).
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Value declared on the element's own `style` attribute.
    fn inline_style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_inline_style(&mut self, node: NodeId, property: &str, value: &str);

    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Height of the node's content including overflow.
    fn scroll_height(&self, node: NodeId) -> f64;

    // === Required: mutation ===

    fn create_element(&mut self, tag: &str) -> Option<NodeId>;

    fn create_text(&mut self, text: &str) -> Option<NodeId>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool;

    /// Put `replacement` where `old` is. `old` stays alive but detached.
    fn replace_node(&mut self, old: NodeId, replacement: NodeId) -> bool;

    /// Detach a node from its parent.
    fn remove_node(&mut self, node: NodeId);

    /// Replace all children with a single text node. Never interprets markup.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    // === Required: text input surfaces ===

    /// Current value of a text input surface.
    fn input_value(&self, node: NodeId) -> Option<String>;

    fn set_input_value(&mut self, node: NodeId, value: &str);

    fn focus(&mut self, node: NodeId);

    // === Provided ===

    /// Intrinsic pixel size of an image element, if loaded.
    fn natural_size(&self, _node: NodeId) -> Option<(u32, u32)> {
        None
    }

    /// Drop host bookkeeping for every handle not in `keep`.
    ///
    /// Called after each handled event with the handles the overlay still
    /// references. Hosts that own their nodes outright can ignore it.
    fn retain_handles(&mut self, _keep: &[NodeId]) {}

    fn is_element(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Element)
    }

    /// Child elements only.
    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    fn class_names(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_names(node).iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let mut classes = self.class_names(node);
        classes.push(class.to_string());
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let classes: Vec<String> = self
            .class_names(node)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        if classes.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &classes.join(" "));
        }
    }

    /// Move every child of `from` to the end of `to`, keeping order.
    fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from) {
            self.append_child(to, child);
        }
    }
}

/// Capture-phase event wiring for the overlay.
///
/// Each subscribe call hands back an owned subscription; dropping it
/// detaches the listeners. The overlay never pairs add/remove calls by hand.
pub trait ListenerRegistry {
    type Subscription;

    /// Attach pointer-move, click and pointer-leave listeners for a mode.
    fn subscribe_pointer(&mut self, family: ModeFamily) -> Option<Self::Subscription>;

    /// Attach the input listener of a surrogate text surface.
    fn subscribe_input(&mut self, surrogate: NodeId) -> Option<Self::Subscription>;
}
