//! `DocumentHost` over the live DOM.
//!
//! DOM nodes are garbage collected JS objects, so handles can't point into an
//! arena we own. Instead every node the overlay looks at is interned into a
//! small registry and handed out as a generational `NodeId`. The overlay
//! reports which handles it still holds after each event and the rest are
//! released, which keeps the registry at a handful of entries.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement, Node,
};
use weaver_overlay_core::{DocumentHost, NodeId, NodeKind, OverlayError, Rect};

/// Map a failed DOM call into an `OverlayError::Host` and log it.
pub(crate) fn host_error(context: &str, error: JsValue) -> OverlayError {
    let error = OverlayError::Host(format!("{context}: {error:?}"));
    tracing::warn!(%error, "dom call failed");
    error
}

fn logged<T>(context: &str, result: Result<T, JsValue>) -> Option<T> {
    result.map_err(|e| host_error(context, e)).ok()
}

#[derive(Debug)]
struct Slot {
    node: Option<Node>,
    generation: u32,
}

/// Interned nodes. Slots are reused with a bumped generation so stale
/// handles stop resolving.
#[derive(Debug, Default)]
struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Registry {
    fn find(&self, node: &Node) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.node
                .as_ref()
                .filter(|held| held.is_same_node(Some(node)))
                .map(|_| NodeId::new(index as u32, slot.generation))
        })
    }

    fn intern(&mut self, node: &Node) -> NodeId {
        if let Some(id) = self.find(node) {
            return id;
        }
        while let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.node = Some(node.clone());
                return NodeId::new(index, slot.generation);
            }
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            node: Some(node.clone()),
            generation: 0,
        });
        NodeId::new(index, 0)
    }

    fn resolve(&self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.clone()
    }

    fn release_except(&mut self, keep: &[NodeId]) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let id = NodeId::new(index as u32, slot.generation);
            if slot.node.is_some() && !keep.contains(&id) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
    }

    fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }
}

/// The hosting frame's document.
#[derive(Debug)]
pub struct DomDocument {
    document: Document,
    registry: RefCell<Registry>,
}

impl DomDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            registry: RefCell::new(Registry::default()),
        }
    }

    /// The current window's document, if there is one.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Handle for a DOM node, reusing an existing one if the node is known.
    pub fn intern(&self, node: &Node) -> NodeId {
        self.registry.borrow_mut().intern(node)
    }

    /// Handle for a node if it is already interned. Never allocates.
    pub fn lookup(&self, node: &Node) -> Option<NodeId> {
        self.registry.borrow().find(node)
    }

    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.registry.borrow().resolve(id)
    }

    pub fn element(&self, id: NodeId) -> Option<Element> {
        self.node(id)?.dyn_into::<Element>().ok()
    }

    fn html_element(&self, id: NodeId) -> Option<HtmlElement> {
        self.node(id)?.dyn_into::<HtmlElement>().ok()
    }

    /// Number of live handles.
    pub fn handle_count(&self) -> usize {
        self.registry.borrow().live()
    }
}

impl DocumentHost for DomDocument {
    fn document_element(&self) -> Option<NodeId> {
        let root = self.document.document_element()?;
        Some(self.intern(&root))
    }

    fn body(&self) -> Option<NodeId> {
        let body = self.document.body()?;
        Some(self.intern(&body))
    }

    fn head(&self) -> Option<NodeId> {
        let head = self.document.head()?;
        Some(self.intern(&head))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        let kind = match self.node(node)?.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        };
        Some(kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        Some(self.element(node)?.tag_name().to_ascii_lowercase())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        // Stops at <html>: the Document node isn't something the overlay walks.
        let parent = self.node(node)?.parent_element()?;
        Some(self.intern(&parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        let list = node.child_nodes();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|child| self.intern(&child))
            .collect()
    }

    fn text_content(&self, node: NodeId) -> String {
        self.node(node)
            .and_then(|n| n.text_content())
            .unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.intern(&element))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let map = element.attributes();
        (0..map.length())
            .filter_map(|i| map.item(i))
            .map(|attr| (attr.name(), attr.value()))
            .collect()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            logged("setAttribute", element.set_attribute(name, value));
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element(node) {
            logged("removeAttribute", element.remove_attribute(name));
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let element = self.element(node)?;
        let window = web_sys::window()?;
        let style = logged("getComputedStyle", window.get_computed_style(&element))??;
        logged("getPropertyValue", style.get_property_value(property)).filter(|v| !v.is_empty())
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        let style = self.html_element(node)?.style();
        logged("getPropertyValue", style.get_property_value(property)).filter(|v| !v.is_empty())
    }

    fn set_inline_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.html_element(node) {
            logged("setProperty", element.style().set_property(property, value));
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let Some(element) = self.element(node) else {
            return Rect::default();
        };
        let rect = element.get_bounding_client_rect();
        Rect {
            x: rect.x(),
            y: rect.y(),
            width: rect.width(),
            height: rect.height(),
            top: rect.top(),
            left: rect.left(),
        }
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        self.element(node)
            .map(|e| f64::from(e.scroll_height()))
            .unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        let element = logged("createElement", self.document.create_element(tag))?;
        Some(self.intern(&element))
    }

    fn create_text(&mut self, text: &str) -> Option<NodeId> {
        let text = self.document.create_text_node(text);
        Some(self.intern(&text))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) else {
            return false;
        };
        logged("appendChild", parent.append_child(&child)).is_some()
    }

    fn replace_node(&mut self, old: NodeId, replacement: NodeId) -> bool {
        let (Some(old), Some(replacement)) = (self.node(old), self.node(replacement)) else {
            return false;
        };
        let Some(parent) = old.parent_node() else {
            return false;
        };
        logged("replaceChild", parent.replace_child(&replacement, &old)).is_some()
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(node) = self.node(node)
            && let Some(parent) = node.parent_node()
        {
            logged("removeChild", parent.remove_child(&node));
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let Some(node) = self.node(node) {
            node.set_text_content(Some(text));
        }
    }

    fn input_value(&self, node: NodeId) -> Option<String> {
        let node = self.node(node)?;
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            return Some(area.value());
        }
        node.dyn_ref::<HtmlInputElement>().map(|input| input.value())
    }

    fn set_input_value(&mut self, node: NodeId, value: &str) {
        let Some(node) = self.node(node) else {
            return;
        };
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(element) = self.html_element(node) {
            logged("focus", element.focus());
        }
    }

    fn natural_size(&self, node: NodeId) -> Option<(u32, u32)> {
        let image = self.node(node)?.dyn_into::<HtmlImageElement>().ok()?;
        let size = (image.natural_width(), image.natural_height());
        (size.0 > 0 && size.1 > 0).then_some(size)
    }

    fn retain_handles(&mut self, keep: &[NodeId]) {
        self.registry.borrow_mut().release_except(keep);
    }
}
