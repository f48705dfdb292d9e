//! In-memory document host.
//!
//! `MemoryDocument` is a small arena-backed element tree implementing
//! `DocumentHost`, so the overlay can run headless (tests, server-side
//! previews) with the same state machine the browser uses. Computed style is
//! whatever was declared inline, falling back to values set through
//! [`MemoryDocument::set_computed_style`].
//!
//! `RecordingListeners` is the matching `ListenerRegistry`: subscriptions are
//! plain tokens that log when they are created and dropped.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::host::{DocumentHost, ListenerRegistry, NodeId, NodeKind, Rect};
use crate::types::ModeFamily;

/// Line height used to fake scroll height for text inputs.
const INPUT_LINE_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone)]
enum Content {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        computed: BTreeMap<String, String>,
        rect: Rect,
        natural_size: Option<(u32, u32)>,
        scroll_height: Option<f64>,
        /// Current value for `textarea`/`input` elements.
        value: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    content: Content,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed document for headless use.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    slots: Vec<Slot>,
    free: Vec<usize>,
    html: usize,
    head: usize,
    body: usize,
    focused: Option<NodeId>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document with an empty `<html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            html: 0,
            head: 0,
            body: 0,
            focused: None,
        };
        doc.html = doc.alloc(Self::element_content("html"));
        doc.head = doc.alloc(Self::element_content("head"));
        doc.body = doc.alloc(Self::element_content("body"));
        doc.link(doc.html, doc.head);
        doc.link(doc.html, doc.body);
        doc
    }

    fn element_content(tag: &str) -> Content {
        let tag = tag.to_ascii_lowercase();
        let value = matches!(tag.as_str(), "textarea" | "input").then(String::new);
        Content::Element {
            tag,
            attributes: Vec::new(),
            computed: BTreeMap::new(),
            rect: Rect::default(),
            natural_size: None,
            scroll_height: None,
            value,
        }
    }

    fn alloc(&mut self, content: Content) -> usize {
        let node = Node {
            content,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            self.slots[index].node = Some(node);
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            self.slots.len() - 1
        }
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId::new(index as u32, self.slots[index].generation)
    }

    fn resolve(&self, id: NodeId) -> Option<usize> {
        let index = id.index() as usize;
        let slot = self.slots.get(index)?;
        (slot.generation == id.generation() && slot.node.is_some()).then_some(index)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let index = self.resolve(id)?;
        self.slots[index].node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let index = self.resolve(id)?;
        self.slots[index].node.as_mut()
    }

    fn raw(&self, index: usize) -> Option<&Node> {
        self.slots.get(index)?.node.as_ref()
    }

    fn raw_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.slots.get_mut(index)?.node.as_mut()
    }

    fn link(&mut self, parent: usize, child: usize) {
        self.unlink(child);
        if let Some(node) = self.raw_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.raw_mut(parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, child: usize) {
        if let Some(parent) = self.raw_mut(child).and_then(|n| n.parent.take())
            && let Some(node) = self.raw_mut(parent)
        {
            node.children.retain(|c| *c != child);
        }
    }

    fn is_ancestor(&self, ancestor: usize, mut node: usize) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.raw(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn is_connected(&self, index: usize) -> bool {
        self.is_ancestor(self.html, index)
    }

    // === Builders ===

    /// Append a new element under `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let index = self.alloc(Self::element_content(tag));
        let id = self.handle(index);
        for (name, value) in attributes {
            self.set_attribute(id, name, value);
        }
        self.append_child(parent, id);
        id
    }

    /// Append a new text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let index = self.alloc(Content::Text(text.to_string()));
        let id = self.handle(index);
        self.append_child(parent, id);
        id
    }

    /// Set a style value as if it came from a stylesheet.
    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(Node {
            content: Content::Element { computed, .. },
            ..
        }) = self.node_mut(node)
        {
            computed.insert(property.to_string(), value.to_string());
        }
    }

    pub fn set_rect(&mut self, node: NodeId, new_rect: Rect) {
        if let Some(Node {
            content: Content::Element { rect, .. },
            ..
        }) = self.node_mut(node)
        {
            *rect = new_rect;
        }
    }

    pub fn set_natural_size(&mut self, node: NodeId, width: u32, height: u32) {
        if let Some(Node {
            content: Content::Element { natural_size, .. },
            ..
        }) = self.node_mut(node)
        {
            *natural_size = Some((width, height));
        }
    }

    /// Free a node and its subtree. Handles to it go stale.
    pub fn free(&mut self, node: NodeId) {
        let Some(index) = self.resolve(node) else {
            return;
        };
        self.unlink(index);
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            if let Some(node) = self.slots[index].node.take() {
                stack.extend(node.children);
            }
            self.slots[index].generation += 1;
            self.free.push(index);
        }
    }

    /// Node that last received focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether the node is attached under `<html>`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.resolve(node).is_some_and(|i| self.is_connected(i))
    }

    /// Number of live nodes, detached ones included.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Serialize the children of a node as markup.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.resolve(node).and_then(|index| self.raw(index)) {
            for child in &node.children {
                self.write_html(*child, &mut out);
            }
        }
        out
    }

    /// Serialize a node as markup.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(index) = self.resolve(node) {
            self.write_html(index, &mut out);
        }
        out
    }

    fn write_html(&self, index: usize, out: &mut String) {
        let Some(node) = self.raw(index) else {
            return;
        };
        match &node.content {
            Content::Text(text) => out.push_str(&escape_html(text)),
            Content::Element {
                tag, attributes, ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                if is_void_tag(tag) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let Some(node) = self.raw(index) else {
            return;
        };
        match &node.content {
            Content::Text(text) => out.push_str(text),
            Content::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn find_by_id(&self, index: usize, id: &str) -> Option<usize> {
        let node = self.raw(index)?;
        if let Content::Element { attributes, .. } = &node.content
            && attributes.iter().any(|(n, v)| n == "id" && v == id)
        {
            return Some(index);
        }
        node.children
            .iter()
            .find_map(|child| self.find_by_id(*child, id))
    }
}

fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "br" | "img" | "input" | "hr" | "meta" | "link")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parse a `style` attribute into ordered declarations.
fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            (!name.is_empty() && !value.is_empty())
                .then(|| (name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

fn format_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

impl DocumentHost for MemoryDocument {
    fn document_element(&self) -> Option<NodeId> {
        Some(self.handle(self.html))
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.handle(self.body))
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.handle(self.head))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.resolve(node).is_some()
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| match n.content {
            Content::Element { .. } => NodeKind::Element,
            Content::Text(_) => NodeKind::Text,
        })
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.content {
            Content::Element { tag, .. } => Some(tag.clone()),
            Content::Text(_) => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent?;
        Some(self.handle(parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.iter().map(|c| self.handle(*c)).collect())
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(index) = self.resolve(node) {
            self.collect_text(index, &mut out);
        }
        out
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_id(self.html, id).map(|i| self.handle(i))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.node(node)?.content {
            Content::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            Content::Text(_) => None,
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.node(node).map(|n| &n.content) {
            Some(Content::Element { attributes, .. }) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            content: Content::Element { attributes, .. },
            ..
        }) = self.node_mut(node)
        {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            content: Content::Element { attributes, .. },
            ..
        }) = self.node_mut(node)
        {
            attributes.retain(|(n, _)| n != name);
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        if let Some(value) = self.inline_style(node, property) {
            return Some(value);
        }
        match &self.node(node)?.content {
            Content::Element { computed, .. } => computed.get(property).cloned(),
            Content::Text(_) => None,
        }
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(node, "style")?;
        parse_declarations(&style)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    fn set_inline_style(&mut self, node: NodeId, property: &str, value: &str) {
        if !self.is_element(node) {
            return;
        }
        let mut declarations = self
            .attribute(node, "style")
            .map(|s| parse_declarations(&s))
            .unwrap_or_default();
        match declarations.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        self.set_attribute(node, "style", &format_declarations(&declarations));
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        match self.node(node).map(|n| &n.content) {
            Some(Content::Element { rect, .. }) => *rect,
            _ => Rect::default(),
        }
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        match self.node(node).map(|n| &n.content) {
            Some(Content::Element {
                scroll_height: Some(height),
                ..
            }) => *height,
            Some(Content::Element {
                value: Some(value), ..
            }) => value.split('\n').count() as f64 * INPUT_LINE_HEIGHT,
            Some(Content::Element { rect, .. }) => rect.height,
            _ => 0.0,
        }
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        let index = self.alloc(Self::element_content(tag));
        Some(self.handle(index))
    }

    fn create_text(&mut self, text: &str) -> Option<NodeId> {
        let index = self.alloc(Content::Text(text.to_string()));
        Some(self.handle(index))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let (Some(parent), Some(child)) = (self.resolve(parent), self.resolve(child)) else {
            return false;
        };
        if self.is_ancestor(child, parent) {
            return false;
        }
        self.link(parent, child);
        true
    }

    fn replace_node(&mut self, old: NodeId, replacement: NodeId) -> bool {
        let (Some(old), Some(new)) = (self.resolve(old), self.resolve(replacement)) else {
            return false;
        };
        let Some(parent) = self.raw(old).and_then(|n| n.parent) else {
            return false;
        };
        if old == new || self.is_ancestor(new, parent) {
            return false;
        }
        self.unlink(new);
        let Some(siblings) = self.raw_mut(parent).map(|n| &mut n.children) else {
            return false;
        };
        let Some(slot) = siblings.iter_mut().find(|c| **c == old) else {
            return false;
        };
        *slot = new;
        if let Some(node) = self.raw_mut(new) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.raw_mut(old) {
            node.parent = None;
        }
        true
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(index) = self.resolve(node) {
            self.unlink(index);
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        let Some(index) = self.resolve(node) else {
            return;
        };
        let children = self.raw(index).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.unlink(child);
        }
        if !text.is_empty() {
            let text_index = self.alloc(Content::Text(text.to_string()));
            self.link(index, text_index);
        }
    }

    fn input_value(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.content {
            Content::Element { value, .. } => value.clone(),
            Content::Text(_) => None,
        }
    }

    fn set_input_value(&mut self, node: NodeId, new_value: &str) {
        if let Some(Node {
            content: Content::Element {
                value: Some(value), ..
            },
            ..
        }) = self.node_mut(node)
        {
            *value = new_value.to_string();
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.contains(node) {
            self.focused = Some(node);
        }
    }

    fn natural_size(&self, node: NodeId) -> Option<(u32, u32)> {
        match &self.node(node)?.content {
            Content::Element { natural_size, .. } => *natural_size,
            Content::Text(_) => None,
        }
    }
}

// === Recording listener registry ===

/// What a subscription was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKey {
    Pointer(ModeFamily),
    Input(NodeId),
}

/// Shared log of subscriptions created and dropped.
#[derive(Debug, Default)]
pub struct ListenerLog {
    attached: Vec<ListenerKey>,
    detached: Vec<ListenerKey>,
}

impl ListenerLog {
    fn live(&self, matches: impl Fn(&ListenerKey) -> bool) -> usize {
        let attached = self.attached.iter().filter(|k| matches(k)).count();
        let detached = self.detached.iter().filter(|k| matches(k)).count();
        attached - detached
    }

    /// Live pointer subscriptions for a family.
    pub fn active_pointer(&self, family: ModeFamily) -> usize {
        self.live(|k| *k == ListenerKey::Pointer(family))
    }

    /// Live surrogate input subscriptions.
    pub fn active_input(&self) -> usize {
        self.live(|k| matches!(k, ListenerKey::Input(_)))
    }

    /// Every subscription ever made, in order.
    pub fn attached(&self) -> &[ListenerKey] {
        &self.attached
    }
}

/// Token returned by `RecordingListeners`; logs its own drop.
#[derive(Debug)]
pub struct Subscription {
    key: ListenerKey,
    log: Rc<RefCell<ListenerLog>>,
}

impl Subscription {
    pub fn key(&self) -> ListenerKey {
        self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.log.borrow_mut().detached.push(self.key);
    }
}

/// `ListenerRegistry` that only records what would be wired.
#[derive(Debug, Default, Clone)]
pub struct RecordingListeners {
    log: Rc<RefCell<ListenerLog>>,
}

impl RecordingListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the log, readable after the registry moved into
    /// an overlay.
    pub fn log(&self) -> Rc<RefCell<ListenerLog>> {
        self.log.clone()
    }

    fn subscribe(&mut self, key: ListenerKey) -> Subscription {
        self.log.borrow_mut().attached.push(key);
        Subscription {
            key,
            log: self.log.clone(),
        }
    }
}

impl ListenerRegistry for RecordingListeners {
    type Subscription = Subscription;

    fn subscribe_pointer(&mut self, family: ModeFamily) -> Option<Subscription> {
        Some(self.subscribe(ListenerKey::Pointer(family)))
    }

    fn subscribe_input(&mut self, surrogate: NodeId) -> Option<Subscription> {
        Some(self.subscribe(ListenerKey::Input(surrogate)))
    }
}
