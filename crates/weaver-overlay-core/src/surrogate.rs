//! Text surrogates: swapping a node for a textarea and splicing it back.
//!
//! A session starts when a selected plain-text node is replaced by a
//! `textarea` seeded with its text, and ends when `commit` rebuilds a node of
//! the original kind from the descriptor captured at the start. The original
//! node stays detached but alive for the whole session so the unchanged path
//! can hand its children back verbatim.

use std::collections::BTreeSet;

use crate::config::OverlayConfig;
use crate::descriptor::{ElementDescriptor, describe};
use crate::host::{DocumentHost, NodeId, NodeKind};
use crate::types::ModeFamily;

/// Class carried by every surrogate.
pub const SURROGATE_CLASS: &str = "text-editor-replaced-textarea";

/// Computed properties copied onto the surrogate so it renders in place.
pub const MIRRORED_PROPERTIES: [&str; 38] = [
    "display",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "border-radius",
    "background-color",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "word-spacing",
    "text-align",
    "text-transform",
    "text-decoration",
    "text-indent",
    "white-space",
    "overflow-wrap",
    "vertical-align",
];

/// Never copied: the surrogate sizes and positions itself.
pub const EXCLUDED_PROPERTIES: [&str; 7] = [
    "width",
    "height",
    "position",
    "z-index",
    "transform",
    "transition",
    "animation",
];

/// Formatting properties a commit may carry over onto the rebuilt node.
pub const FORMATTING_PROPERTIES: [&str; 4] = ["font-size", "font-style", "font-weight", "text-align"];

/// State of one active surrogate substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateSession {
    /// The textarea standing in for the original.
    pub surrogate: NodeId,
    /// The replaced node, detached.
    pub original: NodeId,
    /// Snapshot used to rebuild the node. A style preset may rewrite its tag.
    pub original_descriptor: ElementDescriptor,
    /// Text the surrogate was seeded with.
    pub original_text: String,
    formatted: BTreeSet<&'static str>,
}

impl SurrogateSession {
    /// Record that a formatting command touched `property` on the surrogate.
    pub fn mark_formatted(&mut self, property: &str) {
        if let Some(known) = FORMATTING_PROPERTIES.iter().copied().find(|p| *p == property) {
            self.formatted.insert(known);
        }
    }

    pub fn is_formatted(&self, property: &str) -> bool {
        self.formatted.contains(property)
    }

    /// Rewrite the tag the commit will build.
    pub fn retag(&mut self, tag: &str) {
        self.original_descriptor.tag_name = tag.to_ascii_uppercase();
    }
}

/// Editable text of a node: text nodes as-is, `<br>` as a newline, any
/// other element by its text content.
pub fn seed_text<D: DocumentHost>(doc: &D, node: NodeId) -> String {
    let mut text = String::new();
    for child in doc.children(node) {
        match doc.kind(child) {
            Some(NodeKind::Text) => text.push_str(&doc.text_content(child)),
            Some(NodeKind::Element) if doc.tag_name(child).as_deref() == Some("br") => {
                text.push('\n');
            }
            Some(NodeKind::Element) => text.push_str(&doc.text_content(child)),
            _ => {}
        }
    }
    text
}

fn mirror_styles<D: DocumentHost>(doc: &mut D, source: NodeId, surrogate: NodeId) {
    for property in MIRRORED_PROPERTIES {
        if let Some(value) = doc.computed_style(source, property).filter(|v| !v.is_empty()) {
            doc.set_inline_style(surrogate, property, &value);
        }
    }
    let width = doc.bounding_rect(source).width;
    doc.set_inline_style(surrogate, "width", &format!("{}px", width));
    doc.set_inline_style(surrogate, "height", "auto");
    doc.set_inline_style(surrogate, "resize", "none");
    doc.set_inline_style(surrogate, "outline", "none");
    doc.set_inline_style(surrogate, "box-sizing", "border-box");
}

/// Size the surrogate to its content.
pub fn grow<D: DocumentHost>(doc: &mut D, surrogate: NodeId) {
    let height = doc.scroll_height(surrogate);
    doc.set_inline_style(surrogate, "height", &format!("{}px", height));
}

/// Swap `node` for a seeded textarea.
///
/// Returns `None` (and leaves the document untouched) when the node can't be
/// replaced, e.g. because it is detached.
pub fn begin<D: DocumentHost>(
    doc: &mut D,
    node: NodeId,
    config: &OverlayConfig,
) -> Option<SurrogateSession> {
    doc.parent(node)?;
    let original_descriptor = describe(doc, node, config);
    let original_text = seed_text(doc, node);

    let surrogate = doc.create_element("textarea")?;
    doc.set_attribute(surrogate, "id", &config.marker_id);
    for (name, value) in doc.attributes(node) {
        if name.starts_with("data-") {
            doc.set_attribute(surrogate, &name, &value);
        }
    }
    doc.set_input_value(surrogate, &original_text);
    mirror_styles(doc, node, surrogate);
    doc.add_class(surrogate, SURROGATE_CLASS);
    doc.add_class(surrogate, ModeFamily::Edit.highlight_class());

    if !doc.replace_node(node, surrogate) {
        tracing::warn!("surrogate splice failed");
        return None;
    }
    grow(doc, surrogate);
    doc.focus(surrogate);

    tracing::debug!(
        tag = %original_descriptor.tag_name,
        chars = original_text.chars().count(),
        "surrogate session started"
    );

    Some(SurrogateSession {
        surrogate,
        original: node,
        original_descriptor,
        original_text,
        formatted: BTreeSet::new(),
    })
}

/// Append `value` to `node`, lines separated by `<br>` elements.
fn append_lines<D: DocumentHost>(doc: &mut D, node: NodeId, value: &str) {
    for (i, line) in value.split('\n').enumerate() {
        if i > 0
            && let Some(br) = doc.create_element("br")
        {
            doc.append_child(node, br);
        }
        if !line.is_empty()
            && let Some(text) = doc.create_text(line)
        {
            doc.append_child(node, text);
        }
    }
}

/// End the session: build the replacement node and splice it in place of
/// the surrogate.
///
/// `restored_id` is the id the original carried before it was marked. The
/// rebuilt node gets it back; it never gets the marker.
pub fn commit<D: DocumentHost>(
    doc: &mut D,
    session: SurrogateSession,
    restored_id: Option<&str>,
) -> Option<NodeId> {
    let descriptor = &session.original_descriptor;
    let node = doc.create_element(&descriptor.tag())?;

    let mut id_placed = false;
    for attribute in &descriptor.attributes {
        match attribute.name.as_str() {
            "id" => {
                if let Some(id) = restored_id {
                    doc.set_attribute(node, "id", id);
                    id_placed = true;
                }
            }
            "class" => {
                if !descriptor.class_name.is_empty() {
                    doc.set_attribute(node, "class", &descriptor.class_name);
                }
            }
            name => doc.set_attribute(node, name, &attribute.value),
        }
    }
    if let Some(id) = restored_id.filter(|_| !id_placed) {
        doc.set_attribute(node, "id", id);
    }

    let value = doc.input_value(session.surrogate).unwrap_or_default();
    let apply = !value.is_empty() && value != session.original_text;

    if apply {
        for property in FORMATTING_PROPERTIES {
            if session.is_formatted(property)
                && let Some(v) = doc.inline_style(session.surrogate, property)
            {
                doc.set_inline_style(node, property, &v);
            }
        }
        if value.contains('\n') {
            append_lines(doc, node, &value);
        } else {
            doc.set_text_content(node, &value);
        }
    } else {
        doc.move_children(session.original, node);
    }

    if !doc.replace_node(session.surrogate, node) {
        tracing::warn!("surrogate no longer attached, commit dropped");
        return None;
    }
    tracing::debug!(applied = apply, tag = %descriptor.tag_name, "surrogate committed");
    Some(node)
}
