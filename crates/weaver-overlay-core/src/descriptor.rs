//! Element descriptors: serializable snapshots of a node for the controller.
//!
//! A descriptor is built once per event and never mutated afterwards, except
//! for the tag rewrite a style preset applies to a pending session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::is_text_tag;
use crate::config::OverlayConfig;
use crate::host::{DocumentHost, NodeId, Rect};
use crate::types::ModeFamily;

/// Computed style properties included in every descriptor.
pub const DESCRIBED_STYLES: [&str; 17] = [
    "display",
    "position",
    "width",
    "height",
    "margin",
    "padding",
    "border",
    "background",
    "color",
    "font-size",
    "font-weight",
    "font-style",
    "font-family",
    "text-align",
    "flex-direction",
    "justify-content",
    "align-items",
];

/// Attributes shown in `displayText` besides id and class.
const DISPLAY_ATTRIBUTES: [&str; 6] = ["type", "name", "href", "src", "alt", "title"];

const DISPLAY_CLASS_LIMIT: usize = 3;
const DISPLAY_ATTRIBUTE_LIMIT: usize = 30;
const DISPLAY_TEXT_LIMIT: usize = 50;
const LOC_PATH_LIMIT: usize = 10;
const CSS_PATH_LIMIT: usize = 5;

/// Source label attribute carried by rendered nodes (`file:line[:col]`).
pub const LOC_ATTRIBUTE: &str = "data-loc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Snapshot of an element as reported to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    /// Upper-case, DOM style.
    pub tag_name: String,
    /// Class attribute without the overlay's own highlight classes.
    pub class_name: String,
    pub id: String,
    pub text_content: String,
    pub styles: BTreeMap<String, String>,
    pub rect: Rect,
    pub selector: String,
    pub display_text: String,
    pub element_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_line: Option<String>,
    pub is_text_element: bool,
    /// Every attribute in document order, as it was when described.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl ElementDescriptor {
    /// Lower-case tag, for creating a node of the same kind.
    pub fn tag(&self) -> String {
        self.tag_name.to_ascii_lowercase()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

fn is_overlay_class(class: &str) -> bool {
    ModeFamily::ALL
        .iter()
        .any(|family| family.highlight_class() == class)
}

/// Page classes of a node, overlay highlight classes removed.
pub fn page_classes<D: DocumentHost>(doc: &D, node: NodeId) -> Vec<String> {
    doc.class_names(node)
        .into_iter()
        .filter(|class| !is_overlay_class(class))
        .collect()
}

fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => (&text[..cut], true),
        None => (text, false),
    }
}

fn selector(tag: &str, id: &str, classes: &[String]) -> String {
    let mut selector = tag.to_string();
    if !id.is_empty() {
        selector.push('#');
        selector.push_str(id);
    }
    if !classes.is_empty() {
        let shown: Vec<&str> = classes
            .iter()
            .take(DISPLAY_CLASS_LIMIT)
            .map(String::as_str)
            .collect();
        selector.push('.');
        selector.push_str(&shown.join("."));
    }
    selector
}

fn display_text<D: DocumentHost>(
    doc: &D,
    node: NodeId,
    tag: &str,
    id: &str,
    classes: &[String],
    text: &str,
) -> String {
    let mut out = format!("<{}", tag);
    if !id.is_empty() {
        out.push_str(&format!(" id=\"{}\"", id));
    }
    if !classes.is_empty() {
        let mut shown = classes
            .iter()
            .take(DISPLAY_CLASS_LIMIT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if classes.len() > DISPLAY_CLASS_LIMIT {
            shown.push_str("...");
        }
        out.push_str(&format!(" class=\"{}\"", shown));
    }
    for name in DISPLAY_ATTRIBUTES {
        if let Some(value) = doc.attribute(node, name).filter(|v| !v.is_empty()) {
            let (head, cut) = truncate_chars(&value, DISPLAY_ATTRIBUTE_LIMIT);
            let ellipsis = if cut { "..." } else { "" };
            out.push_str(&format!(" {}=\"{}{}\"", name, head, ellipsis));
        }
    }
    out.push('>');
    if is_text_tag(tag) {
        let (preview, cut) = truncate_chars(text.trim(), DISPLAY_TEXT_LIMIT);
        out.push_str(preview);
        if cut {
            out.push_str("...");
        }
    }
    out.push_str(&format!("</{}>", tag));
    out
}

/// Walk from `node` up to (not including) `<body>`/`<html>`.
fn ancestry<D: DocumentHost>(doc: &D, node: NodeId) -> impl Iterator<Item = NodeId> {
    let stops = [doc.body(), doc.document_element()];
    std::iter::successors(Some(node), move |current| doc.parent(*current))
        .take_while(move |current| doc.is_element(*current) && !stops.contains(&Some(*current)))
}

fn loc_path<D: DocumentHost>(doc: &D, node: NodeId) -> String {
    let mut labels: Vec<String> = ancestry(doc, node)
        .filter_map(|n| doc.attribute(n, LOC_ATTRIBUTE))
        .take(LOC_PATH_LIMIT)
        .collect();
    labels.reverse();
    labels.join(" > ")
}

fn css_path<D: DocumentHost>(doc: &D, node: NodeId) -> String {
    let mut segments: Vec<String> = ancestry(doc, node)
        .take(CSS_PATH_LIMIT)
        .map(|n| {
            let mut segment = doc.tag_name(n).unwrap_or_default();
            match doc.attribute(n, "id").filter(|id| !id.is_empty()) {
                Some(id) => {
                    segment.push('#');
                    segment.push_str(&id);
                }
                None => {
                    if let Some(first) = page_classes(doc, n).first() {
                        segment.push('.');
                        segment.push_str(first);
                    }
                }
            }
            segment
        })
        .collect();
    segments.reverse();
    segments.join(" > ")
}

/// Source-label path when any ancestor carries one, else a CSS-like path.
pub fn element_path<D: DocumentHost>(doc: &D, node: NodeId) -> String {
    let path = loc_path(doc, node);
    if path.is_empty() {
        css_path(doc, node)
    } else {
        path
    }
}

/// Snapshot `node`. Never mutates the document.
pub fn describe<D: DocumentHost>(doc: &D, node: NodeId, config: &OverlayConfig) -> ElementDescriptor {
    let tag = doc.tag_name(node).unwrap_or_default();
    let classes = page_classes(doc, node);
    let id = doc.attribute(node, "id").unwrap_or_default();
    let text = doc.text_content(node);

    let styles = DESCRIBED_STYLES
        .iter()
        .filter_map(|prop| {
            doc.computed_style(node, prop)
                .filter(|v| !v.is_empty())
                .map(|v| (prop.to_string(), v))
        })
        .collect();

    let (repo_file_path, repo_line) = match doc.attribute(node, LOC_ATTRIBUTE) {
        Some(loc) => {
            let mut fields = loc.split(':');
            (
                fields.next().map(str::to_string),
                fields.next().map(str::to_string),
            )
        }
        None => (None, None),
    };

    let attributes = doc
        .attributes(node)
        .into_iter()
        .map(|(name, value)| Attribute { name, value })
        .collect();

    ElementDescriptor {
        tag_name: tag.to_ascii_uppercase(),
        class_name: classes.join(" "),
        selector: selector(&tag, &id, &classes),
        display_text: display_text(doc, node, &tag, &id, &classes, &text),
        element_path: element_path(doc, node),
        text_content: truncate_chars(&text, config.text_preview_len).0.to_string(),
        id,
        styles,
        rect: doc.bounding_rect(node),
        repo_file_path,
        repo_line,
        is_text_element: is_text_tag(&tag),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    #[test]
    fn test_basic_fields() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let p = doc.append_element(
            body,
            "p",
            &[("id", "intro"), ("class", "lead big editor-highlight")],
        );
        doc.append_text(p, "  Hello there  ");
        doc.set_computed_style(p, "color", "rgb(0, 0, 0)");
        doc.set_computed_style(p, "display", "block");
        doc.set_rect(p, Rect::new(10.0, 20.0, 300.0, 40.0));

        let d = describe(&doc, p, &OverlayConfig::default());
        assert_eq!(d.tag_name, "P");
        assert_eq!(d.class_name, "lead big");
        assert_eq!(d.id, "intro");
        assert_eq!(d.text_content, "  Hello there  ");
        assert_eq!(d.selector, "p#intro.lead.big");
        assert_eq!(
            d.display_text,
            "<p id=\"intro\" class=\"lead big\">Hello there</p>"
        );
        assert_eq!(d.styles.len(), 2);
        assert_eq!(d.styles["display"], "block");
        assert_eq!(d.rect.top, 20.0);
        assert!(d.is_text_element);
        assert_eq!(d.attributes.len(), 2);
        assert_eq!(d.attribute("id"), Some("intro"));
    }

    #[test]
    fn test_display_text_truncation() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let long_href = format!("https://example.com/{}", "x".repeat(40));
        let a = doc.append_element(body, "a", &[("class", "a b c d"), ("href", &long_href)]);
        doc.append_text(a, &"y".repeat(60));

        let d = describe(&doc, a, &OverlayConfig::default());
        let expected = format!(
            "<a class=\"a b c...\" href=\"https://example.com/xxxxxxxxxx...\">{}...</a>",
            "y".repeat(50)
        );
        assert_eq!(d.display_text, expected);
        assert_eq!(d.selector, "a.a.b.c");
    }

    #[test]
    fn test_non_text_tag_has_no_preview() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.append_element(body, "div", &[]);
        doc.append_text(div, "content");

        let d = describe(&doc, div, &OverlayConfig::default());
        assert_eq!(d.display_text, "<div></div>");
        assert!(!d.is_text_element);
    }

    #[test]
    fn test_text_preview_limit() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let p = doc.append_element(body, "p", &[]);
        doc.append_text(p, &"é".repeat(150));

        let config = OverlayConfig::default();
        let d = describe(&doc, p, &config);
        assert_eq!(d.text_content.chars().count(), 100);
    }

    #[test]
    fn test_loc_path_and_repo_fields() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let section = doc.append_element(body, "section", &[("data-loc", "src/App.tsx:10:4")]);
        let wrapper = doc.append_element(section, "div", &[]);
        let h1 = doc.append_element(wrapper, "h1", &[("data-loc", "src/Hero.tsx:3:8")]);

        let d = describe(&doc, h1, &OverlayConfig::default());
        assert_eq!(d.element_path, "src/App.tsx:10:4 > src/Hero.tsx:3:8");
        assert_eq!(d.repo_file_path.as_deref(), Some("src/Hero.tsx"));
        assert_eq!(d.repo_line.as_deref(), Some("3"));
    }

    #[test]
    fn test_css_path_fallback() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let main = doc.append_element(body, "main", &[("id", "root")]);
        let div = doc.append_element(main, "div", &[("class", "card shadow")]);
        let span = doc.append_element(div, "span", &[]);

        assert_eq!(element_path(&doc, span), "main#root > div.card > span");

        let d = describe(&doc, span, &OverlayConfig::default());
        assert_eq!(d.repo_file_path, None);
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("repoFilePath").is_none());
        assert_eq!(json["tagName"], "SPAN");
    }

    #[test]
    fn test_css_path_capped() {
        let mut doc = MemoryDocument::new();
        let mut parent = doc.body().unwrap();
        for _ in 0..8 {
            parent = doc.append_element(parent, "div", &[]);
        }
        let path = element_path(&doc, parent);
        assert_eq!(path.split(" > ").count(), 5);
    }
}
