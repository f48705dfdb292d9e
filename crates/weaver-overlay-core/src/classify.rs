//! Content classification: which nodes can be text-edited, which are images.

use crate::host::{DocumentHost, NodeId, NodeKind};
use crate::protocol::{ImageInfo, ImageKind};

/// Tags whose content is treated as editable text.
pub const TEXT_ELEMENTS: [&str; 11] = [
    "span", "p", "h1", "h2", "h3", "h4", "h5", "h6", "button", "a", "label",
];

pub fn is_text_tag(tag: &str) -> bool {
    TEXT_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Computed `background-image` is a real `url(...)`.
pub fn has_background_image<D: DocumentHost>(doc: &D, node: NodeId) -> bool {
    doc.computed_style(node, "background-image")
        .is_some_and(|bg| is_url_background(&bg))
}

fn is_url_background(value: &str) -> bool {
    !value.is_empty() && value != "none" && value.contains("url(")
}

fn is_img<D: DocumentHost>(doc: &D, node: NodeId) -> bool {
    doc.tag_name(node).as_deref() == Some("img")
}

fn is_own_image<D: DocumentHost>(doc: &D, node: NodeId) -> bool {
    is_img(doc, node) || has_background_image(doc, node)
}

/// A text-bearing element whose content is plain text.
///
/// Children may be text nodes or childless elements (`<br>`, an empty
/// `<span>`). An element child with its own content makes the node rich
/// text unless all of the visible text sits in direct text nodes.
pub fn is_plain_text_editable<D: DocumentHost>(doc: &D, node: NodeId) -> bool {
    let Some(tag) = doc.tag_name(node) else {
        return false;
    };
    let text = doc.text_content(node);
    if text.trim().is_empty() || !is_text_tag(&tag) {
        return false;
    }

    let children = doc.children(node);
    let only_simple = children.iter().all(|child| match doc.kind(*child) {
        Some(NodeKind::Text) => true,
        Some(NodeKind::Element) => doc.children(*child).is_empty(),
        _ => false,
    });

    if !only_simple {
        let complex = doc.element_children(node).into_iter().any(|child| {
            !doc.element_children(child).is_empty()
                || !doc.tag_name(child).is_some_and(|t| is_text_tag(&t))
                || doc.text_content(child).trim().is_empty()
        });
        if complex {
            return false;
        }
    }

    let direct_text: String = children
        .iter()
        .filter(|child| doc.kind(**child) == Some(NodeKind::Text))
        .map(|child| doc.text_content(*child))
        .collect();

    text.trim() == direct_text.trim() || only_simple
}

/// The node is an image, has a background image, or sits next to one.
pub fn is_image_like<D: DocumentHost>(doc: &D, node: NodeId) -> bool {
    resolve_image_target(doc, node).is_some()
}

/// The node that image commands should act on.
///
/// The node itself when it is an `img` or carries a background image,
/// otherwise the first sibling (in document order) that does.
pub fn resolve_image_target<D: DocumentHost>(doc: &D, node: NodeId) -> Option<NodeId> {
    if !doc.is_element(node) {
        return None;
    }
    if is_own_image(doc, node) {
        return Some(node);
    }
    let parent = doc.parent(node)?;
    doc.element_children(parent)
        .into_iter()
        .find(|sibling| is_own_image(doc, *sibling))
}

/// Pull the address out of `url("...")`, `url('...')` or `url(...)`.
fn extract_url(background: &str) -> Option<String> {
    let start = background.find("url(")? + "url(".len();
    let rest = &background[start..];
    let rest = rest.trim_start_matches(['"', '\'']);
    let end = rest.find(['"', '\'', ')'])?;
    let url = &rest[..end];
    (!url.is_empty()).then(|| url.to_string())
}

/// Image facts for an image target. All fields stay `None` for anything
/// that is neither an `img` nor a background image.
pub fn image_info<D: DocumentHost>(doc: &D, node: NodeId) -> ImageInfo {
    let mut info = ImageInfo::default();

    if is_img(doc, node) {
        info.kind = Some(ImageKind::Img);
        info.src = doc.attribute(node, "src");
        info.alt = doc.attribute(node, "alt");
        info.object_fit = doc.computed_style(node, "object-fit");
        if let Some((width, height)) = doc.natural_size(node)
            && width > 0
            && height > 0
        {
            info.natural_width = Some(width);
            info.natural_height = Some(height);
        }
        return info;
    }

    if let Some(background) = doc
        .computed_style(node, "background-image")
        .filter(|bg| is_url_background(bg))
    {
        info.kind = Some(ImageKind::Background);
        info.src = extract_url(&background);
        info.background_size = doc.computed_style(node, "background-size");
        info.background_image = Some(background);
    }

    info
}
