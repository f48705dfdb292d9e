//! Inbound command dispatch.
//!
//! Commands arrive as raw JSON from the controller. `handle_message` parses
//! and applies one; anything it can't apply is logged and dropped so the
//! hosted document stays interactive.

use serde_json::Value;

use crate::error::OverlayError;
use crate::host::{DocumentHost, ListenerRegistry, NodeId};
use crate::lists::{toggle_bullet_list, toggle_numbered_list};
use crate::overlay::Overlay;
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::surrogate;
use crate::types::ModeFamily;

/// Font size and weight applied by a style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    pub font_size: Option<&'static str>,
    pub font_weight: Option<&'static str>,
    /// Tag the committed node takes.
    pub tag: &'static str,
}

impl StylePreset {
    const fn sized(tag: &'static str, size: &'static str, weight: &'static str) -> Self {
        Self {
            font_size: Some(size),
            font_weight: Some(weight),
            tag,
        }
    }

    /// Look up a preset by name (`h1`..`h4`, `p1`..`p4`, `code`).
    pub fn named(name: &str) -> Option<Self> {
        let preset = match name {
            "h1" => Self::sized("h1", "3.75rem", "700"),
            "h2" => Self::sized("h2", "2.25rem", "700"),
            "h3" => Self::sized("h3", "1.25rem", "600"),
            "h4" => Self::sized("h4", "1rem", "600"),
            "p1" => Self::sized("p", "1.125rem", "600"),
            "p2" => Self::sized("p", "1rem", "500"),
            "p3" => Self::sized("p", "0.875rem", "400"),
            "p4" => Self::sized("p", "0.75rem", "400"),
            "code" => Self {
                font_size: None,
                font_weight: None,
                tag: "code",
            },
            _ => return None,
        };
        Some(preset)
    }
}

/// Which list toggle a command asks for.
#[derive(Debug, Clone, Copy)]
enum ListKind {
    Numbered,
    Bullet,
}

impl<D: DocumentHost, L: ListenerRegistry> Overlay<D, L> {
    /// Parse and apply a raw controller message.
    ///
    /// Never fails: bad or inapplicable commands are logged and ignored.
    pub fn handle_message(&mut self, value: Value) {
        let result = InboundMessage::from_value(value).and_then(|message| {
            let kind = message.kind();
            tracing::debug!(kind, "command");
            self.dispatch(message)
        });
        if let Err(error) = result {
            if error.is_benign() {
                tracing::warn!(%error, "command ignored");
            } else {
                tracing::error!(%error, "command failed");
            }
            if self.config.forward_diagnostics {
                self.emit(OutboundMessage::ConsoleLog {
                    value: error.to_string(),
                });
            }
        }
    }

    /// Apply a parsed command.
    pub fn dispatch(&mut self, message: InboundMessage) -> Result<(), OverlayError> {
        match message {
            InboundMessage::InspectorActivate { active } => {
                self.set_mode_active(ModeFamily::Inspect, active);
                Ok(())
            }
            InboundMessage::EditorActivate { active } => {
                self.set_mode_active(ModeFamily::Edit, active);
                Ok(())
            }
            InboundMessage::InspectorClearSelection
            | InboundMessage::TextEditorClearSelection
            | InboundMessage::DeselectElement => {
                self.deselect();
                Ok(())
            }
            InboundMessage::EnableTextEditor => self.enable_text_editor(),
            InboundMessage::SetBold { active } => {
                let weight = if active { "bold" } else { "normal" };
                self.set_selection_style("font-weight", weight)
            }
            InboundMessage::SetItalic { active } => {
                let style = if active { "italic" } else { "normal" };
                self.set_selection_style("font-style", style)
            }
            InboundMessage::SetAlignment { align } => {
                if align.is_empty() {
                    return Err(malformed("SET_ALIGNMENT", "empty alignment"));
                }
                self.set_selection_style("text-align", &align)
            }
            InboundMessage::SetNumberedList => self.toggle_list(ListKind::Numbered),
            InboundMessage::SetBulletList => self.toggle_list(ListKind::Bullet),
            InboundMessage::TextEditorGenerateText { content } => {
                if content.is_empty() {
                    return Err(malformed("TEXT_EDITOR_GENERATE_TEXT", "empty content"));
                }
                self.replace_surrogate_text(content)
            }
            InboundMessage::SetElementStyle { style } => self.apply_style_preset(&style),
            InboundMessage::TextEditorUpdateImageSource { src } => self.update_image_source(&src),
            InboundMessage::TextEditorUpdateImageFit { object_fit } => {
                self.update_image_fit(&object_fit)
            }
        }
    }

    fn selection_node(&self) -> Result<NodeId, OverlayError> {
        self.state.selected_node().ok_or(OverlayError::NoSelection)
    }

    fn surrogate_node(&self) -> Result<NodeId, OverlayError> {
        self.state
            .session
            .as_ref()
            .map(|s| s.surrogate)
            .ok_or(OverlayError::NoSurrogate)
    }

    /// Set an inline style on the selection, remembering it as formatting
    /// when the selection is the surrogate.
    fn set_selection_style(&mut self, property: &str, value: &str) -> Result<(), OverlayError> {
        let node = self.selection_node()?;
        self.doc.set_inline_style(node, property, value);
        if let Some(session) = self.state.session.as_mut()
            && session.surrogate == node
        {
            session.mark_formatted(property);
        }
        Ok(())
    }

    /// Write a new surrogate value, regrow, refocus and report it.
    fn replace_surrogate_text(&mut self, value: String) -> Result<(), OverlayError> {
        self.selection_node()?;
        let surrogate = self.surrogate_node()?;
        self.doc.set_input_value(surrogate, &value);
        surrogate::grow(&mut self.doc, surrogate);
        self.doc.focus(surrogate);
        self.emit(OutboundMessage::TextEditorTextChange { value });
        Ok(())
    }

    fn toggle_list(&mut self, kind: ListKind) -> Result<(), OverlayError> {
        let surrogate = self.surrogate_node()?;
        let current = self.doc.input_value(surrogate).unwrap_or_default();
        let toggled = match kind {
            ListKind::Numbered => toggle_numbered_list(&current),
            ListKind::Bullet => toggle_bullet_list(&current),
        };
        self.replace_surrogate_text(toggled)
    }

    fn apply_style_preset(&mut self, name: &str) -> Result<(), OverlayError> {
        let node = self.selection_node()?;
        let preset = StylePreset::named(name)
            .ok_or_else(|| malformed("SET_ELEMENT_STYLE", &format!("unknown preset {name:?}")))?;

        if let Some(session) = self.state.session.as_mut() {
            session.retag(preset.tag);
        }
        if let Some(size) = preset.font_size {
            self.set_selection_style("font-size", size)?;
        }
        if let Some(weight) = preset.font_weight {
            self.set_selection_style("font-weight", weight)?;
        }
        tracing::debug!(preset = name, ?node, "style preset applied");
        Ok(())
    }

    fn update_image_source(&mut self, src: &str) -> Result<(), OverlayError> {
        if src.is_empty() {
            return Err(malformed("TEXT_EDITOR_UPDATE_IMAGE_SOURCE", "empty src"));
        }
        let node = self.selection_node()?;
        if self.doc.tag_name(node).as_deref() == Some("img") {
            self.doc.set_attribute(node, "src", src);
        } else if crate::classify::has_background_image(&self.doc, node) {
            self.doc
                .set_inline_style(node, "background-image", &format!("url(\"{}\")", src));
        } else {
            tracing::debug!(?node, "selection carries no image");
        }
        Ok(())
    }

    fn update_image_fit(&mut self, fit: &str) -> Result<(), OverlayError> {
        if fit.is_empty() {
            return Err(malformed("TEXT_EDITOR_UPDATE_IMAGE_FIT", "empty objectFit"));
        }
        let node = self.selection_node()?;
        if self.doc.tag_name(node).as_deref() == Some("img") {
            self.doc.set_inline_style(node, "object-fit", fit);
        } else if crate::classify::has_background_image(&self.doc, node) {
            self.doc.set_inline_style(node, "background-size", fit);
            self.doc.set_inline_style(node, "background-repeat", "no-repeat");
            self.doc.set_inline_style(node, "background-position", "center");
        } else {
            tracing::debug!(?node, "selection carries no image");
        }
        Ok(())
    }
}

fn malformed(kind: &str, reason: &str) -> OverlayError {
    OverlayError::MalformedCommand {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}
