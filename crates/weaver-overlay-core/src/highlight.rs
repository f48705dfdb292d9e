//! Highlight classes and the per-family style sheets that paint them.

use crate::color::{rgba_u32_to_css_alpha, rgba_u32_to_hex};
use crate::config::OverlayConfig;
use crate::host::{DocumentHost, NodeId};
use crate::types::ModeFamily;

/// Attribute tagging the `<style>` elements the overlay owns.
pub const SHEET_ATTRIBUTE: &str = "data-weaver-overlay";

/// Owns the two lazily created highlight style sheets.
///
/// A sheet is mounted under `<head>` on first use and unmounted only once
/// its family is inactive with nothing selected.
#[derive(Debug, Default)]
pub struct HighlightController {
    inspect_sheet: Option<NodeId>,
    edit_sheet: Option<NodeId>,
}

impl HighlightController {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, family: ModeFamily) -> &mut Option<NodeId> {
        match family {
            ModeFamily::Inspect => &mut self.inspect_sheet,
            ModeFamily::Edit => &mut self.edit_sheet,
        }
    }

    pub fn sheet(&self, family: ModeFamily) -> Option<NodeId> {
        match family {
            ModeFamily::Inspect => self.inspect_sheet,
            ModeFamily::Edit => self.edit_sheet,
        }
    }

    pub fn has_sheet(&self, family: ModeFamily) -> bool {
        self.sheet(family).is_some()
    }

    /// Style element handles currently mounted.
    pub fn sheet_nodes(&self) -> Vec<NodeId> {
        self.inspect_sheet.into_iter().chain(self.edit_sheet).collect()
    }

    pub fn highlight<D: DocumentHost>(&self, doc: &mut D, node: NodeId, family: ModeFamily) {
        doc.add_class(node, family.highlight_class());
    }

    pub fn clear_highlight<D: DocumentHost>(&self, doc: &mut D, node: NodeId, family: ModeFamily) {
        doc.remove_class(node, family.highlight_class());
    }

    /// Remove both families' highlight classes.
    pub fn clear_all<D: DocumentHost>(&self, doc: &mut D, node: NodeId) {
        for family in ModeFamily::ALL {
            self.clear_highlight(doc, node, family);
        }
    }

    /// Mount the family's sheet if it isn't already.
    pub fn ensure_sheet<D: DocumentHost>(
        &mut self,
        doc: &mut D,
        family: ModeFamily,
        config: &OverlayConfig,
    ) -> Option<NodeId> {
        if let Some(sheet) = self.sheet(family)
            && doc.contains(sheet)
        {
            return Some(sheet);
        }

        let head = doc.head()?;
        let sheet = doc.create_element("style")?;
        doc.set_attribute(sheet, SHEET_ATTRIBUTE, family.name());
        doc.set_text_content(sheet, &sheet_css(family, config));
        if !doc.append_child(head, sheet) {
            tracing::warn!(family = family.name(), "could not mount highlight sheet");
            return None;
        }
        tracing::debug!(family = family.name(), "highlight sheet mounted");
        *self.slot(family) = Some(sheet);
        Some(sheet)
    }

    /// Unmount the family's sheet when nothing needs it any more.
    pub fn release_sheet_if_idle<D: DocumentHost>(
        &mut self,
        doc: &mut D,
        family: ModeFamily,
        mode_active: bool,
        selected_in_family: bool,
    ) {
        if mode_active || selected_in_family {
            return;
        }
        if let Some(sheet) = self.slot(family).take() {
            doc.remove_node(sheet);
            tracing::debug!(family = family.name(), "highlight sheet released");
        }
    }

    /// Unmount both sheets unconditionally.
    pub fn release_all<D: DocumentHost>(&mut self, doc: &mut D) {
        for family in ModeFamily::ALL {
            self.release_sheet_if_idle(doc, family, false, false);
        }
    }
}

/// Stylesheet text for a family: crosshair cursor plus the highlight rule.
pub fn sheet_css(family: ModeFamily, config: &OverlayConfig) -> String {
    format!(
        ".{indicator} * {{ cursor: crosshair !important; }}\n\
         .{highlight} {{ outline: 2px solid {outline} !important; \
         outline-offset: -2px !important; background-color: {fill} !important; }}\n",
        indicator = family.indicator_class(),
        highlight = family.highlight_class(),
        outline = rgba_u32_to_hex(config.accent_color),
        fill = rgba_u32_to_css_alpha(config.accent_color, config.highlight_alpha),
    )
}
