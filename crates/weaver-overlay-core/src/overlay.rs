//! The overlay: mode controller, pointer and key handling, selection.
//!
//! `Overlay` owns the document host, the listener registry and the
//! `SelectionState`. Every entry point (pointer event, key event, input
//! event, inbound command) runs to completion and leaves the state
//! consistent; notifications for the controller pile up in an outbound queue
//! the host drains afterwards.

use crate::actions::{EventOutcome, KeyCombo, KeydownResult, PointerEvent, PointerKind};
use crate::classify::{image_info, is_image_like, is_plain_text_editable, resolve_image_target};
use crate::config::OverlayConfig;
use crate::descriptor::describe;
use crate::error::OverlayError;
use crate::highlight::HighlightController;
use crate::host::{DocumentHost, ListenerRegistry, NodeId};
use crate::protocol::{ImageElementInfo, OutboundMessage};
use crate::surrogate;
use crate::types::{Hovered, Mode, ModeFamily, Selected, SelectionKind, SelectionState};

/// Inspector/editor overlay over a document host.
pub struct Overlay<D: DocumentHost, L: ListenerRegistry> {
    pub(crate) doc: D,
    listeners: L,
    pub(crate) config: OverlayConfig,
    pub(crate) state: SelectionState,
    pub(crate) highlight: HighlightController,

    inspect_subscription: Option<L::Subscription>,
    edit_subscription: Option<L::Subscription>,
    /// Input listener of the active surrogate.
    input_subscription: Option<L::Subscription>,

    outbound: Vec<OutboundMessage>,
}

impl<D: DocumentHost, L: ListenerRegistry> Overlay<D, L> {
    /// Create an overlay. Queues `EDITOR_TOOLS_READY`.
    pub fn new(doc: D, listeners: L, config: OverlayConfig) -> Self {
        let mut overlay = Self {
            doc,
            listeners,
            config,
            state: SelectionState::new(),
            highlight: HighlightController::new(),
            inspect_subscription: None,
            edit_subscription: None,
            input_subscription: None,
            outbound: Vec::new(),
        };
        overlay.emit(OutboundMessage::EditorToolsReady);
        overlay
    }

    // === Accessors ===

    pub fn doc(&self) -> &D {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn highlight(&self) -> &HighlightController {
        &self.highlight
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Take every notification queued since the last drain.
    pub fn drain_outbound(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbound)
    }

    pub(crate) fn emit(&mut self, message: OutboundMessage) {
        self.outbound.push(message);
    }

    // === Mode controller ===

    fn subscription_slot(&mut self, family: ModeFamily) -> &mut Option<L::Subscription> {
        match family {
            ModeFamily::Inspect => &mut self.inspect_subscription,
            ModeFamily::Edit => &mut self.edit_subscription,
        }
    }

    /// Whether pointer listeners are currently wired for `family`.
    pub fn is_subscribed(&self, family: ModeFamily) -> bool {
        match family {
            ModeFamily::Inspect => self.inspect_subscription.is_some(),
            ModeFamily::Edit => self.edit_subscription.is_some(),
        }
    }

    /// Turn a mode on or off. Setting the current value is a no-op.
    pub fn set_mode_active(&mut self, family: ModeFamily, active: bool) {
        if self.state.modes.is_active(family) == active {
            tracing::trace!(family = family.name(), active, "mode unchanged");
            return;
        }
        if active {
            self.activate(family);
        } else {
            self.deactivate(family);
        }
        self.after_event();
    }

    fn activate(&mut self, family: ModeFamily) {
        self.state.modes.set(family, true);
        self.highlight.ensure_sheet(&mut self.doc, family, &self.config);
        if let Some(body) = self.doc.body() {
            self.doc.add_class(body, family.indicator_class());
        }

        let subscription = self.listeners.subscribe_pointer(family);
        if subscription.is_none() {
            tracing::warn!(family = family.name(), "pointer listeners could not be attached");
        }
        *self.subscription_slot(family) = subscription;
        tracing::debug!(family = family.name(), "mode activated");
    }

    fn deactivate(&mut self, family: ModeFamily) {
        self.state.modes.set(family, false);
        if let Some(body) = self.doc.body() {
            self.doc.remove_class(body, family.indicator_class());
        }
        self.clear_hover();
        // Dropping the subscription detaches the listeners.
        *self.subscription_slot(family) = None;

        if family == ModeFamily::Edit {
            self.commit();
        }
        self.highlight.release_sheet_if_idle(
            &mut self.doc,
            family,
            false,
            self.state.has_selection_in(family),
        );
        tracing::debug!(family = family.name(), "mode deactivated");
    }

    /// Deactivate everything and drop every selection, sheet and listener.
    pub fn shutdown(&mut self) {
        self.deselect();
        for family in ModeFamily::ALL {
            self.set_mode_active(family, false);
        }
        self.clear_hover();
        self.highlight.release_all(&mut self.doc);
        self.after_event();
    }

    fn release_idle_sheets(&mut self) {
        for family in ModeFamily::ALL {
            self.highlight.release_sheet_if_idle(
                &mut self.doc,
                family,
                self.state.modes.is_active(family),
                self.state.has_selection_in(family),
            );
        }
    }

    /// Tell the host which handles are still in use.
    fn after_event(&mut self) {
        let mut keep = self.state.referenced_nodes();
        keep.extend(self.highlight.sheet_nodes());
        self.doc.retain_handles(&keep);
    }

    // === Hover and selection marks ===

    fn is_root(&self, node: NodeId) -> bool {
        !self.doc.is_element(node)
            || Some(node) == self.doc.body()
            || Some(node) == self.doc.document_element()
    }

    /// Drop the hover highlight unless it is also the selection.
    fn clear_hover(&mut self) {
        if let Some(hovered) = self.state.hovered.take()
            && !self.state.is_selected(hovered.node)
        {
            self.highlight
                .clear_highlight(&mut self.doc, hovered.node, hovered.family);
        }
    }

    fn move_hover(&mut self, node: NodeId, family: ModeFamily) {
        if let Some(previous) = self.state.hovered
            && previous.node != node
            && !self.state.is_selected(previous.node)
        {
            self.highlight
                .clear_highlight(&mut self.doc, previous.node, previous.family);
        }
        self.highlight.highlight(&mut self.doc, node, family);
        self.state.hovered = Some(Hovered { node, family });
    }

    /// Stamp the marker id, returning the id it displaced.
    fn mark(&mut self, node: NodeId) -> Option<String> {
        let marker = self.config.marker_id.clone();
        let displaced = self
            .doc
            .attribute(node, "id")
            .filter(|id| !id.is_empty() && *id != marker);
        self.doc.set_attribute(node, "id", &marker);
        displaced
    }

    /// Remove a selection's highlight and marker, restoring a displaced id.
    fn unmark(&mut self, selected: Selected) {
        self.highlight
            .clear_highlight(&mut self.doc, selected.node, selected.family);
        if selected.family != ModeFamily::Edit {
            return;
        }
        let marked = self.doc.attribute(selected.node, "id").as_deref()
            == Some(self.config.marker_id.as_str());
        match selected.displaced_id {
            Some(id) => self.doc.set_attribute(selected.node, "id", &id),
            None if marked => self.doc.remove_attribute(selected.node, "id"),
            None => {}
        }
    }

    fn is_marked(&self, node: NodeId) -> bool {
        self.state.is_selected(node)
            && self.doc.attribute(node, "id").as_deref() == Some(self.config.marker_id.as_str())
    }

    /// Release the current selection (committing a session first).
    ///
    /// No-op without a selection.
    pub fn deselect(&mut self) {
        self.commit();
        if let Some(selected) = self.state.selected.take() {
            tracing::debug!(family = selected.family.name(), "selection cleared");
            self.unmark(selected);
        }
        self.release_idle_sheets();
    }

    // === Pointer handling ===

    /// Handle a pointer event delivered by `family`'s listeners.
    pub fn handle_pointer(&mut self, family: ModeFamily, event: PointerEvent) -> EventOutcome {
        if !self.state.modes.is_active(family) {
            return EventOutcome::PASS;
        }
        let outcome = match (family, event.kind) {
            (_, PointerKind::Leave) => {
                self.clear_hover();
                EventOutcome::PASS
            }
            (ModeFamily::Inspect, PointerKind::Move) => {
                self.inspect_move(event.target);
                EventOutcome::PASS
            }
            (ModeFamily::Inspect, PointerKind::Click) => {
                self.inspect_click(event.target);
                EventOutcome::CAPTURED
            }
            (ModeFamily::Edit, PointerKind::Move) => {
                self.edit_move(event.target);
                EventOutcome::PASS
            }
            (ModeFamily::Edit, PointerKind::Click) => {
                self.edit_click(event.target);
                EventOutcome::CAPTURED
            }
        };
        self.after_event();
        outcome
    }

    fn inspect_move(&mut self, target: Option<NodeId>) {
        let Some(target) = target.filter(|t| !self.is_root(*t)) else {
            return;
        };
        if self.state.is_selected(target) {
            self.clear_hover();
            return;
        }
        if self.state.hovered == Some(Hovered { node: target, family: ModeFamily::Inspect }) {
            tracing::trace!("hover unchanged");
            return;
        }
        self.move_hover(target, ModeFamily::Inspect);
        let element_info = describe(&self.doc, target, &self.config);
        self.emit(OutboundMessage::InspectorHover { element_info });
    }

    fn inspect_click(&mut self, target: Option<NodeId>) {
        let Some(target) = target.filter(|t| !self.is_root(*t)) else {
            return;
        };
        self.highlight
            .ensure_sheet(&mut self.doc, ModeFamily::Inspect, &self.config);
        self.commit();

        if let Some(previous) = self.state.selected.take() {
            self.unmark(previous);
        }
        if self.state.hovered.is_some_and(|h| h.node == target) {
            self.state.hovered = None;
        }
        self.state.selected = Some(Selected {
            node: target,
            family: ModeFamily::Inspect,
            kind: SelectionKind::Inspected,
            displaced_id: None,
        });
        self.highlight
            .highlight(&mut self.doc, target, ModeFamily::Inspect);
        self.release_idle_sheets();

        tracing::debug!(?target, "inspector selection");
        let element_info = describe(&self.doc, target, &self.config);
        self.emit(OutboundMessage::InspectorClick { element_info });
    }

    /// The node edit mode acts on for a pointer target.
    fn edit_target(&self, target: NodeId) -> Option<NodeId> {
        if is_plain_text_editable(&self.doc, target) {
            Some(target)
        } else {
            resolve_image_target(&self.doc, target)
        }
    }

    fn edit_move(&mut self, target: Option<NodeId>) {
        if self.state.selected.is_some() {
            return;
        }
        let Some(target) = target.filter(|t| !self.is_root(*t)) else {
            return;
        };
        if let Some(concrete) = self.edit_target(target) {
            self.move_hover(concrete, ModeFamily::Edit);
        }
    }

    fn edit_click(&mut self, target: Option<NodeId>) {
        let Some(target) = target else {
            return;
        };
        let concrete = self.edit_target(target);
        if self.is_marked(target) || concrete.is_some_and(|c| self.is_marked(c)) {
            self.close_click();
            return;
        }
        let Some(concrete) = concrete.filter(|c| !self.is_root(*c)) else {
            tracing::trace!(?target, "click on nothing editable");
            return;
        };
        self.select_for_edit(concrete);
    }

    fn select_for_edit(&mut self, node: NodeId) {
        self.commit();
        if let Some(previous) = self.state.selected.take() {
            self.unmark(previous);
        }
        if let Some(hovered) = self.state.hovered.take()
            && hovered.node != node
        {
            self.highlight
                .clear_highlight(&mut self.doc, hovered.node, hovered.family);
        }

        self.highlight
            .ensure_sheet(&mut self.doc, ModeFamily::Edit, &self.config);
        self.highlight.highlight(&mut self.doc, node, ModeFamily::Edit);
        let displaced_id = self.mark(node);

        let is_image = is_image_like(&self.doc, node);
        let kind = if is_image {
            SelectionKind::Image
        } else {
            SelectionKind::Text
        };
        self.state.selected = Some(Selected {
            node,
            family: ModeFamily::Edit,
            kind,
            displaced_id,
        });
        self.release_idle_sheets();

        let element = describe(&self.doc, node, &self.config);
        tracing::debug!(?node, ?kind, tag = %element.tag_name, "editor selection");
        if is_image {
            let image_info = image_info(&self.doc, node);
            self.emit(OutboundMessage::OpenImageEditor {
                element_info: ImageElementInfo {
                    element,
                    image_info,
                },
            });
        } else {
            self.emit(OutboundMessage::OpenTextEditor {
                element_info: element,
            });
        }
    }

    /// A click on the marked node closes whatever editor it has open.
    fn close_click(&mut self) {
        let Some(selected) = self.state.selected.clone() else {
            return;
        };
        self.clear_hover();
        if self.state.session.is_some() {
            self.emit(OutboundMessage::TextEditorClose);
            self.commit();
        } else if selected.kind == SelectionKind::Image {
            self.emit(OutboundMessage::CloseImageEditor);
            self.deselect();
        } else {
            self.emit(OutboundMessage::TextEditorClose);
            self.deselect();
        }
    }

    // === Keyboard ===

    /// Global keydown: Enter/Escape close the open editor while edit mode is on.
    pub fn handle_keydown(&mut self, combo: &KeyCombo) -> KeydownResult {
        if !self.state.modes.edit || !combo.closes_editor() {
            return KeydownResult::NotHandled;
        }
        let result = if self.state.session.is_some() {
            self.emit(OutboundMessage::TextEditorClose);
            self.commit();
            KeydownResult::Handled
        } else if self
            .state
            .selected
            .as_ref()
            .is_some_and(|s| s.kind == SelectionKind::Image)
        {
            self.emit(OutboundMessage::CloseImageEditor);
            self.deselect();
            KeydownResult::Handled
        } else {
            KeydownResult::NotHandled
        };
        self.after_event();
        result
    }

    // === Surrogate session ===

    /// Replace the marked text selection with a surrogate.
    pub fn enable_text_editor(&mut self) -> Result<(), OverlayError> {
        if self.state.session.is_some() {
            tracing::debug!("surrogate already active");
            return Ok(());
        }
        let marked = self
            .doc
            .element_by_id(&self.config.marker_id)
            .ok_or_else(|| OverlayError::MissingNode(self.config.marker_id.clone()))?;
        match &self.state.selected {
            Some(selected) if selected.node == marked && selected.kind == SelectionKind::Text => {}
            _ => return Err(OverlayError::NoSelection),
        }

        let session = surrogate::begin(&mut self.doc, marked, &self.config)
            .ok_or_else(|| OverlayError::Host("surrogate could not replace the node".into()))?;
        let surrogate = session.surrogate;

        if let Some(selected) = self.state.selected.as_mut() {
            selected.node = surrogate;
        }
        if self.state.hovered.is_some_and(|h| h.node == marked) {
            self.state.hovered = None;
        }
        self.input_subscription = self.listeners.subscribe_input(surrogate);
        if self.input_subscription.is_none() {
            tracing::warn!("surrogate input listener could not be attached");
        }
        self.state.session = Some(session);
        self.after_event();
        Ok(())
    }

    /// The surrogate's value changed.
    pub fn handle_input(&mut self, surrogate: NodeId) {
        if self.state.session.as_ref().map(|s| s.surrogate) != Some(surrogate) {
            tracing::trace!(?surrogate, "input from a stale surrogate");
            return;
        }
        surrogate::grow(&mut self.doc, surrogate);
        let value = self.doc.input_value(surrogate).unwrap_or_default();
        self.emit(OutboundMessage::TextEditorTextChange { value });
    }

    /// End the active surrogate session, splicing the rebuilt node in.
    ///
    /// Returns the rebuilt node. Without a session this does nothing and
    /// returns `None`, so calling it twice mutates the tree once.
    pub fn commit(&mut self) -> Option<NodeId> {
        let session = self.state.session.take()?;
        self.input_subscription = None;
        let surrogate = session.surrogate;

        let tracks_surrogate = self.state.is_selected(surrogate);
        let restored_id = if tracks_surrogate {
            self.state
                .selected
                .as_mut()
                .and_then(|s| s.displaced_id.take())
        } else {
            None
        };

        let rebuilt = surrogate::commit(&mut self.doc, session, restored_id.as_deref());

        if self.state.hovered.is_some_and(|h| h.node == surrogate) {
            self.state.hovered = None;
        }
        if tracks_surrogate {
            match rebuilt {
                Some(node) => {
                    if let Some(selected) = self.state.selected.as_mut() {
                        selected.node = node;
                    }
                    self.highlight.highlight(&mut self.doc, node, ModeFamily::Edit);
                }
                None => {
                    self.state.selected = None;
                    self.release_idle_sheets();
                }
            }
        }
        self.after_event();
        rebuilt
    }
}
