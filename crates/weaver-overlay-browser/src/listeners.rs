//! Capture-phase event wiring.
//!
//! Listeners reach the overlay through a `Weak` handle. Every callback
//! upgrades it, takes the borrow with `try_borrow_mut` and bails out (with a
//! log line) if the overlay is already busy, which happens when a DOM
//! mutation made by the overlay synchronously fires another event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, KeyboardEvent, Node};
use weaver_overlay_core::{
    Key, KeyCombo, KeydownResult, ListenerRegistry, ModeFamily, Modifiers, NodeId, Overlay,
    PointerEvent, PointerKind,
};

use crate::dom::DomDocument;
use crate::messaging;

pub type BrowserOverlay = Overlay<DomDocument, BrowserListeners>;
pub type SharedOverlay = Rc<RefCell<BrowserOverlay>>;
pub type WeakOverlay = Weak<RefCell<BrowserOverlay>>;

/// Capture phase, and not passive so handlers may call `preventDefault`.
pub(crate) fn capture() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: false,
    }
}

/// Run `f` against the overlay if it is alive and not already borrowed,
/// then post whatever it queued.
pub(crate) fn with_overlay<R>(
    overlay: &WeakOverlay,
    event: &str,
    f: impl FnOnce(&mut BrowserOverlay) -> R,
) -> Option<R> {
    let shared = overlay.upgrade()?;
    let Ok(mut overlay) = shared.try_borrow_mut() else {
        tracing::debug!(event, "overlay busy, event skipped");
        return None;
    };
    let result = f(&mut overlay);
    messaging::flush(&mut overlay);
    Some(result)
}

/// A set of attached listeners. Dropping it detaches them all.
pub struct ListenerSet {
    listeners: Vec<EventListener>,
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// `ListenerRegistry` attaching real DOM listeners on the document.
pub struct BrowserListeners {
    overlay: WeakOverlay,
    target: EventTarget,
}

impl BrowserListeners {
    pub fn new(overlay: WeakOverlay, target: EventTarget) -> Self {
        Self { overlay, target }
    }
}

const POINTER_EVENTS: [(&str, PointerKind); 3] = [
    ("mousemove", PointerKind::Move),
    ("click", PointerKind::Click),
    ("mouseleave", PointerKind::Leave),
];

impl ListenerRegistry for BrowserListeners {
    type Subscription = ListenerSet;

    fn subscribe_pointer(&mut self, family: ModeFamily) -> Option<ListenerSet> {
        let listeners = POINTER_EVENTS
            .into_iter()
            .map(|(event_type, kind)| {
                let overlay = self.overlay.clone();
                EventListener::new_with_options(&self.target, event_type, capture(), move |event| {
                    on_pointer(&overlay, family, kind, event);
                })
            })
            .collect();
        tracing::debug!(family = family.name(), "pointer listeners attached");
        Some(ListenerSet { listeners })
    }

    /// Input events are caught on the document and forwarded only when they
    /// come from the surrogate.
    fn subscribe_input(&mut self, surrogate: NodeId) -> Option<ListenerSet> {
        let overlay = self.overlay.clone();
        let listener =
            EventListener::new_with_options(&self.target, "input", capture(), move |event| {
                let Some(target) = event_node(event) else {
                    return;
                };
                with_overlay(&overlay, "input", |overlay| {
                    let from_surrogate = overlay
                        .doc()
                        .node(surrogate)
                        .is_some_and(|node| node.is_same_node(Some(&target)));
                    if from_surrogate {
                        overlay.handle_input(surrogate);
                    }
                });
            });
        Some(ListenerSet {
            listeners: vec![listener],
        })
    }
}

fn event_node(event: &Event) -> Option<Node> {
    event.target()?.dyn_into::<Node>().ok()
}

fn on_pointer(overlay: &WeakOverlay, family: ModeFamily, kind: PointerKind, event: &Event) {
    let target = event_node(event);
    with_overlay(overlay, "pointer", |overlay| {
        let target = target.map(|node| overlay.doc().intern(&node));
        tracing::trace!(family = family.name(), ?kind, ?target, "pointer");
        let outcome = overlay.handle_pointer(family, PointerEvent::new(kind, target));
        if outcome.prevent_default {
            event.prevent_default();
        }
        if outcome.stop_propagation {
            event.stop_propagation();
        }
    });
}

/// Convert a browser keyboard event to a key combo.
pub fn key_combo(event: &KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::parse(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Global keydown listener, alive for as long as the overlay is installed.
pub fn keydown_listener(overlay: WeakOverlay, target: &EventTarget) -> EventListener {
    EventListener::new_with_options(target, "keydown", capture(), move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let combo = key_combo(event);
        let result = with_overlay(&overlay, "keydown", |overlay| overlay.handle_keydown(&combo));
        if result == Some(KeydownResult::Handled) {
            event.prevent_default();
        }
    })
}
