//! Installing the overlay into the hosting frame.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, MessageEvent};
use weaver_overlay_core::{Overlay, OverlayConfig, OverlayError};

use crate::dom::DomDocument;
use crate::listeners::{BrowserListeners, SharedOverlay, WeakOverlay, keydown_listener, with_overlay};
use crate::messaging;

/// A live overlay plus the listeners that live as long as it does.
///
/// Mode listeners come and go with the modes; the keydown and message
/// listeners here are attached once and detached on `uninstall` (or drop).
pub struct InstalledOverlay {
    overlay: SharedOverlay,
    _keydown: EventListener,
    _message: EventListener,
}

impl InstalledOverlay {
    /// Build the overlay over the current document and start listening.
    ///
    /// Posts `EDITOR_TOOLS_READY` to the parent frame.
    pub fn install(config: OverlayConfig) -> Result<Self, OverlayError> {
        let doc = DomDocument::from_window()
            .ok_or_else(|| OverlayError::Host("no document in this context".to_string()))?;
        let document: EventTarget = doc.document().clone().into();

        let overlay: SharedOverlay = Rc::new_cyclic(|weak| {
            let listeners = BrowserListeners::new(weak.clone(), document.clone());
            RefCell::new(Overlay::new(doc, listeners, config))
        });

        let weak = Rc::downgrade(&overlay);
        let keydown = keydown_listener(weak.clone(), &document);
        let message = message_listener(weak, &gloo_utils::window());

        if let Ok(mut overlay) = overlay.try_borrow_mut() {
            messaging::flush(&mut overlay);
        }
        tracing::info!("overlay installed");

        Ok(Self {
            overlay,
            _keydown: keydown,
            _message: message,
        })
    }

    pub fn overlay(&self) -> &SharedOverlay {
        &self.overlay
    }

    /// Apply a controller message as if it had been posted to the frame.
    pub fn dispatch(&self, message: serde_json::Value) {
        with_overlay(&Rc::downgrade(&self.overlay), "dispatch", |overlay| {
            overlay.handle_message(message);
        });
    }

    /// Commit any edit, drop every mode and detach all listeners.
    pub fn uninstall(self) {
        with_overlay(&Rc::downgrade(&self.overlay), "uninstall", |overlay| {
            overlay.shutdown();
        });
        tracing::info!("overlay uninstalled");
    }
}

fn message_listener(overlay: WeakOverlay, target: &EventTarget) -> EventListener {
    EventListener::new(target, "message", move |event| {
        let Some(event) = event.dyn_ref::<MessageEvent>() else {
            return;
        };
        if event
            .source()
            .is_some_and(|source| messaging::is_own_window(source.as_ref()))
        {
            tracing::trace!("own message ignored");
            return;
        }
        match messaging::from_js(event.data()) {
            Ok(message) => {
                with_overlay(&overlay, "message", |overlay| overlay.handle_message(message));
            }
            Err(error) => tracing::warn!(%error, "unreadable message"),
        }
    })
}
