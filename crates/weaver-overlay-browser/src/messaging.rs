//! Parent-frame messaging.
//!
//! Outbound messages are serialized to plain JS objects (maps become objects,
//! not `Map`s) and posted to `window.parent`. Inbound message data goes the
//! other way into a `serde_json::Value` for the core parser.
//!
//! At the top level there is no parent: outbound messages are dropped and
//! messages sourced from this window are ignored.

use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::Window;
use weaver_overlay_core::{OutboundMessage, OverlayError};

use crate::dom::host_error;
use crate::listeners::BrowserOverlay;

/// Serialize an outbound message to a JS value.
pub fn to_js(message: &OutboundMessage) -> Result<JsValue, OverlayError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    message
        .serialize(&serializer)
        .map_err(|e| OverlayError::Host(format!("serialize outbound message: {e}")))
}

/// Read a `MessageEvent.data` payload.
pub fn from_js(data: JsValue) -> Result<serde_json::Value, OverlayError> {
    serde_wasm_bindgen::from_value(data).map_err(|e| OverlayError::MalformedCommand {
        kind: "unknown".to_string(),
        reason: e.to_string(),
    })
}

/// Whether `value` is this window.
pub fn is_own_window(value: &JsValue) -> bool {
    let window = gloo_utils::window();
    let own: &JsValue = window.as_ref();
    value == own
}

/// The frame messages go to, or `None` at the top level where
/// `window.parent` is this window.
pub fn parent_frame() -> Result<Option<Window>, OverlayError> {
    let parent = gloo_utils::window()
        .parent()
        .map_err(|e| host_error("window.parent", e))?;
    Ok(parent.filter(|parent| !is_own_window(parent.as_ref())))
}

/// Post one message to the parent frame. Without a parent the message is
/// dropped so the overlay never receives its own traffic.
pub fn post_to_parent(message: &OutboundMessage, target_origin: &str) -> Result<(), OverlayError> {
    let Some(parent) = parent_frame()? else {
        tracing::debug!(?message, "no parent frame, message dropped");
        return Ok(());
    };
    let value = to_js(message)?;
    parent
        .post_message(&value, target_origin)
        .map_err(|e| host_error("postMessage", e))
}

/// Post everything the overlay has queued.
pub fn flush(overlay: &mut BrowserOverlay) {
    let outbound = overlay.drain_outbound();
    if outbound.is_empty() {
        return;
    }
    let origin = overlay.config().target_origin.clone();
    for message in &outbound {
        if let Err(error) = post_to_parent(message, &origin) {
            tracing::warn!(%error, "outbound message dropped");
        }
    }
    tracing::trace!(count = outbound.len(), "outbound flushed");
}
