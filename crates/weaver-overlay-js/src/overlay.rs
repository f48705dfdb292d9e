//! The overlay instance owned by this module.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use weaver_overlay_browser::{InstalledOverlay, Mode, OverlayConfig, OverlayError, messaging};

thread_local! {
    static INSTALLED: RefCell<Option<InstalledOverlay>> = const { RefCell::new(None) };
}

/// Replace any running overlay with one built from `config`.
pub(crate) fn install_with(config: OverlayConfig) -> Result<(), OverlayError> {
    uninstall();
    let installed = InstalledOverlay::install(config)?;
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(installed));
    Ok(())
}

fn parse_config(config: JsValue) -> Result<OverlayConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(OverlayConfig::default());
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
    OverlayConfig::from_json(value).map_err(|e| JsError::new(&format!("Invalid config: {}", e)))
}

/// Install the overlay, replacing one that is already running.
///
/// `config` is an optional object with camelCase `OverlayConfig` fields.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<(), JsError> {
    let config = parse_config(config)?;
    install_with(config).map_err(|e| JsError::new(&format!("Install failed: {}", e)))
}

/// Commit any open edit and remove the overlay. No-op if not installed.
#[wasm_bindgen]
pub fn uninstall() {
    let installed = INSTALLED.with(|slot| slot.borrow_mut().take());
    if let Some(installed) = installed {
        installed.uninstall();
    }
}

/// Apply a controller message directly, without going through `postMessage`.
#[wasm_bindgen]
pub fn dispatch(message: JsValue) -> Result<(), JsError> {
    let message = messaging::from_js(message).map_err(|e| JsError::new(&e.to_string()))?;
    INSTALLED.with(|slot| match slot.borrow().as_ref() {
        Some(installed) => {
            installed.dispatch(message);
            Ok(())
        }
        None => Err(JsError::new("Overlay is not installed")),
    })
}

/// `"inactive"`, `"inspecting"` or `"editing"`.
#[wasm_bindgen(js_name = currentMode)]
pub fn current_mode() -> String {
    let mode = INSTALLED.with(|slot| {
        slot.borrow()
            .as_ref()
            .and_then(|installed| installed.overlay().try_borrow().ok().map(|o| o.mode()))
    });
    match mode.unwrap_or_default() {
        Mode::Inactive => "inactive",
        Mode::Inspecting => "inspecting",
        Mode::Editing => "editing",
    }
    .to_string()
}
