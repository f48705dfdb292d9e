//! WASM bindings for the weaver inspect/edit overlay.
//!
//! Load the module inside the frame to be inspected. The overlay then talks
//! to the parent frame purely through `postMessage`; the exports below are
//! for pages that embed the module directly.
//!
//! # Features
//!
//! - `autostart`: install with default settings when the module loads

mod overlay;

pub use overlay::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging, then install the overlay.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_tracing();

    #[cfg(feature = "autostart")]
    {
        let config = weaver_overlay_core::OverlayConfig::default();
        if let Err(error) = overlay::install_with(config) {
            tracing::error!(%error, "overlay failed to start");
        }
    }
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
