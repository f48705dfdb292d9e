//! Browser DOM layer for the weaver overlay.
//!
//! Implements the core host traits over `web-sys` and wires the overlay into
//! the hosting frame. It assumes a `wasm32-unknown-unknown` target.
//!
//! # Architecture
//!
//! - `dom`: `DocumentHost` over the live document, with a handle registry
//! - `listeners`: capture-phase pointer, input and keydown listeners
//! - `messaging`: posting to and reading from the parent frame
//! - `frame`: installing and uninstalling the overlay
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-overlay-core` for convenience, so consumers
//! only need to depend on `weaver-overlay-browser`.

// Re-export core crate
pub use weaver_overlay_core;
pub use weaver_overlay_core::*;

pub mod dom;
pub mod frame;
pub mod listeners;
pub mod messaging;

pub use dom::DomDocument;
pub use frame::InstalledOverlay;
pub use listeners::{BrowserListeners, BrowserOverlay, ListenerSet, SharedOverlay, key_combo};
