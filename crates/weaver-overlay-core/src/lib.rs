//! weaver-overlay-core: Pure Rust inspector/editor overlay logic.
//!
//! The overlay runs inside a hosted frame and lets a parent controller
//! inspect, select and edit elements of the rendered document. Every command
//! comes in as a message and every observation goes out as one.
//!
//! This crate provides:
//! - `DocumentHost` / `ListenerRegistry` traits abstracting the live tree
//!   and event wiring
//! - `MemoryDocument` - an in-memory host for headless use and tests
//! - `ElementDescriptor` snapshots and content classification
//! - `Overlay<D, L>` - the selection and edit state machine

pub mod actions;
pub mod classify;
pub mod color;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod highlight;
pub mod host;
pub mod lists;
pub mod memory;
pub mod overlay;
pub mod protocol;
pub mod surrogate;
pub mod types;

#[cfg(test)]
mod tests;

pub use actions::{EventOutcome, Key, KeyCombo, KeydownResult, Modifiers, PointerEvent, PointerKind};
pub use classify::{
    TEXT_ELEMENTS, has_background_image, image_info, is_image_like, is_plain_text_editable,
    is_text_tag, resolve_image_target,
};
pub use config::OverlayConfig;
pub use descriptor::{Attribute, ElementDescriptor, describe};
pub use dispatch::StylePreset;
pub use error::OverlayError;
pub use highlight::HighlightController;
pub use host::{DocumentHost, ListenerRegistry, NodeId, NodeKind, Rect};
pub use lists::{
    convert_to_bullet_list, convert_to_numbered_list, convert_to_plain_text, is_bullet_list,
    is_numbered_list, toggle_bullet_list, toggle_numbered_list,
};
pub use memory::{ListenerLog, MemoryDocument, RecordingListeners, Subscription};
pub use overlay::Overlay;
pub use protocol::{ImageElementInfo, ImageInfo, ImageKind, InboundMessage, OutboundMessage};
pub use smol_str::SmolStr;
pub use surrogate::{SurrogateSession, seed_text};
pub use types::{Hovered, Mode, ModeFamily, ModeFlags, Selected, SelectionKind, SelectionState};
