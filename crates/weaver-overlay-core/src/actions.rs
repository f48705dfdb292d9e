//! Overlay input types.
//!
//! Platform-agnostic definitions for the pointer and keyboard events the
//! overlay reacts to. Platform code converts native events into these and
//! applies the returned outcome (preventDefault, stopPropagation).

use smol_str::SmolStr;

use crate::host::NodeId;

/// Pointer events the overlay listens for in the capture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Pointer moved over a target (`mousemove`).
    Move,
    /// Primary click (`click`).
    Click,
    /// Pointer left a target (`mouseleave`).
    Leave,
}

/// A pointer event, resolved to a node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Event target. `None` when the target isn't a node we can resolve.
    pub target: Option<NodeId>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, target: Option<NodeId>) -> Self {
        Self { kind, target }
    }

    pub fn moved(target: NodeId) -> Self {
        Self::new(PointerKind::Move, Some(target))
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(PointerKind::Click, Some(target))
    }

    pub fn leave() -> Self {
        Self::new(PointerKind::Leave, None)
    }
}

/// What the platform should do with an event after the overlay saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventOutcome {
    /// Let the page see the event untouched.
    pub const PASS: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    /// Swallow the event: no default action, no page handlers.
    pub const CAPTURED: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };
}

/// Key values for keyboard input.
///
/// Only the keys the overlay reacts to get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    Enter,
    Escape,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a `KeyboardEvent.key` value.
    pub fn parse(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            s if s.chars().count() == 1 => Key::character(s),
            _ => Key::Unidentified,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }

    /// Escape (any modifiers) or a bare Enter: the keys that close an editor.
    ///
    /// Shift+Enter stays a newline inside the surrogate.
    pub fn closes_editor(&self) -> bool {
        match self.key {
            Key::Escape => true,
            Key::Enter => self.modifiers.is_empty(),
            _ => false,
        }
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not for the overlay, let the page handle it.
    NotHandled,
}
