//! Core overlay types: mode families, mode flags, and selection state.
//!
//! These types are host-agnostic and hold node handles only, never nodes.

use crate::descriptor::ElementDescriptor;
use crate::host::NodeId;
use crate::surrogate::SurrogateSession;

/// Which overlay mode a highlight, style sheet or listener set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeFamily {
    Inspect,
    Edit,
}

impl ModeFamily {
    pub const ALL: [ModeFamily; 2] = [ModeFamily::Inspect, ModeFamily::Edit];

    /// Class marking the highlighted node for this family.
    pub fn highlight_class(self) -> &'static str {
        match self {
            Self::Inspect => "inspector-highlight",
            Self::Edit => "editor-highlight",
        }
    }

    /// Class put on `<body>` while the mode is active.
    pub fn indicator_class(self) -> &'static str {
        match self {
            Self::Inspect => "inspector-active",
            Self::Edit => "text-editor-active",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::Edit => "edit",
        }
    }
}

/// Externally visible overlay mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Inactive,
    Inspecting,
    Editing,
}

/// The two independently toggled activation flags.
///
/// The controller never activates both at once, but nothing here forbids it;
/// each flag owns its own listeners and style sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub inspect: bool,
    pub edit: bool,
}

impl ModeFlags {
    pub fn is_active(&self, family: ModeFamily) -> bool {
        match family {
            ModeFamily::Inspect => self.inspect,
            ModeFamily::Edit => self.edit,
        }
    }

    pub fn set(&mut self, family: ModeFamily, active: bool) {
        match family {
            ModeFamily::Inspect => self.inspect = active,
            ModeFamily::Edit => self.edit = active,
        }
    }

    /// Edit wins when both flags are up.
    pub fn mode(&self) -> Mode {
        if self.edit {
            Mode::Editing
        } else if self.inspect {
            Mode::Inspecting
        } else {
            Mode::Inactive
        }
    }
}

/// What a persistent selection is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionKind {
    /// Picked in inspect mode. No marker, no editing.
    Inspected,
    /// Plain-text node picked in edit mode (or its surrogate once enabled).
    Text,
    /// Image target picked in edit mode. Edited in place, never replaced.
    Image,
}

/// The persistently selected node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selected {
    pub node: NodeId,
    pub family: ModeFamily,
    pub kind: SelectionKind,
    /// Id the node carried before the edit marker displaced it.
    pub displaced_id: Option<String>,
}

/// The hovered node and the family whose highlight it wears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hovered {
    pub node: NodeId,
    pub family: ModeFamily,
}

/// Everything the overlay tracks between events.
///
/// One instance per overlay, created with it and dropped with it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub(crate) hovered: Option<Hovered>,
    pub(crate) selected: Option<Selected>,
    pub(crate) session: Option<SurrogateSession>,
    pub(crate) modes: ModeFlags,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<Hovered> {
        self.hovered
    }

    pub fn selected(&self) -> Option<&Selected> {
        self.selected.as_ref()
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected.as_ref().map(|s| s.node)
    }

    /// Whether `node` is the persistent selection.
    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selected_node() == Some(node)
    }

    pub fn session(&self) -> Option<&SurrogateSession> {
        self.session.as_ref()
    }

    /// Snapshot of the node swapped out for the surrogate.
    ///
    /// Present exactly while a surrogate substitution is active.
    pub fn original_descriptor(&self) -> Option<&ElementDescriptor> {
        self.session.as_ref().map(|s| &s.original_descriptor)
    }

    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    /// Whether something is selected under `family`.
    pub fn has_selection_in(&self, family: ModeFamily) -> bool {
        self.selected.as_ref().is_some_and(|s| s.family == family)
    }

    /// Every node handle the state still references.
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(4);
        if let Some(hovered) = self.hovered {
            nodes.push(hovered.node);
        }
        if let Some(selected) = &self.selected {
            nodes.push(selected.node);
        }
        if let Some(session) = &self.session {
            nodes.push(session.surrogate);
            nodes.push(session.original);
        }
        nodes
    }
}
