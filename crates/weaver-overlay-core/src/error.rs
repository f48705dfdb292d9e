//! Error types for overlay operations.
//!
//! None of these cross the message boundary: the overlay logs them and keeps
//! the hosted document interactive.

use thiserror::Error;

/// Errors that can occur while handling an overlay event or command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OverlayError {
    /// Message `type` is not part of the protocol.
    #[error("unsupported command: {0}")]
    UnknownCommand(String),

    /// Message has a known `type` but an unusable payload.
    #[error("malformed {kind} command: {reason}")]
    MalformedCommand { kind: String, reason: String },

    /// Message has no `type` discriminator at all.
    #[error("message without a type discriminator")]
    MissingType,

    /// A node the command needs is not in the document.
    #[error("node not found: {0}")]
    MissingNode(String),

    /// Command needs a selected node.
    #[error("no element selected")]
    NoSelection,

    /// Command needs an active text surrogate.
    #[error("no text surrogate active")]
    NoSurrogate,

    /// The host refused an operation.
    #[error("host error: {0}")]
    Host(String),
}

impl OverlayError {
    /// Whether this is expected noise (controller sent something we ignore)
    /// rather than a sign of a host problem.
    pub fn is_benign(&self) -> bool {
        !matches!(self, Self::Host(_))
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::MalformedCommand {
            kind: "unknown".to_string(),
            reason: e.to_string(),
        }
    }
}
