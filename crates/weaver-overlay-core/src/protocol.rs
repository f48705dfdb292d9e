//! Wire protocol between the overlay and its parent-frame controller.
//!
//! Every message is a JSON object with a `type` discriminator in
//! SCREAMING_SNAKE_CASE. Inbound messages are commands, outbound messages are
//! notifications; neither side ever waits for a reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::ElementDescriptor;
use crate::error::OverlayError;

/// Commands sent by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    InspectorActivate {
        #[serde(default)]
        active: bool,
    },
    InspectorClearSelection,
    EditorActivate {
        #[serde(default)]
        active: bool,
    },
    TextEditorClearSelection,
    DeselectElement,
    EnableTextEditor,
    SetBold {
        #[serde(default)]
        active: bool,
    },
    SetItalic {
        #[serde(default)]
        active: bool,
    },
    SetAlignment {
        #[serde(default)]
        align: String,
    },
    SetNumberedList,
    SetBulletList,
    TextEditorGenerateText {
        #[serde(default)]
        content: String,
    },
    SetElementStyle {
        style: String,
    },
    TextEditorUpdateImageSource {
        src: String,
    },
    TextEditorUpdateImageFit {
        #[serde(rename = "objectFit")]
        object_fit: String,
    },
}

impl InboundMessage {
    /// Every `type` value the overlay understands.
    pub const TYPES: [&'static str; 15] = [
        "INSPECTOR_ACTIVATE",
        "INSPECTOR_CLEAR_SELECTION",
        "EDITOR_ACTIVATE",
        "TEXT_EDITOR_CLEAR_SELECTION",
        "DESELECT_ELEMENT",
        "ENABLE_TEXT_EDITOR",
        "SET_BOLD",
        "SET_ITALIC",
        "SET_ALIGNMENT",
        "SET_NUMBERED_LIST",
        "SET_BULLET_LIST",
        "TEXT_EDITOR_GENERATE_TEXT",
        "SET_ELEMENT_STYLE",
        "TEXT_EDITOR_UPDATE_IMAGE_SOURCE",
        "TEXT_EDITOR_UPDATE_IMAGE_FIT",
    ];

    /// Parse a raw message.
    ///
    /// Unknown types and bad payloads are told apart so the caller can log
    /// them differently; both are ignored.
    pub fn from_value(value: Value) -> Result<Self, OverlayError> {
        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) | None => return Err(OverlayError::MissingType),
        };
        if !Self::TYPES.contains(&kind.as_str()) {
            return Err(OverlayError::UnknownCommand(kind));
        }
        serde_json::from_value(value).map_err(|e| OverlayError::MalformedCommand {
            kind,
            reason: e.to_string(),
        })
    }

    /// The wire `type` of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InspectorActivate { .. } => "INSPECTOR_ACTIVATE",
            Self::InspectorClearSelection => "INSPECTOR_CLEAR_SELECTION",
            Self::EditorActivate { .. } => "EDITOR_ACTIVATE",
            Self::TextEditorClearSelection => "TEXT_EDITOR_CLEAR_SELECTION",
            Self::DeselectElement => "DESELECT_ELEMENT",
            Self::EnableTextEditor => "ENABLE_TEXT_EDITOR",
            Self::SetBold { .. } => "SET_BOLD",
            Self::SetItalic { .. } => "SET_ITALIC",
            Self::SetAlignment { .. } => "SET_ALIGNMENT",
            Self::SetNumberedList => "SET_NUMBERED_LIST",
            Self::SetBulletList => "SET_BULLET_LIST",
            Self::TextEditorGenerateText { .. } => "TEXT_EDITOR_GENERATE_TEXT",
            Self::SetElementStyle { .. } => "SET_ELEMENT_STYLE",
            Self::TextEditorUpdateImageSource { .. } => "TEXT_EDITOR_UPDATE_IMAGE_SOURCE",
            Self::TextEditorUpdateImageFit { .. } => "TEXT_EDITOR_UPDATE_IMAGE_FIT",
        }
    }
}

/// How an image target carries its picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Img,
    Background,
}

/// Image facts sent along with `OPEN_IMAGE_EDITOR`.
///
/// Absent facts are sent as `null`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    #[serde(rename = "type")]
    pub kind: Option<ImageKind>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub background_image: Option<String>,
    pub background_size: Option<String>,
    pub object_fit: Option<String>,
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
}

/// Descriptor of an image target with its image facts alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElementInfo {
    #[serde(flatten)]
    pub element: ElementDescriptor,
    pub image_info: ImageInfo,
}

/// Notifications sent to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Sent once when the overlay is installed.
    EditorToolsReady,
    InspectorHover {
        #[serde(rename = "elementInfo")]
        element_info: ElementDescriptor,
    },
    InspectorClick {
        #[serde(rename = "elementInfo")]
        element_info: ElementDescriptor,
    },
    OpenTextEditor {
        #[serde(rename = "elementInfo")]
        element_info: ElementDescriptor,
    },
    TextEditorClose,
    TextEditorTextChange {
        value: String,
    },
    OpenImageEditor {
        #[serde(rename = "elementInfo")]
        element_info: ImageElementInfo,
    },
    CloseImageEditor,
    ConsoleLog {
        value: String,
    },
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<Value, OverlayError> {
        Ok(serde_json::to_value(self)?)
    }
}
