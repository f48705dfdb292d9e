use serde::{Deserialize, Serialize};

/// Overlay settings supplied by the embedding page.
///
/// Every field has a default, so a partial (or absent) object from JS is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Id stamped on the node picked for editing (and on its surrogate).
    pub marker_id: String,
    /// Characters of text kept in a descriptor's `textContent`.
    pub text_preview_len: usize,
    /// Highlight outline colour, packed as 0xRRGGBBAA.
    pub accent_color: u32,
    /// Alpha of the fill behind highlighted elements.
    pub highlight_alpha: f32,
    /// Target origin for messages posted to the parent frame.
    pub target_origin: String,
    /// Echo ignored commands back to the controller as `CONSOLE_LOG`.
    pub forward_diagnostics: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            marker_id: "edited-element".to_owned(),
            text_preview_len: 100,
            accent_color: 0x3b82f6ff,
            highlight_alpha: 0.1,
            target_origin: "*".to_owned(),
            forward_diagnostics: false,
        }
    }
}

impl OverlayConfig {
    /// Parse a config object, falling back to defaults for missing fields.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = OverlayConfig::from_json(serde_json::json!({
            "markerId": "picked",
            "forwardDiagnostics": true,
        }))
        .unwrap();

        assert_eq!(config.marker_id, "picked");
        assert!(config.forward_diagnostics);
        assert_eq!(config.text_preview_len, 100);
        assert_eq!(config.target_origin, "*");
    }

    #[test]
    fn test_null_config_is_default() {
        let config = OverlayConfig::from_json(serde_json::Value::Null).unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn test_bad_field_type_rejected() {
        assert!(OverlayConfig::from_json(serde_json::json!({ "textPreviewLen": "long" })).is_err());
    }
}
