//! Color utilities for overlay highlight styling.

/// Convert RGBA u32 (packed as 0xRRGGBBAA) to a CSS `#rrggbb` string.
///
/// Alpha is dropped; outlines are always drawn opaque.
pub fn rgba_u32_to_hex(color: u32) -> String {
    let r = (color >> 24) & 0xFF;
    let g = (color >> 16) & 0xFF;
    let b = (color >> 8) & 0xFF;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Convert RGBA u32 to CSS rgba() string with a custom alpha value.
///
/// Used for the translucent fill behind highlighted elements.
pub fn rgba_u32_to_css_alpha(color: u32, alpha: f32) -> String {
    let r = (color >> 24) & 0xFF;
    let g = (color >> 16) & 0xFF;
    let b = (color >> 8) & 0xFF;
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}
