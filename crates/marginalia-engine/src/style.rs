//! Style configuration for rendered highlights.

use serde::{Deserialize, Serialize};

/// Outline variant drawn along the bottom edge of each highlight rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineShape {
    /// Single solid segment.
    #[default]
    Straight,
    /// Same segment with a fixed dash/gap pattern.
    Dashed,
    /// Alternating quadratic humps.
    Wave,
}

/// Dash and gap lengths used by [`LineShape::Dashed`].
pub const DASH_PATTERN: (f64, f64) = (6.0, 3.0);

/// Horizontal extent of one wave hump.
pub const WAVE_SEGMENT_WIDTH: f64 = 12.0;

/// Vertical amplitude of each wave hump.
pub const WAVE_AMPLITUDE: f64 = 2.0;

/// Brush configuration applied to a span's fill and outline sublayers.
///
/// Colors are CSS color strings; interpreting them is the rendering surface's
/// concern, the engine only carries them through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Fill color of the highlight rectangles.
    pub rect_fill: String,
    /// Stroke color of the underline shapes.
    pub line_stroke: String,
    /// Stroke width of the underline shapes.
    pub line_width: f64,
    /// Which underline variant to draw.
    pub line_shape: LineShape,
    /// Optional device pixel ratio hint for raster surfaces.
    pub pixel_ratio: Option<f64>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            rect_fill: "rgba(255, 170, 0, 0.2)".to_string(),
            line_stroke: "#00c8a4".to_string(),
            line_width: 2.0,
            line_shape: LineShape::default(),
            pixel_ratio: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_matches_palette() {
        let style = MarkerStyle::default();
        assert_eq!(style.rect_fill, "rgba(255, 170, 0, 0.2)");
        assert_eq!(style.line_stroke, "#00c8a4");
        assert_eq!(style.line_width, 2.0);
        assert_eq!(style.line_shape, LineShape::Straight);
        assert!(style.pixel_ratio.is_none());
    }

    #[test]
    fn test_style_serialization_roundtrip() {
        let style = MarkerStyle {
            line_shape: LineShape::Wave,
            pixel_ratio: Some(2.0),
            ..MarkerStyle::default()
        };

        let json = serde_json::to_string(&style).unwrap();
        let back: MarkerStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(style, back);
    }

    #[test]
    fn test_line_shape_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LineShape::Wave).unwrap(), "\"wave\"");
        assert_eq!(
            serde_json::to_string(&LineShape::Straight).unwrap(),
            "\"straight\""
        );
    }
}
