//! Text shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// Horizontal alignment inside the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "underline")]
    Underline,
    #[serde(rename = "line-through")]
    LineThrough,
}

/// A text box anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub text_decoration: TextDecoration,
    /// Fixed wrapping width; `None` sizes the box to its content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

fn default_line_height() -> f64 {
    1.0
}

impl Text {
    pub const DEFAULT_FONT_FAMILY: &'static str = "Roboto";
    pub const DEFAULT_FONT_SIZE: f64 = 32.0;

    /// Average glyph advance as a fraction of the font size. Font shaping is
    /// the renderer's job; this only feeds selection boxes and grouping.
    const APPROX_CHAR_WIDTH: f64 = 0.6;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            line_height: default_line_height(),
            align: TextAlign::default(),
            text_decoration: TextDecoration::default(),
            width: None,
        }
    }

    fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }

    /// Approximate content size.
    pub fn measured_size(&self) -> Size {
        let widest = self.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = self
            .width
            .unwrap_or(widest as f64 * self.font_size * Self::APPROX_CHAR_WIDTH);
        let height = self.line_count() as f64 * self.font_size * self.line_height;
        Size::new(width, height)
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new("Text")
    }
}

impl ShapeGeometry for Text {
    fn local_bounds(&self) -> Rect {
        self.measured_size().to_rect()
    }

    fn to_path(&self) -> BezPath {
        self.local_bounds().to_path(0.1)
    }

    fn declared_size(&self) -> Option<Size> {
        self.width.map(|_| self.measured_size())
    }
}
