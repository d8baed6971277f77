//! Image shape for raster and SVG images.

use super::ShapeGeometry;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{BezPath, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// Image format of embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Svg,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
        let head = head.trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some(ImageFormat::Svg);
        }
        None
    }
}

/// An image placed with its top-left corner at the shape position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Data URI or URL of the displayed (possibly cropped) image.
    pub src: String,
    /// The original, uncropped source, kept for re-cropping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_src: Option<String>,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub is_svg_image: bool,
    #[serde(default)]
    pub is_svg_group: bool,
}

impl Image {
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            initial_src: None,
            width,
            height,
            is_svg_image: false,
            is_svg_group: false,
        }
    }

    /// Embed raw image bytes as a base64 data URI.
    ///
    /// Returns `None` when the bytes are not a recognised image format.
    pub fn from_bytes(data: &[u8], width: f64, height: f64) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        let mut image = Self::new(
            format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data)),
            width,
            height,
        );
        image.is_svg_image = format == ImageFormat::Svg;
        Some(image)
    }

    /// Replace the displayed source with a cropped version, remembering the original.
    pub fn crop(&mut self, cropped_src: impl Into<String>, width: f64, height: f64) {
        if self.initial_src.is_none() {
            self.initial_src = Some(std::mem::take(&mut self.src));
        }
        self.src = cropped_src.into();
        self.width = width;
        self.height = height;
    }

    /// The source to crop from: the original if this image was already cropped.
    pub fn crop_source(&self) -> &str {
        self.initial_src.as_deref().unwrap_or(&self.src)
    }

    /// Scale down (never up) to fit within the given size, preserving aspect ratio.
    pub fn fit_within(&mut self, max: Size) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let scale = (max.width / self.width).min(max.height / self.height).min(1.0);
        self.width *= scale;
        self.height *= scale;
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::new(String::new(), 100.0, 100.0)
    }
}

impl ShapeGeometry for Image {
    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn to_path(&self) -> BezPath {
        self.local_bounds().to_path(0.1)
    }

    fn declared_size(&self) -> Option<Size> {
        Some(Size::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"hello"), None);
    }

    #[test]
    fn test_from_bytes_builds_data_uri() {
        let image = Image::from_bytes(&PNG_MAGIC, 10.0, 10.0).unwrap();
        assert!(image.src.starts_with("data:image/png;base64,"));
        assert!(!image.is_svg_image);
    }

    #[test]
    fn test_crop_keeps_original() {
        let mut image = Image::new("original.png", 200.0, 100.0);
        image.crop("crop-1.png", 100.0, 100.0);
        image.crop("crop-2.png", 50.0, 50.0);
        assert_eq!(image.initial_src.as_deref(), Some("original.png"));
        assert_eq!(image.crop_source(), "original.png");
        assert_eq!(image.src, "crop-2.png");
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        let mut image = Image::new("a.png", 2000.0, 1000.0);
        image.fit_within(Size::new(500.0, 500.0));
        assert!((image.width - 500.0).abs() < 1e-9);
        assert!((image.height - 250.0).abs() < 1e-9);

        let mut small = Image::new("b.png", 50.0, 50.0);
        small.fit_within(Size::new(500.0, 500.0));
        assert!((small.width - 50.0).abs() < 1e-9);
    }
}
