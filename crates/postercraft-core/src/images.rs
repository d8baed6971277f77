//! Image loading boundary.
//!
//! Decoding and fetching happen outside the core; an [`ImageLoader`] only
//! reports the resolved source and its natural size.

use crate::storage::BoxFuture;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to fetch image: {0}")]
    Fetch(String),
    #[error("Unsupported image format")]
    UnsupportedFormat,
    /// The provider refused the request because of a quota; retry later.
    #[error("Image provider rate limit reached")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl ImageError {
    /// Whether the caller should offer a retry instead of reporting a failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImageError::RateLimited { .. })
    }
}

/// A decoded image ready to be placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// Source to store on the shape (URL or data URI).
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub is_svg: bool,
}

/// Resolves an image source to its natural dimensions.
pub trait ImageLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageError>>;
}

/// Loader for data URIs and raw bytes already in memory: reads the size from
/// the PNG header without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngHeaderLoader;

impl PngHeaderLoader {
    /// Natural size of an encoded PNG.
    pub fn png_size(data: &[u8]) -> Result<(u32, u32), ImageError> {
        let decoder = png::Decoder::new(data);
        let reader = decoder
            .read_info()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let info = reader.info();
        Ok((info.width, info.height))
    }
}

impl ImageLoader for PngHeaderLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageError>> {
        Box::pin(async move {
            use base64::Engine;
            use base64::engine::general_purpose::STANDARD;

            let payload = src
                .strip_prefix("data:image/png;base64,")
                .ok_or(ImageError::UnsupportedFormat)?;
            let bytes = STANDARD
                .decode(payload)
                .map_err(|e| ImageError::Decode(e.to_string()))?;
            let (width, height) = Self::png_size(&bytes)?;
            Ok(LoadedImage {
                src: src.to_string(),
                width,
                height,
                is_svg: false,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable() {
        assert!(ImageError::RateLimited { retry_after_secs: Some(30) }.is_retryable());
        assert!(!ImageError::Decode("bad".into()).is_retryable());
    }

    #[test]
    fn test_png_size_rejects_garbage() {
        assert!(matches!(
            PngHeaderLoader::png_size(b"not a png"),
            Err(ImageError::Decode(_))
        ));
    }
}
