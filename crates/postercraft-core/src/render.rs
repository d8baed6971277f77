//! Interface to the external scene-graph renderer.

use crate::shapes::SharedShape;
use crate::storage::BoxFuture;
use crate::store::SafeArea;
use crate::viewport::Viewport;
use kurbo::Rect;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// The frame was not ready yet; capturing again later may succeed.
    #[error("Frame not ready: {0}")]
    Transient(String),
    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
    #[error("Invalid bitmap: expected {expected} bytes, got {actual}")]
    InvalidBitmap { expected: usize, actual: usize },
}

impl RenderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RenderError::Transient(_))
    }
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// A captured RGBA8 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::InvalidBitmap {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// A fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }
}

/// The rendering library that turns shapes into pixels.
///
/// `draw` schedules a redraw of the whole scene; nodes for new shapes may
/// only exist after one or more [`next_frame`](Renderer::next_frame) ticks.
pub trait Renderer {
    /// Handle to a materialized scene node.
    type Node;

    fn draw(&mut self, shapes: &[SharedShape], safe_area: &SafeArea, viewport: &Viewport);

    fn find_node_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Capture `region` (document coordinates) at `pixel_ratio`.
    fn to_image_data(&mut self, region: Rect, pixel_ratio: f64) -> RenderResult<Bitmap>;

    /// Resolves once the next frame has been rendered.
    fn next_frame(&mut self) -> BoxFuture<'_, ()>;
}
