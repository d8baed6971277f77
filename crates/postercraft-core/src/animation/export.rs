//! Frame-accurate export of a timeline through the renderer and an encoder.

use super::{AnimationError, Timeline, TweenEngine};
use crate::config::EditorConfig;
use crate::render::{Bitmap, RenderError, Renderer};
use crate::shapes::{ShapeId, SharedShape};
use crate::storage::BoxFuture;
use crate::store::SafeArea;
use crate::viewport::Viewport;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Encoder errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Encoder failed: {0}")]
    Failed(String),
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(ExportFormat),
}

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Export cancelled")]
    Cancelled,
}

/// Animated output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Gif,
    Mp4,
}

/// Sandboxed video/GIF encoder.
pub trait Encoder {
    fn encode(
        &self,
        frames: Vec<Bitmap>,
        fps: u32,
        format: ExportFormat,
    ) -> BoxFuture<'_, Result<Vec<u8>, EncodeError>>;
}

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub fps: u32,
    pub format: ExportFormat,
    pub pixel_ratio: f64,
    /// Capture region; the safe area when `None`.
    pub region: Option<Rect>,
    pub capture_retries: u32,
    pub ready_poll_frames: u32,
}

impl ExportOptions {
    pub fn new(format: ExportFormat, config: &EditorConfig) -> Self {
        Self {
            fps: config.default_fps,
            format,
            pixel_ratio: 1.0,
            region: None,
            capture_retries: config.frame_capture_retries,
            ready_poll_frames: config.ready_poll_frames,
        }
    }

    /// Timestamps of every exported frame: `i / fps` for `i` in `0..=floor(duration * fps)`.
    pub fn frame_times(&self, duration: f64) -> Vec<f64> {
        let fps = self.fps.max(1) as f64;
        let last = (duration.max(0.0) * fps + 1e-9).floor() as u64;
        (0..=last).map(|i| i as f64 / fps).collect()
    }
}

/// Wait, one frame at a time, until the renderer has a node for every id.
pub async fn wait_until_ready<R: Renderer>(
    renderer: &mut R,
    ids: &[ShapeId],
    max_frames: u32,
) -> Result<(), AnimationError> {
    let mut frames = 0;
    loop {
        let missing = ids.iter().find(|id| renderer.find_node_by_id(id).is_none());
        match missing {
            None => return Ok(()),
            Some(id) if frames >= max_frames => {
                log::error!("Renderer never produced node {} after {} frames", id, frames);
                return Err(AnimationError::NotReady(id.clone()));
            }
            Some(_) => {
                renderer.next_frame().await;
                frames += 1;
            }
        }
    }
}

async fn capture<R: Renderer>(
    renderer: &mut R,
    region: Rect,
    pixel_ratio: f64,
    retries: u32,
) -> Result<Bitmap, RenderError> {
    let mut attempt = 0;
    loop {
        match renderer.to_image_data(region, pixel_ratio) {
            Ok(bitmap) => return Ok(bitmap),
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                log::warn!("Frame capture retry {}/{}: {}", attempt, retries, e);
                renderer.next_frame().await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Render every frame of `timeline` and hand the sequence to `encoder`.
///
/// `cancel` is checked before each frame. The timeline is left at its end.
#[allow(clippy::too_many_arguments)]
pub async fn export_animation<R: Renderer, E: Encoder + ?Sized>(
    timeline: &mut Timeline,
    dynamic: &[ShapeId],
    renderer: &mut R,
    encoder: &E,
    safe_area: &SafeArea,
    viewport: &Viewport,
    options: &ExportOptions,
    cancel: &AtomicBool,
) -> Result<Vec<u8>, ExportError> {
    let region = options.region.unwrap_or_else(|| safe_area.rect());
    let times = options.frame_times(timeline.duration());
    log::info!(
        "Exporting {} frame(s) at {} fps as {:?}",
        times.len(),
        options.fps,
        options.format
    );

    timeline.pause();
    timeline.seek(0.0);
    renderer.draw(timeline.shapes(), safe_area, viewport);
    wait_until_ready(renderer, dynamic, options.ready_poll_frames).await?;

    let mut frames = Vec::with_capacity(times.len());
    for (i, time) in times.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            log::info!("Export cancelled at frame {}", i);
            return Err(ExportError::Cancelled);
        }
        timeline.seek(*time);
        renderer.draw(timeline.shapes(), safe_area, viewport);
        renderer.next_frame().await;
        let bitmap = capture(renderer, region, options.pixel_ratio, options.capture_retries)
            .await
            .inspect_err(|e| log::error!("Frame {} failed: {}", i, e))?;
        frames.push(bitmap);
    }

    let output = encoder
        .encode(frames, options.fps, options.format)
        .await
        .inspect_err(|e| log::error!("Encoding failed: {}", e))?;
    log::info!("Export finished ({} bytes)", output.len());
    Ok(output)
}

/// Render `shapes` once and encode the capture as PNG.
pub async fn export_png<R: Renderer>(
    renderer: &mut R,
    shapes: &[SharedShape],
    safe_area: &SafeArea,
    viewport: &Viewport,
    pixel_ratio: f64,
    retries: u32,
) -> Result<Vec<u8>, ExportError> {
    renderer.draw(shapes, safe_area, viewport);
    renderer.next_frame().await;
    let bitmap = capture(renderer, safe_area.rect(), pixel_ratio, retries).await?;
    encode_png(&bitmap)
}

fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, bitmap.width, bitmap.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&bitmap.data)?;
    }
    Ok(png_data)
}
