//! Viewport (stage) transform for pan/zoom.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.05;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 20.0;

/// Stage offset and scale. This is the part of the viewport captured by
/// history snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for StageTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl StageTransform {
    /// Document-to-screen transform.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// The editor viewport: the stage transform plus the on-screen size.
///
/// Converts between screen coordinates and document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    #[serde(flatten)]
    pub stage: StageTransform,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            stage: StageTransform::default(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Transform from document to screen coordinates.
    pub fn transform(&self) -> Affine {
        self.stage.to_affine()
    }

    /// Transform from screen to document coordinates.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.stage.x += delta.x;
        self.stage.y += delta.y;
    }

    /// Zoom uniformly, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.stage.scale_x * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.stage.scale_x).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.stage.scale_x = new_zoom;
        self.stage.scale_y = new_zoom;

        // keep world_point under screen_point
        let new_screen = self.world_to_screen(world_point);
        self.pan(screen_point - new_screen);
    }

    /// Zoom and center so the safe area fills the viewport with `padding` to spare.
    pub fn fit_to(&mut self, bounds: Rect, padding: f64) {
        if bounds.is_zero_area() {
            self.stage = StageTransform::default();
            return;
        }

        let available = Size::new(
            (self.width - padding * 2.0).max(1.0),
            (self.height - padding * 2.0).max(1.0),
        );
        let zoom = (available.width / bounds.width())
            .min(available.height / bounds.height())
            .clamp(MIN_ZOOM, MAX_ZOOM);

        let center = bounds.center();
        self.stage = StageTransform {
            x: self.width / 2.0 - center.x * zoom,
            y: self.height / 2.0 - center.y * zoom,
            scale_x: zoom,
            scale_y: zoom,
        };
    }
}
