//! Circle shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// A circle centered on the shape position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub const DEFAULT_RADIUS: f64 = 50.0;

    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

impl ShapeGeometry for Circle {
    fn local_bounds(&self) -> Rect {
        Rect::new(-self.radius, -self.radius, self.radius, self.radius)
    }

    fn to_path(&self) -> BezPath {
        kurbo::Circle::new(Point::ORIGIN, self.radius).to_path(0.1)
    }
}
