//! Rectangle shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A rectangle with optional rounded corners, anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    /// Side length of a newly added rectangle.
    pub const DEFAULT_SIZE: f64 = 100.0;

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: 0.0,
        }
    }

    /// Create a rectangle spanning two corner points, returning its top-left corner too.
    pub fn from_corners(p1: kurbo::Point, p2: kurbo::Point) -> (kurbo::Point, Self) {
        let origin = kurbo::Point::new(p1.x.min(p2.x), p1.y.min(p2.y));
        (origin, Self::new((p2.x - p1.x).abs(), (p2.y - p1.y).abs()))
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE, Self::DEFAULT_SIZE)
    }
}

impl ShapeGeometry for Rectangle {
    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn to_path(&self) -> BezPath {
        if self.corner_radius > 0.0 {
            RoundedRect::from_rect(self.local_bounds(), self.corner_radius).to_path(0.1)
        } else {
            self.local_bounds().to_path(0.1)
        }
    }

    fn declared_size(&self) -> Option<Size> {
        Some(Size::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_rectangle_from_corners() {
        let (origin, rect) =
            Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert!((origin.x - 50.0).abs() < f64::EPSILON);
        assert!((origin.y - 50.0).abs() < f64::EPSILON);
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_local_bounds() {
        let rect = Rectangle::new(100.0, 50.0);
        let bounds = rect.local_bounds();
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rounded_path_stays_inside_bounds() {
        let mut rect = Rectangle::new(100.0, 50.0);
        rect.corner_radius = 10.0;
        let path_bounds = rect.to_path().bounding_box();
        assert!(path_bounds.x0 >= -1e-9 && path_bounds.x1 <= 100.0 + 1e-9);
    }
}
