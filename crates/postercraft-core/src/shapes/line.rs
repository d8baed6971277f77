//! Polyline shape.

use super::{ShapeGeometry, point_to_polyline_dist};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// An open or closed polyline; `points` is a flat `[x0, y0, x1, y1, ...]` list
/// relative to the shape position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub points: Vec<f64>,
    #[serde(default)]
    pub closed: bool,
}

impl Line {
    pub fn new(points: Vec<f64>) -> Self {
        Self { points, closed: false }
    }

    /// Vertices as points.
    pub fn vertices(&self) -> Vec<Point> {
        flat_to_points(&self.points)
    }

    /// Check if a local-space point lies within `tolerance` of the polyline.
    pub fn hit_test(&self, local: Point, tolerance: f64) -> bool {
        let mut vertices = self.vertices();
        if self.closed {
            if let Some(&first) = vertices.first() {
                vertices.push(first);
            }
        }
        point_to_polyline_dist(local, &vertices) <= tolerance
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new(vec![0.0, 0.0, 200.0, 0.0])
    }
}

impl ShapeGeometry for Line {
    fn local_bounds(&self) -> Rect {
        flat_points_bounds(&self.points)
    }

    fn to_path(&self) -> BezPath {
        flat_points_path(&self.points, self.closed)
    }
}

/// Convert a flat coordinate list to points, ignoring a trailing odd value.
pub(crate) fn flat_to_points(points: &[f64]) -> Vec<Point> {
    points.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect()
}

pub(crate) fn flat_points_bounds(points: &[f64]) -> Rect {
    let mut vertices = flat_to_points(points).into_iter();
    let Some(first) = vertices.next() else {
        return Rect::ZERO;
    };
    vertices.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
}

pub(crate) fn flat_points_path(points: &[f64], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut vertices = flat_to_points(points).into_iter();
    if let Some(first) = vertices.next() {
        path.move_to(first);
        for p in vertices {
            path.line_to(p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}
