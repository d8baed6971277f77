//! Regular polygons (triangles included) and stars.

use super::ShapeGeometry;
use super::line::{flat_points_bounds, flat_points_path};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A regular polygon centered on the shape position, first vertex pointing up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularPolygon {
    pub sides: u32,
    pub radius: f64,
}

impl RegularPolygon {
    pub const DEFAULT_RADIUS: f64 = 60.0;

    pub fn new(sides: u32, radius: f64) -> Self {
        Self { sides: sides.max(3), radius }
    }

    pub fn vertices(&self) -> Vec<Point> {
        let sides = self.sides.max(3);
        (0..sides)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / sides as f64;
                Point::new(self.radius * angle.sin(), -self.radius * angle.cos())
            })
            .collect()
    }
}

impl ShapeGeometry for RegularPolygon {
    fn local_bounds(&self) -> Rect {
        let mut vertices = self.vertices().into_iter();
        let first = vertices.next().unwrap_or(Point::ORIGIN);
        vertices.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for (i, p) in self.vertices().into_iter().enumerate() {
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();
        path
    }
}

/// A star outline stored as a flat, closed point list around the shape position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub points: Vec<f64>,
}

impl Star {
    pub const DEFAULT_OUTER_RADIUS: f64 = 50.0;
    pub const DEFAULT_INNER_RADIUS: f64 = 20.0;

    /// Build a star with `tips` outer points alternating with inner points.
    pub fn with_tips(tips: u32, outer_radius: f64, inner_radius: f64) -> Self {
        let count = tips.max(2) * 2;
        let points = (0..count)
            .flat_map(|i| {
                let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
                let angle = PI * i as f64 / (count / 2) as f64;
                [radius * angle.sin(), -radius * angle.cos()]
            })
            .collect();
        Self { points }
    }
}

impl Default for Star {
    /// The fixed five-point star every new star shape starts from.
    fn default() -> Self {
        Self::with_tips(5, Self::DEFAULT_OUTER_RADIUS, Self::DEFAULT_INNER_RADIUS)
    }
}

impl ShapeGeometry for Star {
    fn local_bounds(&self) -> Rect {
        flat_points_bounds(&self.points)
    }

    fn to_path(&self) -> BezPath {
        flat_points_path(&self.points, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_vertices() {
        let triangle = RegularPolygon::new(3, 10.0);
        let vertices = triangle.vertices();
        assert_eq!(vertices.len(), 3);
        assert!((vertices[0].x).abs() < 1e-9);
        assert!((vertices[0].y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sides_are_clamped() {
        assert_eq!(RegularPolygon::new(1, 10.0).sides, 3);
    }

    #[test]
    fn test_default_star_has_ten_vertices() {
        let star = Star::default();
        assert_eq!(star.points.len(), 20);
        let bounds = star.local_bounds();
        assert!((bounds.y0 + Star::DEFAULT_OUTER_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn test_default_star_is_fixed() {
        assert_eq!(Star::default(), Star::default());
    }
}
