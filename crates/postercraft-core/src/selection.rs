//! Hit testing and selection queries over a shape list.
//!
//! Locked and hidden shapes are never returned. The safe area is not a shape
//! and so can never be hit.

use crate::shapes::{ShapeId, SharedShape};
use kurbo::{Point, Rect};

fn selectable(shape: &SharedShape) -> bool {
    shape.visible && !shape.is_locked
}

/// Find shapes at a point (document coordinates), front to back.
pub fn shapes_at_point(shapes: &[SharedShape], point: Point, tolerance: f64) -> Vec<ShapeId> {
    shapes
        .iter()
        .rev()
        .filter(|s| selectable(s) && s.hit_test(point, tolerance))
        .map(|s| s.id().to_string())
        .collect()
}

/// Topmost selectable shape at a point.
pub fn topmost_at_point(shapes: &[SharedShape], point: Point, tolerance: f64) -> Option<ShapeId> {
    shapes
        .iter()
        .rev()
        .find(|s| selectable(s) && s.hit_test(point, tolerance))
        .map(|s| s.id().to_string())
}

/// Find shapes whose bounds overlap a selection box, in paint order.
pub fn shapes_in_rect(shapes: &[SharedShape], rect: Rect) -> Vec<ShapeId> {
    let rect = rect.abs();
    shapes
        .iter()
        .filter(|s| selectable(s) && rect.intersect(s.bounds()).area() > 0.0)
        .map(|s| s.id().to_string())
        .collect()
}

/// Union of the bounds of the given shapes.
pub fn selection_bounds(shapes: &[SharedShape], ids: &[ShapeId]) -> Option<Rect> {
    shapes
        .iter()
        .filter(|s| ids.iter().any(|id| id == s.id()))
        .map(|s| s.bounds())
        .reduce(|a, b| a.union(b))
}

/// Ids of every selectable shape.
pub fn selectable_ids(shapes: &[SharedShape]) -> Vec<ShapeId> {
    shapes
        .iter()
        .filter(|s| selectable(s))
        .map(|s| s.id().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeType};
    use std::sync::Arc;

    fn rect(id: &str, x: f64, y: f64) -> Shape {
        let mut shape = Shape::new(ShapeType::Rect).at(x, y);
        shape.id = id.to_string();
        shape
    }

    fn scene() -> Vec<SharedShape> {
        let mut locked = rect("locked", 0.0, 0.0);
        locked.is_locked = true;
        let mut hidden = rect("hidden", 0.0, 0.0);
        hidden.visible = false;
        vec![
            Arc::new(rect("bottom", 0.0, 0.0)),
            Arc::new(rect("top", 50.0, 50.0)),
            Arc::new(locked),
            Arc::new(hidden),
            Arc::new(rect("far", 500.0, 500.0)),
        ]
    }

    #[test]
    fn test_shapes_at_point_front_to_back() {
        let hits = shapes_at_point(&scene(), Point::new(75.0, 75.0), 0.0);
        assert_eq!(hits, vec!["top".to_string(), "bottom".to_string()]);
        assert_eq!(
            topmost_at_point(&scene(), Point::new(75.0, 75.0), 0.0).as_deref(),
            Some("top")
        );
    }

    #[test]
    fn test_selection_box_excludes_locked_and_hidden() {
        let hits = shapes_in_rect(&scene(), Rect::new(-10.0, -10.0, 200.0, 200.0));
        assert_eq!(hits, vec!["bottom".to_string(), "top".to_string()]);
    }

    #[test]
    fn test_selection_box_dragged_backwards() {
        let hits = shapes_in_rect(&scene(), Rect::new(700.0, 700.0, 550.0, 550.0));
        assert_eq!(hits, vec!["far".to_string()]);
    }

    #[test]
    fn test_selection_bounds() {
        let bounds = selection_bounds(&scene(), &["bottom".into(), "top".into()]).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 150.0, 150.0));
        assert!(selection_bounds(&scene(), &[]).is_none());
    }

    #[test]
    fn test_selectable_ids() {
        assert_eq!(selectable_ids(&scene()), vec!["bottom", "top", "far"]);
    }
}
