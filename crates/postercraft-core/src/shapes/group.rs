//! Group shape for combining multiple shapes.

use super::{Shape, ShapeGeometry};
use kurbo::{BezPath, Rect, Size};
use serde::{Deserialize, Serialize};

/// A group of shapes manipulated as a single unit.
///
/// Children are owned by the group and positioned relative to the group origin.
/// Groups can contain other groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    pub width: f64,
    pub height: f64,
    pub children: Vec<Shape>,
}

impl Group {
    pub fn new(children: Vec<Shape>, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            children,
        }
    }

    /// Find a shape by id within this group (including nested groups).
    pub fn find_shape(&self, id: &str) -> Option<&Shape> {
        for child in &self.children {
            if child.id == id {
                return Some(child);
            }
            if let Some(found) = child.as_group().and_then(|g| g.find_shape(id)) {
                return Some(found);
            }
        }
        None
    }
}

impl ShapeGeometry for Group {
    fn local_bounds(&self) -> Rect {
        let mut children = self.children.iter().map(Shape::bounds);
        match children.next() {
            Some(first) => children.fold(first, |acc, b| acc.union(b)),
            None => Rect::new(0.0, 0.0, self.width, self.height),
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.children {
            path.extend(child.transform() * child.to_path());
        }
        path
    }

    fn declared_size(&self) -> Option<Size> {
        Some(Size::new(self.width, self.height))
    }
}
