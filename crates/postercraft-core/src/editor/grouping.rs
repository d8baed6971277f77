//! Grouping and ungrouping.

use super::Editor;
use crate::shapes::{
    Group, Shape, ShapeId, ShapeKind, ShapeStyle, ShapeType, SharedShape, generate_id,
};
use kurbo::{Point, Size};
use std::sync::Arc;

fn extent(shape: &Shape) -> Size {
    shape.declared_size().unwrap_or(Size::ZERO)
}

/// Box spanned by shape positions and declared sizes (missing sizes count as 0).
fn position_box(shapes: &[&SharedShape]) -> Option<(Point, Size)> {
    let mut iter = shapes.iter();
    let first = iter.next()?;
    let size = extent(first);
    let (mut x0, mut y0) = (first.position.x, first.position.y);
    let (mut x1, mut y1) = (x0 + size.width, y0 + size.height);
    for shape in iter {
        let size = extent(shape);
        x0 = x0.min(shape.position.x);
        y0 = y0.min(shape.position.y);
        x1 = x1.max(shape.position.x + size.width);
        y1 = y1.max(shape.position.y + size.height);
    }
    Some((Point::new(x0, y0), Size::new(x1 - x0, y1 - y0)))
}

impl Editor {
    /// Group two or more unlocked shapes into a new group and select it.
    ///
    /// Children keep their paint order and are moved into group-local
    /// coordinates. The group takes the place of the frontmost member.
    pub fn group_shapes(&mut self, ids: &[ShapeId]) -> Option<ShapeId> {
        let targets = self.unlocked_targets(ids);
        let members: Vec<(usize, &SharedShape)> = self
            .shapes()
            .iter()
            .enumerate()
            .filter(|(_, s)| targets.contains(s.id()))
            .collect();
        if members.len() < 2 {
            return None;
        }

        let member_shapes: Vec<&SharedShape> = members.iter().map(|(_, s)| *s).collect();
        let (origin, size) = position_box(&member_shapes)?;
        let frontmost = members.last().map(|(i, _)| *i)?;
        let children: Vec<Shape> = member_shapes
            .iter()
            .map(|s| {
                let mut child = Shape::clone(s);
                child.translate(-origin.to_vec2());
                child
            })
            .collect();

        let group_id = generate_id(ShapeType::Group);
        let group = Shape::with_kind(
            group_id.clone(),
            ShapeKind::Group(Group::new(children, size)),
            ShapeStyle::default(),
        )
        .at(origin.x, origin.y);

        let removed_before_front = members.len() - 1;
        let mut shapes: Vec<SharedShape> = self
            .shapes()
            .iter()
            .filter(|s| !targets.contains(s.id()))
            .cloned()
            .collect();
        let insert_at = (frontmost - removed_before_front).min(shapes.len());
        shapes.insert(insert_at, Arc::new(group));

        log::debug!("Grouped {} shapes into {}", removed_before_front + 1, group_id);
        self.write_shapes_and_select(shapes, vec![group_id.clone()]);
        self.commit();
        Some(group_id)
    }

    /// Dissolve every group among `ids`, restoring children to document
    /// space in the group's place, and select the restored children.
    pub fn ungroup_shapes(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let targets = self.unlocked_targets(ids);
        let mut restored = Vec::new();
        let mut shapes = Vec::with_capacity(self.shapes().len());
        for shape in self.shapes() {
            let group = match &shape.kind {
                ShapeKind::Group(group) if targets.contains(shape.id()) => group,
                _ => {
                    shapes.push(shape.clone());
                    continue;
                }
            };
            let transform = shape.transform();
            for child in &group.children {
                let mut child = child.clone();
                child.position = transform * child.position;
                child.rotation += shape.rotation;
                child.scale_x *= shape.scale_x;
                child.scale_y *= shape.scale_y;
                restored.push(child.id().to_string());
                shapes.push(Arc::new(child));
            }
        }
        if restored.is_empty() {
            return restored;
        }
        log::debug!("Ungrouped into {} shapes", restored.len());
        self.write_shapes_and_select(shapes, restored.clone());
        self.commit();
        restored
    }
}
