//! Z-order, lock/visibility flags, alignment and transformer results.
//!
//! Array order is paint order: the last shape is drawn on top.

use super::Editor;
use crate::shapes::{Shape, ShapeId, SharedShape};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Alignment of shapes against the safe area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Final geometry of a shape at the end of a transformer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTransform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ShapeTransform {
    pub fn of(shape: &Shape) -> Self {
        Self {
            x: shape.position.x,
            y: shape.position.y,
            rotation: shape.rotation,
            scale_x: shape.scale_x,
            scale_y: shape.scale_y,
        }
    }
}

impl Editor {
    fn single_target(&self, ids: &[ShapeId]) -> Option<usize> {
        match ids {
            [id] => self.state().shape_index(id),
            _ => None,
        }
    }

    /// Swap a single shape with the one above it.
    pub fn move_up(&mut self, ids: &[ShapeId]) -> bool {
        let Some(index) = self.single_target(ids) else {
            return false;
        };
        if index + 1 >= self.shapes().len() {
            return false;
        }
        let mut shapes = self.shapes().to_vec();
        shapes.swap(index, index + 1);
        self.write_shapes(shapes);
        self.commit();
        true
    }

    /// Swap a single shape with the one below it.
    pub fn move_down(&mut self, ids: &[ShapeId]) -> bool {
        let Some(index) = self.single_target(ids) else {
            return false;
        };
        if index == 0 {
            return false;
        }
        let mut shapes = self.shapes().to_vec();
        shapes.swap(index, index - 1);
        self.write_shapes(shapes);
        self.commit();
        true
    }

    fn partition(&self, ids: &[ShapeId]) -> (Vec<SharedShape>, Vec<SharedShape>) {
        self.shapes()
            .iter()
            .cloned()
            .partition(|s| !ids.iter().any(|id| id == s.id()))
    }

    /// Move shapes to the top of the paint order, keeping their relative order.
    pub fn move_to_top(&mut self, ids: &[ShapeId]) -> bool {
        let (mut rest, targets) = self.partition(ids);
        if targets.is_empty() {
            return false;
        }
        rest.extend(targets);
        self.reorder(rest)
    }

    /// Move shapes to the bottom of the paint order, keeping their relative order.
    pub fn move_to_bottom(&mut self, ids: &[ShapeId]) -> bool {
        let (rest, mut targets) = self.partition(ids);
        if targets.is_empty() {
            return false;
        }
        targets.extend(rest);
        self.reorder(targets)
    }

    fn reorder(&mut self, shapes: Vec<SharedShape>) -> bool {
        let unchanged = shapes
            .iter()
            .zip(self.shapes())
            .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return false;
        }
        self.write_shapes(shapes);
        self.commit();
        true
    }

    fn map_matching(&mut self, ids: &[ShapeId], mut f: impl FnMut(&mut Shape)) -> bool {
        let mut changed = false;
        let shapes = self
            .shapes()
            .iter()
            .map(|shape| {
                if !ids.iter().any(|id| id == shape.id()) {
                    return shape.clone();
                }
                changed = true;
                let mut shape = shape.clone();
                f(Arc::make_mut(&mut shape));
                shape
            })
            .collect();
        if changed {
            self.write_shapes(shapes);
            self.commit();
        }
        changed
    }

    /// Flip `isLocked` on each matching shape.
    pub fn lock_toggle(&mut self, ids: &[ShapeId]) -> bool {
        let changed = self.map_matching(ids, |s| s.is_locked = !s.is_locked);
        if changed {
            // locked shapes cannot stay selected
            let selected = self
                .selected_ids()
                .iter()
                .filter(|id| self.state().shape(id).is_some_and(|s| !s.is_locked))
                .cloned()
                .collect();
            self.store.set_state(crate::store::DocumentPatch::selection(selected));
        }
        changed
    }

    /// Flip `visible` on each matching shape.
    pub fn eye_toggle(&mut self, ids: &[ShapeId]) -> bool {
        self.map_matching(ids, |s| s.visible = !s.visible)
    }

    /// Align each shape's bounding box to an edge or center of the safe area.
    pub fn align_shapes(&mut self, ids: &[ShapeId], alignment: Alignment) -> bool {
        let targets = self.unlocked_targets(ids);
        let area = self.state().safe_area.rect();
        let mut changed = false;
        let shapes = self
            .shapes()
            .iter()
            .map(|shape| {
                if !targets.contains(shape.id()) {
                    return shape.clone();
                }
                let bounds = shape.bounds();
                let delta = match alignment {
                    Alignment::Left => Vec2::new(area.x0 - bounds.x0, 0.0),
                    Alignment::Center => Vec2::new(area.center().x - bounds.center().x, 0.0),
                    Alignment::Right => Vec2::new(area.x1 - bounds.x1, 0.0),
                    Alignment::Top => Vec2::new(0.0, area.y0 - bounds.y0),
                    Alignment::Middle => Vec2::new(0.0, area.center().y - bounds.center().y),
                    Alignment::Bottom => Vec2::new(0.0, area.y1 - bounds.y1),
                };
                if delta.hypot2() < 1e-18 {
                    return shape.clone();
                }
                changed = true;
                let mut shape = Shape::clone(shape);
                shape.translate(delta);
                Arc::new(shape)
            })
            .collect();
        if changed {
            self.write_shapes(shapes);
            self.commit();
        }
        changed
    }

    /// Apply the result of a transformer gesture as a single history entry.
    pub fn transform_shapes(&mut self, transforms: &[(ShapeId, ShapeTransform)]) -> bool {
        let ids: Vec<ShapeId> = transforms.iter().map(|(id, _)| id.clone()).collect();
        let targets = self.unlocked_targets(&ids);
        let mut changed = false;
        let shapes = self
            .shapes()
            .iter()
            .map(|shape| {
                let transform = transforms
                    .iter()
                    .find(|(id, _)| targets.contains(id) && id == shape.id());
                match transform {
                    Some((_, t)) if *t != ShapeTransform::of(shape) => {
                        changed = true;
                        let mut shape = Shape::clone(shape);
                        shape.position = kurbo::Point::new(t.x, t.y);
                        shape.rotation = t.rotation;
                        shape.scale_x = t.scale_x;
                        shape.scale_y = t.scale_y;
                        Arc::new(shape)
                    }
                    _ => shape.clone(),
                }
            })
            .collect();
        if changed {
            self.write_shapes(shapes);
            self.commit();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::{Alignment, Editor, ShapeTransform};
    use crate::shapes::{ShapeId, ShapePatch, ShapeType};

    fn editor_with(n: usize) -> (Editor, Vec<ShapeId>) {
        let mut editor = Editor::default();
        let ids = (0..n)
            .map(|i| editor.add_shape(ShapeType::Rect, &ShapePatch::position(i as f64 * 10.0, 0.0)))
            .collect();
        (editor, ids)
    }

    fn order(editor: &Editor) -> Vec<String> {
        editor.shapes().iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn test_move_up_and_down() {
        let (mut editor, ids) = editor_with(3);
        assert!(editor.move_up(&[ids[0].clone()]));
        assert_eq!(order(&editor), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);
        assert!(!editor.move_up(&[ids[2].clone()]));
        assert!(editor.move_down(&[ids[2].clone()]));
        assert_eq!(order(&editor), vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
        assert!(!editor.move_down(&[ids[1].clone()]));
    }

    #[test]
    fn test_single_shape_ops_reject_multi_selection() {
        let (mut editor, ids) = editor_with(3);
        let len = editor.history().len();
        assert!(!editor.move_up(&ids[..2]));
        assert!(!editor.move_down(&ids[1..]));
        assert!(!editor.move_up(&[]));
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_move_to_top_and_bottom() {
        let (mut editor, ids) = editor_with(4);
        assert!(editor.move_to_top(&[ids[0].clone(), ids[2].clone()]));
        assert_eq!(
            order(&editor),
            vec![ids[1].clone(), ids[3].clone(), ids[0].clone(), ids[2].clone()]
        );
        assert!(editor.move_to_bottom(&[ids[2].clone()]));
        assert_eq!(order(&editor)[0], ids[2]);
        assert!(!editor.move_to_bottom(&[ids[2].clone()]));
        assert!(!editor.move_to_top(&["missing".into()]));
    }

    #[test]
    fn test_lock_toggle_drops_selection() {
        let (mut editor, ids) = editor_with(2);
        editor.select(&ids);
        assert!(editor.lock_toggle(&[ids[0].clone()]));
        assert!(editor.state().shape(&ids[0]).unwrap().is_locked);
        assert_eq!(editor.selected_ids(), &[ids[1].clone()]);
        assert!(editor.lock_toggle(&[ids[0].clone()]));
        assert!(!editor.state().shape(&ids[0]).unwrap().is_locked);
    }

    #[test]
    fn test_eye_toggle() {
        let (mut editor, ids) = editor_with(1);
        assert!(editor.eye_toggle(&ids));
        assert!(!editor.state().shape(&ids[0]).unwrap().visible);
        assert!(editor.undo());
        assert!(editor.state().shape(&ids[0]).unwrap().visible);
    }

    #[test]
    fn test_align_right_and_middle() {
        let (mut editor, ids) = editor_with(1);
        assert!(editor.align_shapes(&ids, Alignment::Right));
        let bounds = editor.state().shape(&ids[0]).unwrap().bounds();
        assert!((bounds.x1 - 1080.0).abs() < 1e-9);
        assert!(editor.align_shapes(&ids, Alignment::Middle));
        let bounds = editor.state().shape(&ids[0]).unwrap().bounds();
        assert!((bounds.center().y - 540.0).abs() < 1e-9);
        assert!(!editor.align_shapes(&ids, Alignment::Middle));
    }

    #[test]
    fn test_transform_commits_once() {
        let (mut editor, ids) = editor_with(2);
        let len = editor.history().len();
        let transforms: Vec<_> = ids
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    ShapeTransform {
                        x: 5.0,
                        y: 6.0,
                        rotation: 30.0,
                        scale_x: 2.0,
                        scale_y: 1.0,
                    },
                )
            })
            .collect();
        assert!(editor.transform_shapes(&transforms));
        assert_eq!(editor.history().len(), len + 1);
        let shape = editor.state().shape(&ids[1]).unwrap();
        assert!((shape.rotation - 30.0).abs() < f64::EPSILON);
        assert!((shape.scale_x - 2.0).abs() < f64::EPSILON);
        assert!(!editor.transform_shapes(&transforms));
    }
}
