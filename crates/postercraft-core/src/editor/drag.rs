//! Drag-move gestures.
//!
//! A drag is bracketed by [`Editor::begin_drag`] and [`Editor::end_drag`].
//! Every pointer move writes live positions to the store; history is
//! committed once, when the gesture ends.

use super::Editor;
use crate::shapes::{ShapeId, SharedShape};
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use std::sync::Arc;

/// State of an in-progress drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Pointer position when the drag started.
    pub start_point: Point,
    /// Latest pointer position.
    pub current_point: Point,
    /// Shape positions at the start of the drag.
    pub origins: HashMap<ShapeId, Point>,
}

impl DragSession {
    pub fn new(start_point: Point, origins: HashMap<ShapeId, Point>) -> Self {
        Self {
            start_point,
            current_point: start_point,
            origins,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.origins.keys().cloned().collect()
    }
}

impl Editor {
    /// Start dragging the unlocked shapes among `ids` from `start`.
    ///
    /// Returns `false` when there is nothing to drag. A drag already in
    /// progress is replaced without committing it.
    pub fn begin_drag(&mut self, ids: &[ShapeId], start: Point) -> bool {
        let targets = self.unlocked_targets(ids);
        if targets.is_empty() {
            return false;
        }
        let origins = self
            .shapes()
            .iter()
            .filter(|s| targets.contains(s.id()))
            .map(|s| (s.id().to_string(), s.position))
            .collect();
        self.drag = Some(DragSession::new(start, origins));
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Move the dragged shapes so they follow the pointer. Not committed.
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some(session) = self.drag.as_mut() else {
            return false;
        };
        session.current_point = point;
        let session = session.clone();
        self.apply_drag(&session)
    }

    fn apply_drag(&mut self, session: &DragSession) -> bool {
        let delta = session.delta();
        let mut changed = false;
        let shapes: Vec<SharedShape> = self
            .shapes()
            .iter()
            .map(|shape| match session.origins.get(shape.id()) {
                Some(origin) if *origin + delta != shape.position => {
                    changed = true;
                    let mut shape = shape.clone();
                    Arc::make_mut(&mut shape).position = *origin + delta;
                    shape
                }
                _ => shape.clone(),
            })
            .collect();
        if changed {
            self.write_shapes(shapes);
        }
        changed
    }

    /// Finish the drag, committing one history entry if anything moved.
    pub fn end_drag(&mut self) -> bool {
        let Some(session) = self.drag.take() else {
            return false;
        };
        let moved = session.delta() != Vec2::ZERO
            && session.origins.keys().any(|id| self.state().shape(id).is_some());
        if moved {
            log::debug!("Drag moved {} shape(s) by {:?}", session.origins.len(), session.delta());
            self.commit();
        }
        moved
    }

    /// Abort the drag and put the shapes back where they started.
    pub fn cancel_drag(&mut self) {
        if let Some(mut session) = self.drag.take() {
            session.current_point = session.start_point;
            self.apply_drag(&session);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::Editor;
    use crate::shapes::{ShapePatch, ShapeType};
    use kurbo::{Point, Vec2};

    #[test]
    fn test_drag_commits_once() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeType::Rect, &ShapePatch::position(0.0, 0.0));
        let len = editor.history().len();

        assert!(editor.begin_drag(&[id.clone()], Point::new(5.0, 5.0)));
        for step in 1..=10 {
            editor.drag_to(Point::new(5.0 + step as f64, 5.0));
        }
        assert!((editor.state().shape(&id).unwrap().position.x - 10.0).abs() < f64::EPSILON);
        assert_eq!(editor.history().len(), len);
        let session = editor.drag_session().unwrap();
        assert_eq!(session.shape_ids(), vec![id.clone()]);
        assert_eq!(session.delta(), Vec2::new(10.0, 0.0));

        assert!(editor.end_drag());
        assert_eq!(editor.history().len(), len + 1);
        assert!(!editor.is_dragging());

        assert!(editor.undo());
        assert!((editor.state().shape(&id).unwrap().position.x - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_without_movement_does_not_commit() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeType::Rect, &ShapePatch::default());
        let len = editor.history().len();
        editor.begin_drag(&[id], Point::ORIGIN);
        assert!(!editor.end_drag());
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_locked_shapes_are_not_dragged() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeType::Rect, &ShapePatch::default());
        editor.lock_toggle(&[id.clone()]);
        assert!(!editor.begin_drag(&[id], Point::ORIGIN));
    }

    #[test]
    fn test_cancel_drag_restores_positions() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeType::Rect, &ShapePatch::position(50.0, 50.0));
        let len = editor.history().len();
        editor.begin_drag(&[id.clone()], Point::ORIGIN);
        editor.drag_to(Point::new(30.0, -10.0));
        editor.cancel_drag();
        let position = editor.state().shape(&id).unwrap().position;
        assert_eq!(position, Point::new(50.0, 50.0));
        assert_eq!(editor.history().len(), len);
    }
}
