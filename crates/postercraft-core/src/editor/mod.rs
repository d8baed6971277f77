//! Mutation handlers: every user intent that changes the document.
//!
//! Handlers read the store, compute a new shape list, write it back and
//! commit a history snapshot. Bad input (unknown ids, empty sets, locked
//! targets) is a silent no-op reported through the `bool`/`Vec` return value.

mod arrange;
mod clipboard;
mod drag;
mod grouping;
mod keyframes;
mod media;

pub use arrange::{Alignment, ShapeTransform};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
#[cfg(all(feature = "os-clipboard", not(target_arch = "wasm32")))]
pub use clipboard::SystemClipboard;

use crate::config::EditorConfig;
use crate::history::{History, HistorySnapshot};
use crate::shapes::{Shape, ShapeId, ShapePatch, ShapeType, SharedShape};
use crate::storage::ProjectData;
use crate::store::{DocumentPatch, DocumentState, DocumentStore, SafeArea};
use crate::viewport::Viewport;
use drag::DragSession;
use kurbo::{Size, Vec2};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The editing engine: store, history and the handlers operating on them.
pub struct Editor {
    store: DocumentStore,
    history: History,
    clipboard: Box<dyn Clipboard>,
    drag: Option<DragSession>,
    pending_deletes: Vec<Vec<ShapeId>>,
    /// Live shapes saved while a keyframe is being edited, by project id.
    keyframe_backups: HashMap<String, Vec<SharedShape>>,
}

impl Editor {
    pub fn new(store: DocumentStore) -> Self {
        let snapshot = Self::snapshot_of(store.state());
        let mut history = History::new(snapshot.clone(), store.config().history_limit);
        history.commit(snapshot);
        Self {
            store,
            history,
            clipboard: Box::new(MemoryClipboard::default()),
            drag: None,
            pending_deletes: Vec::new(),
            keyframe_backups: HashMap::new(),
        }
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::new(DocumentStore::new(config))
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Mutable access to the store, for subscriptions.
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn state(&self) -> &DocumentState {
        self.store.state()
    }

    pub fn shapes(&self) -> &[SharedShape] {
        &self.store.state().shapes
    }

    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.store.state().selected_ids
    }

    pub fn config(&self) -> &EditorConfig {
        self.store.config()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot_of(state: &DocumentState) -> HistorySnapshot {
        HistorySnapshot {
            shapes: state.shapes.clone(),
            stage: state.viewport.stage,
            safe_area: state.safe_area.clone(),
        }
    }

    /// Capture the current document into history.
    pub fn commit(&mut self) {
        let snapshot = Self::snapshot_of(self.store.state());
        self.history.commit(snapshot);
    }

    /// Drop all history. The current document becomes the first entry,
    /// which is also the undo floor.
    pub(crate) fn reset_history(&mut self) {
        let snapshot = Self::snapshot_of(self.store.state());
        self.history.reset(snapshot.clone());
        self.history.commit(snapshot);
    }

    fn write_shapes(&mut self, shapes: Vec<SharedShape>) {
        self.store.set_state(DocumentPatch::shapes(shapes));
    }

    fn write_shapes_and_select(&mut self, shapes: Vec<SharedShape>, selected: Vec<ShapeId>) {
        self.store
            .set_state(DocumentPatch::shapes(shapes).with_selection(selected));
    }

    /// Existing, unlocked shapes among `ids`.
    fn unlocked_targets(&self, ids: &[ShapeId]) -> HashSet<ShapeId> {
        self.shapes()
            .iter()
            .filter(|s| !s.is_locked && ids.iter().any(|id| id == s.id()))
            .map(|s| s.id().to_string())
            .collect()
    }

    // ---- selection (never undoable) ----

    /// Replace the selection. Unknown and locked ids are ignored.
    pub fn select(&mut self, ids: &[ShapeId]) {
        let targets = self.unlocked_targets(ids);
        let mut seen = HashSet::new();
        let selected = ids
            .iter()
            .filter(|id| targets.contains(*id) && seen.insert(id.as_str()))
            .cloned()
            .collect();
        self.store.set_state(DocumentPatch::selection(selected));
    }

    pub fn unselect(&mut self, ids: &[ShapeId]) {
        let selected = self
            .selected_ids()
            .iter()
            .filter(|id| !ids.contains(id))
            .cloned()
            .collect();
        self.store.set_state(DocumentPatch::selection(selected));
    }

    pub fn clear_selection(&mut self) {
        self.store.set_state(DocumentPatch::selection(Vec::new()));
    }

    pub fn select_all(&mut self) {
        let ids = crate::selection::selectable_ids(self.shapes());
        self.store.set_state(DocumentPatch::selection(ids));
    }

    // ---- shape lifecycle ----

    /// Create a shape of `shape_type` with `overrides` applied, append it and
    /// select it. Without an explicit position it is centered in the safe area.
    pub fn add_shape(&mut self, shape_type: ShapeType, overrides: &ShapePatch) -> ShapeId {
        let mut shape = Shape::new(shape_type);
        if overrides.x.is_none() && overrides.y.is_none() {
            let center = self.state().safe_area.rect().center();
            shape.translate(center - shape.bounds().center());
        }
        shape.apply_patch(overrides);
        self.insert_shape(shape)
    }

    /// Append a prebuilt shape, select it and commit. A colliding id is replaced.
    pub fn insert_shape(&mut self, mut shape: Shape) -> ShapeId {
        if self.state().shape(shape.id()).is_some() {
            shape.regenerate_ids();
        }
        let id = shape.id().to_string();
        let mut shapes = self.shapes().to_vec();
        shapes.push(Arc::new(shape));
        self.write_shapes_and_select(shapes, vec![id.clone()]);
        self.commit();
        log::debug!("Added shape {}", id);
        id
    }

    /// Apply `patch` to the shapes named by `ids`.
    ///
    /// The explicit ids are the target. When they differ from the current
    /// selection a warning is logged, but the update still goes to `ids`.
    pub fn update_shapes(&mut self, ids: &[ShapeId], patch: &ShapePatch) -> bool {
        let selection: HashSet<&ShapeId> = self.selected_ids().iter().collect();
        let requested: HashSet<&ShapeId> = ids.iter().collect();
        if selection != requested {
            log::warn!(
                "Update targets {:?} differ from the selection {:?}",
                ids,
                self.selected_ids()
            );
        }

        let targets = self.unlocked_targets(ids);
        if targets.is_empty() || patch.is_empty() {
            return false;
        }
        let mut changed = false;
        let shapes = self
            .shapes()
            .iter()
            .map(|shape| {
                if !targets.contains(shape.id()) {
                    return shape.clone();
                }
                let mut updated = Shape::clone(shape);
                updated.apply_patch(patch);
                if updated == **shape {
                    shape.clone()
                } else {
                    changed = true;
                    Arc::new(updated)
                }
            })
            .collect();
        if changed {
            self.write_shapes(shapes);
            self.commit();
        }
        changed
    }

    pub fn update_shape(&mut self, id: &str, patch: &ShapePatch) -> bool {
        self.update_shapes(&[id.to_string()], patch)
    }

    /// Delete shapes. The selection is cleared now; the shapes are removed and
    /// committed on the next [`tick`](Self::tick).
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> bool {
        let targets = self.unlocked_targets(ids);
        self.clear_selection();
        if targets.is_empty() {
            return false;
        }
        self.pending_deletes.push(targets.into_iter().collect());
        true
    }

    /// Run deferred work (pending deletions). Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending_deletes);
        let mut changed = false;
        for ids in pending {
            changed |= self.remove_shapes_now(&ids);
        }
        changed
    }

    /// Remove shapes immediately and commit.
    pub(crate) fn remove_shapes_now(&mut self, ids: &[ShapeId]) -> bool {
        let before = self.shapes().len();
        let shapes: Vec<SharedShape> = self
            .shapes()
            .iter()
            .filter(|s| !ids.iter().any(|id| id == s.id()))
            .cloned()
            .collect();
        if shapes.len() == before {
            return false;
        }
        log::debug!("Removing {} shape(s)", before - shapes.len());
        self.write_shapes(shapes);
        self.commit();
        true
    }

    /// Clone shapes with fresh ids, offset by the paste offset, and select the copies.
    pub fn duplicate_shapes(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let offset = self.config().paste_offset;
        let copies: Vec<Shape> = self
            .shapes()
            .iter()
            .filter(|s| ids.iter().any(|id| id == s.id()))
            .map(|s| Shape::clone(s))
            .collect();
        self.append_copies(copies, Vec2::new(offset, offset))
    }

    /// Give `copies` fresh ids, move them by `offset`, append, select, commit.
    fn append_copies(&mut self, copies: Vec<Shape>, offset: Vec2) -> Vec<ShapeId> {
        if copies.is_empty() {
            return Vec::new();
        }
        let mut shapes = self.shapes().to_vec();
        let mut new_ids = Vec::with_capacity(copies.len());
        for mut copy in copies {
            copy.regenerate_ids();
            copy.translate(offset);
            copy.is_locked = false;
            new_ids.push(copy.id().to_string());
            shapes.push(Arc::new(copy));
        }
        self.write_shapes_and_select(shapes, new_ids.clone());
        self.commit();
        new_ids
    }

    // ---- history ----

    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.drag = None;
        let mut viewport = self.state().viewport;
        viewport.stage = snapshot.stage;
        self.store.set_state(DocumentPatch {
            shapes: Some(snapshot.shapes),
            selected_ids: Some(Vec::new()),
            safe_area: Some(snapshot.safe_area),
            viewport: Some(viewport),
            ..DocumentPatch::default()
        });
    }

    /// Step back one edit. Always clears the selection.
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward one edit. Always clears the selection.
    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- canvas ----

    /// Resize the safe area. Undoable.
    pub fn set_safe_area(&mut self, size: Size) -> bool {
        if size.width <= 0.0 || size.height <= 0.0 {
            return false;
        }
        let safe_area = SafeArea {
            width: size.width,
            height: size.height,
            ..self.state().safe_area.clone()
        };
        let changed = self
            .store
            .set_state(DocumentPatch::default().with_safe_area(safe_area));
        if changed.is_empty() {
            return false;
        }
        self.commit();
        true
    }

    /// Replace the viewport. Not undoable, but captured by later snapshots.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.store.set_state(DocumentPatch::default().with_viewport(viewport));
    }

    /// Fit the viewport around the safe area.
    pub fn fit_to_safe_area(&mut self, padding: f64) {
        let mut viewport = self.state().viewport;
        viewport.fit_to(self.state().safe_area.rect(), padding);
        self.set_viewport(viewport);
    }

    // ---- project lifecycle ----

    /// Tear everything down for a project switch, keyframe edit mode included.
    pub fn reset(&mut self) {
        self.drag = None;
        self.pending_deletes.clear();
        self.keyframe_backups.clear();
        self.store.reset();
        self.reset_history();
    }

    /// Load a saved project into a fresh document.
    pub fn load_project(&mut self, project_id: &str, data: ProjectData) {
        self.reset();
        let track = (!data.animations.is_empty()).then(|| data.animations.into());
        self.store.set_state(DocumentPatch {
            project_id: Some(project_id.to_string()),
            shapes: Some(data.shapes.into_iter().map(Arc::new).collect()),
            safe_area: Some(data.safe_area),
            animations: Some(track),
            ..DocumentPatch::default()
        });
        self.reset_history();
        log::info!("Loaded project {}", project_id);
    }

    /// The persisted form of the current document.
    ///
    /// While a keyframe is being edited the backed-up live shapes are saved,
    /// not the keyframe being edited.
    pub fn project_data(&self) -> ProjectData {
        let state = self.state();
        let shapes = match self.keyframe_backups.get(&state.project_id) {
            Some(backup) if state.editing_keyframe.is_some() => backup,
            _ => &state.shapes,
        };
        ProjectData::new(
            shapes.iter().map(|s| Shape::clone(s)).collect(),
            state.safe_area.clone(),
            state
                .animations
                .as_ref()
                .map(|t| t.resolved_items())
                .unwrap_or_default(),
        )
        .with_project_id(state.project_id.clone())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(DocumentStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_rects(n: usize) -> (Editor, Vec<ShapeId>) {
        let mut editor = Editor::default();
        let ids = (0..n)
            .map(|i| {
                editor.add_shape(ShapeType::Rect, &ShapePatch::position(i as f64 * 200.0, 0.0))
            })
            .collect();
        (editor, ids)
    }

    #[test]
    fn test_add_shape_commits_and_selects() {
        let (editor, ids) = editor_with_rects(1);
        assert_eq!(editor.shapes().len(), 1);
        assert_eq!(editor.selected_ids(), ids.as_slice());
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_add_shape_centers_in_safe_area() {
        let mut editor = Editor::default();
        let id = editor.add_shape(ShapeType::Rect, &ShapePatch::default());
        let shape = editor.state().shape(&id).unwrap();
        assert!((shape.position.x - 490.0).abs() < 1e-9);
        assert!((shape.position.y - 490.0).abs() < 1e-9);
    }

    #[test]
    fn test_undo_add_restores_empty_document() {
        let mut editor = Editor::default();
        editor.add_shape(ShapeType::Rect, &ShapePatch::default());
        editor.add_shape(ShapeType::Circle, &ShapePatch::default());
        assert!(editor.undo());
        assert_eq!(editor.shapes().len(), 1);
        assert!(editor.selected_ids().is_empty());
        assert!(editor.undo());
        assert!(editor.shapes().is_empty());
        // the loaded document is the floor
        assert!(!editor.undo());
        assert!(editor.redo());
        assert!(editor.redo());
        assert_eq!(editor.shapes().len(), 2);
    }

    #[test]
    fn test_select_ignores_locked_and_unknown() {
        let (mut editor, ids) = editor_with_rects(2);
        editor.update_shape(&ids[1], &ShapePatch {
            is_locked: Some(true),
            ..ShapePatch::default()
        });
        editor.select(&[ids[0].clone(), ids[1].clone(), "nope".into(), ids[0].clone()]);
        assert_eq!(editor.selected_ids(), &[ids[0].clone()]);
    }

    #[test]
    fn test_select_all_and_unselect() {
        let (mut editor, ids) = editor_with_rects(3);
        editor.lock_toggle(&[ids[2].clone()]);
        editor.select_all();
        assert_eq!(editor.selected_ids(), &ids[..2]);
        editor.unselect(&[ids[0].clone()]);
        assert_eq!(editor.selected_ids(), &[ids[1].clone()]);
        editor.clear_selection();
        assert!(editor.selected_ids().is_empty());
    }

    #[test]
    fn test_fit_to_safe_area_centers_without_commit() {
        let (mut editor, _) = editor_with_rects(1);
        let len = editor.history().len();
        editor.fit_to_safe_area(40.0);
        let viewport = editor.state().viewport;
        assert!(viewport.stage.scale_x < 1.0);
        let center = viewport.world_to_screen(editor.state().safe_area.rect().center());
        assert!((center.x - viewport.width / 2.0).abs() < 1e-9);
        assert!((center.y - viewport.height / 2.0).abs() < 1e-9);
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_update_targets_explicit_ids() {
        let (mut editor, ids) = editor_with_rects(2);
        editor.select(&[ids[0].clone()]);
        let changed = editor.update_shapes(&[ids[1].clone()], &ShapePatch {
            opacity: Some(0.5),
            ..ShapePatch::default()
        });
        assert!(changed);
        assert!((editor.state().shape(&ids[1]).unwrap().style.opacity - 0.5).abs() < f64::EPSILON);
        assert!((editor.state().shape(&ids[0]).unwrap().style.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_without_change_does_not_commit() {
        let (mut editor, ids) = editor_with_rects(1);
        let len = editor.history().len();
        assert!(!editor.update_shape(&ids[0], &ShapePatch::position(0.0, 0.0)));
        assert!(!editor.update_shape("missing", &ShapePatch::position(1.0, 0.0)));
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_unchanged_shapes_are_shared_with_history() {
        let (mut editor, ids) = editor_with_rects(2);
        let before = editor.shapes()[0].clone();
        editor.update_shape(&ids[1], &ShapePatch::position(5.0, 5.0));
        assert!(Arc::ptr_eq(&before, &editor.shapes()[0]));
    }

    #[test]
    fn test_delete_is_deferred_until_tick() {
        let (mut editor, ids) = editor_with_rects(2);
        editor.select(&ids);
        assert!(editor.delete_shapes(&[ids[0].clone()]));
        assert!(editor.selected_ids().is_empty());
        assert_eq!(editor.shapes().len(), 2);
        assert!(editor.tick());
        assert_eq!(editor.shapes().len(), 1);
        assert!(!editor.tick());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut editor, _) = editor_with_rects(1);
        assert!(!editor.delete_shapes(&["missing".into()]));
        assert!(!editor.tick());
    }

    #[test]
    fn test_duplicate_offsets_and_selects() {
        let (mut editor, ids) = editor_with_rects(1);
        let copies = editor.duplicate_shapes(&ids);
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], ids[0]);
        let original = editor.state().shape(&ids[0]).unwrap().position;
        let copy = editor.state().shape(&copies[0]).unwrap().position;
        assert!((copy.x - original.x - 20.0).abs() < f64::EPSILON);
        assert!((copy.y - original.y - 20.0).abs() < f64::EPSILON);
        assert_eq!(editor.selected_ids(), copies.as_slice());
    }

    #[test]
    fn test_safe_area_is_undoable() {
        let (mut editor, _) = editor_with_rects(1);
        assert!(editor.set_safe_area(Size::new(1920.0, 1080.0)));
        assert!(!editor.set_safe_area(Size::new(0.0, 10.0)));
        assert!(editor.undo());
        assert!((editor.state().safe_area.width - 1080.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_undo_restores_captured_stage() {
        let (mut editor, _) = editor_with_rects(1);
        let mut viewport = editor.state().viewport;
        viewport.stage.x = 300.0;
        editor.set_viewport(viewport);
        editor.add_shape(ShapeType::Star, &ShapePatch::default());
        viewport.stage.x = -50.0;
        editor.set_viewport(viewport);
        editor.undo();
        assert!((editor.state().viewport.stage.x - 0.0).abs() < f64::EPSILON);
        editor.redo();
        assert!((editor.state().viewport.stage.x - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut editor, ids) = editor_with_rects(2);
        editor.delete_shapes(&ids);
        editor.reset();
        assert!(editor.shapes().is_empty());
        assert!(!editor.tick());
        assert_eq!(editor.history().len(), 2);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_project_roundtrip() {
        let (editor, _) = editor_with_rects(2);
        let data = editor.project_data();
        let mut other = Editor::default();
        other.load_project("p1", data);
        assert_eq!(other.state().project_id, "p1");
        assert_eq!(other.shapes(), editor.shapes());
        assert!(!other.can_undo());
    }
}
