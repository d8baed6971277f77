//! Document store: the single source of truth for editor state.
//!
//! Writes replace whole slices (no deep merge) and are published to
//! subscribers synchronously, before [`DocumentStore::set_state`] returns.

use crate::animation::KeyframeTrack;
use crate::config::EditorConfig;
use crate::shapes::{ShapeId, SharedShape, fonts_in_use};
use crate::viewport::Viewport;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

/// The canvas's visible and exported region. Never selectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeArea {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SafeArea {
    pub const ID: &'static str = "safe-area";

    pub fn new(size: Size) -> Self {
        Self {
            id: Self::ID.to_string(),
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Full editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    pub project_id: String,
    /// Shapes in paint order (last is on top).
    pub shapes: Vec<SharedShape>,
    /// Selected top-level shape ids; order is irrelevant.
    pub selected_ids: Vec<ShapeId>,
    pub safe_area: SafeArea,
    pub viewport: Viewport,
    pub animations: Option<KeyframeTrack>,
    /// Keyframe whose shapes are loaded into `shapes` for editing.
    pub editing_keyframe: Option<usize>,
}

impl DocumentState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            project_id: Uuid::new_v4().to_string(),
            shapes: Vec::new(),
            selected_ids: Vec::new(),
            safe_area: SafeArea::new(config.default_safe_area),
            viewport: Viewport::default(),
            animations: None,
            editing_keyframe: None,
        }
    }

    pub fn shape(&self, id: &str) -> Option<&SharedShape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn shape_index(&self, id: &str) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }
}

/// A partial state write. Every `Some` field replaces the slice wholesale.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub project_id: Option<String>,
    pub shapes: Option<Vec<SharedShape>>,
    pub selected_ids: Option<Vec<ShapeId>>,
    pub safe_area: Option<SafeArea>,
    pub viewport: Option<Viewport>,
    pub animations: Option<Option<KeyframeTrack>>,
    pub editing_keyframe: Option<Option<usize>>,
}

impl DocumentPatch {
    pub fn shapes(shapes: Vec<SharedShape>) -> Self {
        Self {
            shapes: Some(shapes),
            ..Self::default()
        }
    }

    pub fn selection(ids: Vec<ShapeId>) -> Self {
        Self {
            selected_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn with_selection(mut self, ids: Vec<ShapeId>) -> Self {
        self.selected_ids = Some(ids);
        self
    }

    pub fn with_safe_area(mut self, safe_area: SafeArea) -> Self {
        self.safe_area = Some(safe_area);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
}

/// A state slice subscribers can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Project,
    Shapes,
    Selection,
    SafeArea,
    Viewport,
    Animations,
    EditingMode,
}

impl Slice {
    pub const ALL: [Slice; 7] = [
        Slice::Project,
        Slice::Shapes,
        Slice::Selection,
        Slice::SafeArea,
        Slice::Viewport,
        Slice::Animations,
        Slice::EditingMode,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Derived state, recomputed when shapes or selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub selected_shapes: Vec<SharedShape>,
    pub fonts: BTreeSet<String>,
}

/// What a subscriber sees after a write.
pub struct StoreEvent<'a> {
    /// Slices that changed in this write.
    pub changed: &'a [Slice],
    pub state: &'a DocumentState,
    pub derived: &'a Derived,
}

/// Handle returned by [`DocumentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent<'_>)>;

struct Subscriber {
    id: SubscriptionId,
    slices: Vec<Slice>,
    callback: Callback,
}

/// Observable state container with per-slice versions.
pub struct DocumentStore {
    config: EditorConfig,
    state: DocumentState,
    derived: Derived,
    versions: [u64; Slice::ALL.len()],
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl DocumentStore {
    pub fn new(config: EditorConfig) -> Self {
        let state = DocumentState::new(&config);
        Self {
            config,
            state,
            derived: Derived::default(),
            versions: [0; Slice::ALL.len()],
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    pub fn selected_shapes(&self) -> &[SharedShape] {
        &self.derived.selected_shapes
    }

    pub fn fonts_in_use(&self) -> &BTreeSet<String> {
        &self.derived.fonts
    }

    /// Version counter of a slice; bumped on every write that changes it.
    pub fn version(&self, slice: Slice) -> u64 {
        self.versions[slice.index()]
    }

    /// Watch `slices`; `callback` runs after every write touching one of them.
    pub fn subscribe(
        &mut self,
        slices: &[Slice],
        callback: impl FnMut(&StoreEvent<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            slices: slices.to_vec(),
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Merge `patch` into the state and publish the change.
    ///
    /// When the shape list changes, selected ids that no longer refer to a
    /// shape are pruned. Returns the slices that actually changed.
    pub fn set_state(&mut self, patch: DocumentPatch) -> Vec<Slice> {
        let mut changed = Vec::new();
        let state = &mut self.state;

        macro_rules! replace {
            ($field:ident, $slice:expr) => {
                if let Some(value) = patch.$field {
                    if state.$field != value {
                        state.$field = value;
                        changed.push($slice);
                    }
                }
            };
        }
        replace!(project_id, Slice::Project);
        replace!(shapes, Slice::Shapes);
        replace!(selected_ids, Slice::Selection);
        replace!(safe_area, Slice::SafeArea);
        replace!(viewport, Slice::Viewport);
        replace!(animations, Slice::Animations);
        replace!(editing_keyframe, Slice::EditingMode);

        if changed.contains(&Slice::Shapes) {
            let live: HashSet<&str> = state.shapes.iter().map(|s| s.id()).collect();
            let before = state.selected_ids.len();
            state.selected_ids.retain(|id| live.contains(id.as_str()));
            if state.selected_ids.len() != before && !changed.contains(&Slice::Selection) {
                changed.push(Slice::Selection);
            }
        }

        self.publish(&changed);
        changed
    }

    /// Restore the initial state. The only teardown path.
    pub fn reset(&mut self) {
        self.state = DocumentState::new(&self.config);
        log::debug!("Document store reset (project {})", self.state.project_id);
        self.publish(&Slice::ALL);
    }

    fn publish(&mut self, changed: &[Slice]) {
        if changed.is_empty() {
            return;
        }
        for slice in changed {
            self.versions[slice.index()] += 1;
        }
        if changed.contains(&Slice::Shapes) || changed.contains(&Slice::Selection) {
            self.derived.selected_shapes = self
                .state
                .shapes
                .iter()
                .filter(|s| self.state.is_selected(s.id()))
                .cloned()
                .collect();
        }
        if changed.contains(&Slice::Shapes) {
            self.derived.fonts = fonts_in_use(&self.state.shapes);
        }

        let event = StoreEvent {
            changed,
            state: &self.state,
            derived: &self.derived,
        };
        for subscriber in &mut self.subscribers {
            if subscriber.slices.iter().any(|s| changed.contains(s)) {
                (subscriber.callback)(&event);
            }
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind, ShapeType};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn shape(id: &str) -> SharedShape {
        let mut s = Shape::new(ShapeType::Rect);
        s.id = id.to_string();
        Arc::new(s)
    }

    #[test]
    fn test_set_state_replaces_slices() {
        let mut store = DocumentStore::default();
        let changed = store.set_state(DocumentPatch::shapes(vec![shape("a"), shape("b")]));
        assert_eq!(changed, vec![Slice::Shapes]);
        assert_eq!(store.state().shapes.len(), 2);
        assert_eq!(store.version(Slice::Shapes), 1);
        assert_eq!(store.version(Slice::Selection), 0);
    }

    #[test]
    fn test_unchanged_write_publishes_nothing() {
        let mut store = DocumentStore::default();
        store.set_state(DocumentPatch::selection(vec![]));
        assert_eq!(store.version(Slice::Selection), 0);
    }

    #[test]
    fn test_stale_selection_is_pruned() {
        let mut store = DocumentStore::default();
        store.set_state(
            DocumentPatch::shapes(vec![shape("a"), shape("b")])
                .with_selection(vec!["a".into(), "b".into()]),
        );
        let changed = store.set_state(DocumentPatch::shapes(vec![shape("b")]));
        assert_eq!(store.state().selected_ids, vec!["b".to_string()]);
        assert!(changed.contains(&Slice::Selection));
        assert_eq!(store.selected_shapes().len(), 1);
    }

    #[test]
    fn test_subscribers_run_synchronously() {
        let mut store = DocumentStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(&[Slice::Selection], move |event| {
            sink.borrow_mut().push(event.derived.selected_shapes.len());
        });
        store.set_state(DocumentPatch::shapes(vec![shape("a")]));
        assert!(seen.borrow().is_empty());
        store.set_state(DocumentPatch::selection(vec!["a".into()]));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = DocumentStore::default();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = store.subscribe(&Slice::ALL, move |_| *sink.borrow_mut() += 1);
        store.set_state(DocumentPatch::shapes(vec![shape("a")]));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_state(DocumentPatch::shapes(vec![]));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_fonts_follow_shapes() {
        let mut store = DocumentStore::default();
        let mut text = Shape::new(ShapeType::Text);
        if let ShapeKind::Text(t) = &mut text.kind {
            t.font_family = "Oswald".into();
        }
        store.set_state(DocumentPatch::shapes(vec![Arc::new(text)]));
        assert!(store.fonts_in_use().contains("Oswald"));
        store.set_state(DocumentPatch::shapes(vec![]));
        assert!(store.fonts_in_use().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut store = DocumentStore::default();
        let project = store.state().project_id.clone();
        store.set_state(DocumentPatch::shapes(vec![shape("a")]).with_selection(vec!["a".into()]));
        store.reset();
        assert!(store.state().shapes.is_empty());
        assert!(store.state().selected_ids.is_empty());
        assert_ne!(store.state().project_id, project);
        assert!(store.selected_shapes().is_empty());
    }
}
