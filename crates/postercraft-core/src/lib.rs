//! PosterCraft Core
//!
//! Editing state engine for the PosterCraft design editor: the shape model,
//! the document store, undo/redo history, selection and mutation handlers,
//! and the keyframe animation timeline with frame export. Rendering, image
//! fetching and video encoding stay outside and are reached through traits.

pub mod animation;
pub mod config;
pub mod editor;
pub mod history;
pub mod images;
pub mod render;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod store;
pub mod viewport;

pub use animation::{
    AnimationError, AnimationItem, AnimationRecord, Ease, KeyframeTrack, Timeline, TimelinePlan,
    TweenEngine,
};
pub use config::EditorConfig;
pub use editor::{Alignment, Clipboard, Editor, MemoryClipboard, ShapeTransform};
pub use history::{History, HistorySnapshot};
pub use images::{ImageError, ImageLoader, LoadedImage};
pub use render::{Bitmap, RenderError, Renderer};
pub use shapes::{Shape, ShapeId, ShapeKind, ShapePatch, ShapeType, SharedShape};
pub use storage::{ProjectData, Storage, StorageError};
pub use store::{DocumentPatch, DocumentState, DocumentStore, SafeArea, Slice, StoreEvent};
pub use viewport::Viewport;
