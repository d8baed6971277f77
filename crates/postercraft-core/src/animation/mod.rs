//! Keyframe animation: keyframe storage, timeline planning, playback and export.
//!
//! Keyframes are stored sparsely. Each [`Keyframe`] only holds the shapes that
//! changed relative to the keyframe before it, and [`KeyframeTrack::resolved_items`]
//! rebuilds the full per-keyframe shape lists on demand. A [`TimelinePlan`]
//! turns the track into tween descriptors for any [`TweenEngine`]; [`Timeline`]
//! is the deterministic engine used for preview and export.

mod ease;
mod export;
mod keyframes;
mod player;
mod timeline;

pub use ease::Ease;
pub use export::{
    Encoder, EncodeError, ExportError, ExportFormat, ExportOptions, export_animation, export_png,
    wait_until_ready,
};
pub use keyframes::{AnimationItem, Keyframe, KeyframeTrack};
pub use player::Timeline;
pub use timeline::{ScheduledTween, TimelineLabel, TimelinePlan, TweenDescriptor, TweenEngine};

use crate::shapes::{ShapeId, ShapePatch};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Animation errors.
///
/// These signal broken sequencing (completing an edit that never started,
/// a lost backup) or a renderer that never produced the nodes the timeline
/// needs. They are not recoverable input errors.
#[derive(Debug, Error, PartialEq)]
pub enum AnimationError {
    #[error("No keyframe is being edited")]
    NoActiveKeyframe,
    #[error("Keyframe {0} is already being edited")]
    AlreadyEditing(usize),
    #[error("Keyframe index {index} out of range ({len} keyframes)")]
    KeyframeOutOfRange { index: usize, len: usize },
    #[error("No backup of the live shapes for project {0}")]
    MissingBackup(String),
    #[error("Renderer has no node for shape {0}")]
    NotReady(ShapeId),
}

/// Result type for animation operations.
pub type AnimationResult<T> = Result<T, AnimationError>;

/// Per-shape tween overrides stored on a shape inside a keyframe.
///
/// `properties` are animated after the shape reaches its keyframe target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationRecord {
    /// Tween duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Delay in seconds after the keyframe label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
    #[serde(flatten)]
    pub properties: ShapePatch,
}

impl AnimationRecord {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn with_properties(mut self, properties: ShapePatch) -> Self {
        self.properties = properties;
        self
    }

    /// An explicit `none` ease counts as unset.
    pub fn explicit_ease(&self) -> Option<Ease> {
        self.ease.filter(|e| *e != Ease::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_flat() {
        let record = AnimationRecord::new(1.5)
            .with_ease(Ease::OutCubic)
            .with_properties(ShapePatch {
                opacity: Some(0.0),
                ..ShapePatch::default()
            });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["duration"], 1.5);
        assert_eq!(value["ease"], "power2.out");
        assert_eq!(value["opacity"], 0.0);
        assert!(value.get("delay").is_none());

        let back: AnimationRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_none_ease_is_not_explicit() {
        assert_eq!(AnimationRecord::new(1.0).with_ease(Ease::None).explicit_ease(), None);
        assert_eq!(
            AnimationRecord::new(1.0).with_ease(Ease::InSine).explicit_ease(),
            Some(Ease::InSine)
        );
    }
}
