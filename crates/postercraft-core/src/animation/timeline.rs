//! Timeline planning: turning keyframes into labelled tween descriptors.

use super::{Ease, KeyframeTrack};
use crate::config::EditorConfig;
use crate::shapes::{Shape, ShapeId, ShapePatch, SharedShape};
use std::collections::HashSet;
use std::sync::Arc;

/// A declarative property tween for one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenDescriptor {
    pub target: ShapeId,
    pub properties: ShapePatch,
    pub duration: f64,
    pub delay: f64,
    pub ease: Ease,
    pub label: String,
    /// Make the target visible when the tween starts (dynamically added shapes).
    pub reveal_on_start: bool,
}

/// A tween with its absolute start time on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTween {
    pub start: f64,
    pub tween: TweenDescriptor,
}

impl ScheduledTween {
    pub fn end(&self) -> f64 {
        self.start + self.tween.duration
    }
}

/// A named position on the timeline; one per keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLabel {
    pub name: String,
    pub position: f64,
}

/// Time-based tween engine that plays a [`TimelinePlan`].
///
/// Engines must support absolute seeking: seeking to the same time twice
/// has to produce the same state.
pub trait TweenEngine {
    fn add_label(&mut self, label: &TimelineLabel);
    fn add_to_timeline(&mut self, tween: &ScheduledTween);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, time: f64);
    /// Playhead position in `[0, 1]`.
    fn progress(&self) -> f64;
    /// Total length in seconds.
    fn duration(&self) -> f64;
}

/// Everything needed to play a keyframe animation.
#[derive(Debug, Clone, Default)]
pub struct TimelinePlan {
    /// Shapes as staged before the first tween, dynamic shapes included
    /// (locked and hidden).
    pub staged: Vec<SharedShape>,
    /// Ids of shapes first introduced by a keyframe.
    pub dynamic: Vec<ShapeId>,
    pub labels: Vec<TimelineLabel>,
    pub tweens: Vec<ScheduledTween>,
}

impl TimelinePlan {
    /// Sequence `track` on top of the live shapes.
    ///
    /// Each keyframe gets a label placed where the previous keyframe's tweens
    /// end. Every shape the keyframe changes gets a tween at that label: a
    /// shape without an explicit ease jumps to its keyframe values and then
    /// plays its record's properties over the record's duration (the default
    /// tween duration without a record); with an ease, keyframe values and
    /// record properties are tweened together.
    pub fn build(live: &[SharedShape], track: &KeyframeTrack, config: &EditorConfig) -> Self {
        let mut plan = TimelinePlan {
            staged: live.to_vec(),
            ..TimelinePlan::default()
        };
        let mut known: HashSet<ShapeId> = live.iter().map(|s| s.id().to_string()).collect();
        let mut cursor = 0.0_f64;

        for (index, keyframe) in track.keyframes().iter().enumerate() {
            let label = format!("keyframe-{index}");
            plan.labels.push(TimelineLabel {
                name: label.clone(),
                position: cursor,
            });
            let mut end = cursor;

            for shape in keyframe.changes() {
                let dynamic = known.insert(shape.id().to_string());
                if dynamic {
                    let mut staged = Shape::clone(shape);
                    staged.is_locked = true;
                    staged.visible = false;
                    staged.animation.item_index = None;
                    plan.staged.push(Arc::new(staged));
                    plan.dynamic.push(shape.id().to_string());
                }
                for tween in Self::tweens_for(shape, cursor, &label, dynamic, config) {
                    end = end.max(tween.end());
                    plan.tweens.push(tween);
                }
            }
            cursor = end;
        }
        log::debug!(
            "Planned {} tween(s) over {} keyframe(s), {:.3}s",
            plan.tweens.len(),
            plan.labels.len(),
            cursor
        );
        plan
    }

    fn tweens_for(
        shape: &Shape,
        at: f64,
        label: &str,
        dynamic: bool,
        config: &EditorConfig,
    ) -> Vec<ScheduledTween> {
        let mut target = shape.to_patch();
        // lock state and editor-only flags are not animated
        target.is_locked = None;
        if dynamic && target.visible == Some(true) {
            target.visible = None;
        }
        let record = shape.animation.record.clone().unwrap_or_default();
        let duration = record.duration.unwrap_or(config.default_tween_duration).max(0.0);
        let delay = record.delay.unwrap_or(0.0).max(0.0);

        match record.explicit_ease() {
            Some(ease) => {
                target.merge(&record.properties);
                vec![ScheduledTween {
                    start: at + delay,
                    tween: TweenDescriptor {
                        target: shape.id().to_string(),
                        properties: target,
                        duration,
                        delay,
                        ease,
                        label: label.to_string(),
                        reveal_on_start: dynamic,
                    },
                }]
            }
            None => {
                let jump = ScheduledTween {
                    start: at,
                    tween: TweenDescriptor {
                        target: shape.id().to_string(),
                        properties: target,
                        duration: config.instant_tween_duration,
                        delay: 0.0,
                        ease: Ease::None,
                        label: label.to_string(),
                        reveal_on_start: dynamic,
                    },
                };
                // an empty record still occupies its duration as a hold
                let follow = ScheduledTween {
                    start: jump.end() + delay,
                    tween: TweenDescriptor {
                        target: shape.id().to_string(),
                        properties: record.properties,
                        duration,
                        delay,
                        ease: Ease::None,
                        label: label.to_string(),
                        reveal_on_start: false,
                    },
                };
                vec![jump, follow]
            }
        }
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f64 {
        self.tweens.iter().map(ScheduledTween::end).fold(0.0, f64::max)
    }

    /// Hand labels and tweens to an engine.
    pub fn install(&self, engine: &mut dyn TweenEngine) {
        for label in &self.labels {
            engine.add_label(label);
        }
        for tween in &self.tweens {
            engine.add_to_timeline(tween);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationRecord;
    use crate::shapes::ShapeType;

    fn rect(id: &str, x: f64) -> Shape {
        let mut shape = Shape::new(ShapeType::Rect).at(x, 0.0);
        shape.id = id.to_string();
        shape
    }

    fn two_keyframes(moved: Shape) -> (Vec<SharedShape>, KeyframeTrack) {
        let live = vec![Arc::new(rect("a", 0.0))];
        let mut track = KeyframeTrack::new();
        track.push("K1", &live);
        track.push("K2", &[]);
        track.commit_edit(1, vec![Arc::new(moved)]).unwrap();
        (live, track)
    }

    #[test]
    fn test_labels_follow_previous_keyframe() {
        let config = EditorConfig::default();
        let mut moved = rect("a", 100.0);
        moved.animation.record = Some(AnimationRecord::new(2.0).with_ease(Ease::OutQuad));
        let (live, track) = two_keyframes(moved);
        let plan = TimelinePlan::build(&live, &track, &config);

        assert_eq!(plan.labels.len(), 2);
        // K1 re-applies a's own values, then holds for the default duration
        let k1_end = config.instant_tween_duration + config.default_tween_duration;
        assert!((plan.labels[1].position - k1_end).abs() < 1e-12);
        let last = plan.tweens.last().unwrap();
        assert_eq!(last.tween.label, "keyframe-1");
        assert_eq!(last.tween.ease, Ease::OutQuad);
        assert_eq!(last.tween.properties.x, Some(100.0));
        assert!((plan.duration() - (k1_end + 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_recordless_move_lasts_default_duration() {
        let config = EditorConfig::default();
        let (live, track) = two_keyframes(rect("a", 100.0));
        let plan = TimelinePlan::build(&live, &track, &config);

        let per_keyframe = config.instant_tween_duration + config.default_tween_duration;
        assert!(plan.duration() >= 2.0 * per_keyframe - 1e-12);
        let k2: Vec<_> = plan.tweens.iter().filter(|t| t.tween.label == "keyframe-1").collect();
        assert_eq!(k2.len(), 2);
        assert!(k2[1].tween.properties.is_empty());
        assert!((k2[1].tween.duration - config.default_tween_duration).abs() < 1e-12);
    }

    #[test]
    fn test_record_timing_applies_without_properties() {
        let config = EditorConfig::default();
        let mut moved = rect("a", 100.0);
        moved.animation.record = Some(AnimationRecord::new(2.0).with_delay(0.5));
        let (live, track) = two_keyframes(moved);
        let plan = TimelinePlan::build(&live, &track, &config);

        let start = plan.labels[1].position;
        assert!(plan.duration() - start >= 2.5);
        let hold = plan.tweens.last().unwrap();
        assert!((hold.start - (start + config.instant_tween_duration + 0.5)).abs() < 1e-12);
        assert!((hold.tween.duration - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_ease_splits_into_jump_and_record_tween() {
        let config = EditorConfig::default();
        let mut moved = rect("a", 100.0);
        moved.animation.record = Some(
            AnimationRecord::new(1.0)
                .with_delay(0.5)
                .with_properties(ShapePatch {
                    rotation: Some(45.0),
                    ..ShapePatch::default()
                }),
        );
        let (live, track) = two_keyframes(moved);
        let plan = TimelinePlan::build(&live, &track, &config);

        let k2: Vec<_> = plan.tweens.iter().filter(|t| t.tween.label == "keyframe-1").collect();
        assert_eq!(k2.len(), 2);
        assert_eq!(k2[0].tween.properties.x, Some(100.0));
        assert!((k2[0].tween.duration - config.instant_tween_duration).abs() < 1e-12);
        assert_eq!(k2[1].tween.properties.rotation, Some(45.0));
        assert_eq!(k2[1].tween.properties.x, None);
        assert!((k2[1].start - (k2[0].end() + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_dynamic_shapes_are_staged_hidden_and_locked() {
        let config = EditorConfig::default();
        let live = vec![Arc::new(rect("a", 0.0))];
        let mut track = KeyframeTrack::new();
        track.push("K1", &live);
        track.push("K2", &[]);
        track
            .commit_edit(1, vec![Arc::new(rect("a", 0.0)), Arc::new(rect("b", 10.0))])
            .unwrap();
        let plan = TimelinePlan::build(&live, &track, &config);

        assert_eq!(plan.dynamic, vec!["b".to_string()]);
        let staged = plan.staged.iter().find(|s| s.id() == "b").unwrap();
        assert!(!staged.visible);
        assert!(staged.is_locked);
        let tween = plan.tweens.iter().find(|t| t.tween.target == "b").unwrap();
        assert!(tween.tween.reveal_on_start);
        assert_eq!(tween.tween.properties.visible, None);
    }

    #[test]
    fn test_empty_track_has_no_tweens() {
        let plan = TimelinePlan::build(&[], &KeyframeTrack::new(), &EditorConfig::default());
        assert!(plan.tweens.is_empty());
        assert_eq!(plan.duration(), 0.0);
    }
}
