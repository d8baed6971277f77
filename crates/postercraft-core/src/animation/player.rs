//! Deterministic timeline playback.

use super::{ScheduledTween, TimelineLabel, TimelinePlan, TweenEngine};
use crate::shapes::{Shape, ShapeId, ShapePatch, SharedShape};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Track {
    scheduled: ScheduledTween,
    /// Target state before this tween starts.
    from: ShapePatch,
}

/// A tween engine that samples shape state at an absolute time.
///
/// Every [`seek`](TweenEngine::seek) recomputes the state from the staged
/// shapes, so the sampled state depends only on the time and never on the
/// seek history. Start values of each tween are fixed when the tween is
/// added: they are the target's state once every earlier tween has finished.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    staged: Vec<SharedShape>,
    index: HashMap<ShapeId, usize>,
    labels: Vec<TimelineLabel>,
    tracks: Vec<Track>,
    /// State after every added tween has completed.
    settled: HashMap<ShapeId, Shape>,
    current: Vec<SharedShape>,
    time: f64,
    playing: bool,
}

impl Timeline {
    /// An empty timeline over the given staged shapes.
    pub fn new(staged: Vec<SharedShape>) -> Self {
        let index = staged
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id().to_string(), i))
            .collect();
        Self {
            current: staged.clone(),
            staged,
            index,
            ..Self::default()
        }
    }

    /// Build a timeline from a plan.
    pub fn from_plan(plan: &TimelinePlan) -> Self {
        let mut timeline = Self::new(plan.staged.clone());
        plan.install(&mut timeline);
        timeline.seek(0.0);
        timeline
    }

    /// Sampled shapes at the current time.
    pub fn shapes(&self) -> &[SharedShape] {
        &self.current
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn labels(&self) -> &[TimelineLabel] {
        &self.labels
    }

    pub fn label_position(&self, name: &str) -> Option<f64> {
        self.labels.iter().find(|l| l.name == name).map(|l| l.position)
    }

    /// Advance the playhead while playing. Returns whether playback continues.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !self.playing {
            return false;
        }
        self.seek(self.time + dt);
        if self.time >= self.duration() {
            self.playing = false;
            log::debug!("Timeline finished at {:.3}s", self.time);
        }
        self.playing
    }

    fn sample(&self, time: f64) -> Vec<SharedShape> {
        let mut shapes = self.staged.clone();
        for track in &self.tracks {
            let scheduled = &track.scheduled;
            if time < scheduled.start {
                continue;
            }
            let Some(&i) = self.index.get(&scheduled.tween.target) else {
                continue;
            };
            let tween = &scheduled.tween;
            let progress = if tween.duration <= 0.0 {
                1.0
            } else {
                ((time - scheduled.start) / tween.duration).clamp(0.0, 1.0)
            };
            let eased = tween.ease.apply(progress);
            let patch = ShapePatch::lerp(&track.from, &tween.properties, eased);
            let shape = Arc::make_mut(&mut shapes[i]);
            shape.apply_patch(&patch);
            if tween.reveal_on_start && tween.properties.visible != Some(false) {
                shape.visible = true;
            }
        }
        shapes
    }
}

impl TweenEngine for Timeline {
    fn add_label(&mut self, label: &TimelineLabel) {
        self.labels.push(label.clone());
    }

    fn add_to_timeline(&mut self, tween: &ScheduledTween) {
        let target = &tween.tween.target;
        let Some(&i) = self.index.get(target) else {
            log::warn!("Tween target {} is not staged, skipping", target);
            return;
        };
        let settled = self
            .settled
            .entry(target.clone())
            .or_insert_with(|| Shape::clone(&self.staged[i]));
        let from = settled.to_patch();
        settled.apply_patch(&tween.tween.properties);
        if tween.tween.reveal_on_start && tween.tween.properties.visible != Some(false) {
            settled.visible = true;
        }
        self.tracks.push(Track {
            scheduled: tween.clone(),
            from,
        });
    }

    fn play(&mut self) {
        if self.time >= self.duration() {
            self.seek(0.0);
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration());
        self.current = self.sample(self.time);
    }

    fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 { 1.0 } else { self.time / duration }
    }

    fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.scheduled.end())
            .fold(0.0, f64::max)
    }
}
