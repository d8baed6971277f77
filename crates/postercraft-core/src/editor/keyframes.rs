//! Keyframe management and keyframe edit mode.
//!
//! Editing keyframe `n` swaps the live shapes for the keyframe's resolved
//! shapes. The live shapes are parked in a backup slot keyed by project id
//! and come back when the edit completes or is cancelled. History is reset
//! on both transitions, so undo never crosses an edit-mode boundary.

use super::Editor;
use crate::animation::{
    AnimationError, AnimationRecord, AnimationResult, Keyframe, KeyframeTrack, Timeline,
    TimelinePlan,
};
use crate::shapes::{SerializableColor, SharedShape};
use crate::store::DocumentPatch;
use std::sync::Arc;

/// Log a broken edit-mode sequence before handing the error back.
fn violation(err: AnimationError) -> AnimationError {
    log::error!("Keyframe edit precondition violated: {}", err);
    err
}

impl Editor {
    pub fn keyframes(&self) -> &[Keyframe] {
        self.state()
            .animations
            .as_ref()
            .map(KeyframeTrack::keyframes)
            .unwrap_or(&[])
    }

    /// Keyframe currently being edited.
    pub fn editing_keyframe(&self) -> Option<usize> {
        self.state().editing_keyframe
    }

    /// Live shapes, even while a keyframe is being edited.
    pub fn live_shapes(&self) -> &[SharedShape] {
        let state = self.state();
        match self.keyframe_backups.get(&state.project_id) {
            Some(backup) if state.editing_keyframe.is_some() => backup,
            _ => &state.shapes,
        }
    }

    fn write_track(&mut self, track: KeyframeTrack) {
        let track = (!track.is_empty()).then_some(track);
        self.store.set_state(DocumentPatch {
            animations: Some(track),
            ..DocumentPatch::default()
        });
    }

    /// Append a keyframe and return its index.
    ///
    /// The first keyframe starts from the live shapes; later keyframes start
    /// identical to their predecessor.
    pub fn add_keyframe(&mut self, name: Option<&str>) -> usize {
        let mut track = self.state().animations.clone().unwrap_or_default();
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Keyframe {}", track.len() + 1),
        };
        let index = track.push(name, self.live_shapes());
        self.write_track(track);
        log::debug!("Added keyframe {}", index);
        index
    }

    pub fn rename_keyframe(&mut self, index: usize, name: &str) -> bool {
        let Some(mut track) = self.state().animations.clone() else {
            return false;
        };
        if !track.rename(index, name) {
            return false;
        }
        self.write_track(track);
        true
    }

    pub fn recolor_keyframe(&mut self, index: usize, color: Option<SerializableColor>) -> bool {
        let Some(mut track) = self.state().animations.clone() else {
            return false;
        };
        if !track.recolor(index, color) {
            return false;
        }
        self.write_track(track);
        true
    }

    /// Delete a keyframe. Refused while any keyframe is being edited.
    pub fn delete_keyframe(&mut self, index: usize) -> bool {
        if let Some(editing) = self.editing_keyframe() {
            log::warn!("Cannot delete keyframe {} while editing keyframe {}", index, editing);
            return false;
        }
        let Some(mut track) = self.state().animations.clone() else {
            return false;
        };
        if track.remove(index).is_none() {
            return false;
        }
        self.write_track(track);
        true
    }

    /// Enter edit mode for keyframe `index`.
    pub fn begin_keyframe_edit(&mut self, index: usize) -> AnimationResult<()> {
        if let Some(editing) = self.editing_keyframe() {
            return Err(violation(AnimationError::AlreadyEditing(editing)));
        }
        let resolved = match &self.state().animations {
            Some(track) => track.resolved_shapes(index).map_err(violation)?,
            None => {
                return Err(violation(AnimationError::KeyframeOutOfRange { index, len: 0 }));
            }
        };
        let tagged: Vec<SharedShape> = resolved
            .into_iter()
            .map(|mut shape| {
                Arc::make_mut(&mut shape).animation.item_index = Some(index);
                shape
            })
            .collect();

        let project_id = self.state().project_id.clone();
        let backup = self.state().shapes.clone();
        self.keyframe_backups.insert(project_id, backup);
        self.drag = None;
        self.store.set_state(DocumentPatch {
            shapes: Some(tagged),
            selected_ids: Some(Vec::new()),
            editing_keyframe: Some(Some(index)),
            ..DocumentPatch::default()
        });
        self.reset_history();
        log::info!("Editing keyframe {}", index);
        Ok(())
    }

    /// Store the edited shapes into the active keyframe and bring the live
    /// shapes back.
    pub fn complete_keyframe_edit(&mut self) -> AnimationResult<()> {
        let index = self
            .editing_keyframe()
            .ok_or_else(|| violation(AnimationError::NoActiveKeyframe))?;
        let project_id = self.state().project_id.clone();
        if !self.keyframe_backups.contains_key(&project_id) {
            return Err(violation(AnimationError::MissingBackup(project_id)));
        }
        let mut track = self.state().animations.clone().unwrap_or_default();
        track
            .commit_edit(index, self.state().shapes.clone())
            .map_err(violation)?;

        self.leave_keyframe_edit(&project_id, Some(track));
        log::info!("Stored keyframe {}", index);
        Ok(())
    }

    /// Leave edit mode, discarding the edits.
    pub fn cancel_keyframe_edit(&mut self) -> AnimationResult<()> {
        let index = self
            .editing_keyframe()
            .ok_or_else(|| violation(AnimationError::NoActiveKeyframe))?;
        let project_id = self.state().project_id.clone();
        if !self.keyframe_backups.contains_key(&project_id) {
            return Err(violation(AnimationError::MissingBackup(project_id)));
        }
        self.leave_keyframe_edit(&project_id, None);
        log::info!("Discarded edits to keyframe {}", index);
        Ok(())
    }

    fn leave_keyframe_edit(&mut self, project_id: &str, track: Option<KeyframeTrack>) {
        let backup = self.keyframe_backups.remove(project_id).unwrap_or_default();
        self.drag = None;
        self.store.set_state(DocumentPatch {
            shapes: Some(backup),
            selected_ids: Some(Vec::new()),
            animations: track.map(|t| (!t.is_empty()).then_some(t)),
            editing_keyframe: Some(None),
            ..DocumentPatch::default()
        });
        self.reset_history();
    }

    /// Set or clear the tween overrides of a shape in the keyframe being
    /// edited. Only meaningful in edit mode.
    pub fn set_animation_record(&mut self, id: &str, record: Option<AnimationRecord>) -> bool {
        if self.editing_keyframe().is_none() {
            log::warn!("Animation record for {} ignored outside keyframe edit mode", id);
            return false;
        }
        let Some(index) = self.state().shape_index(id) else {
            return false;
        };
        if self.shapes()[index].animation.record == record {
            return false;
        }
        let mut shapes = self.shapes().to_vec();
        Arc::make_mut(&mut shapes[index]).animation.record = record;
        self.write_shapes(shapes);
        self.commit();
        true
    }

    /// Tween plan for the stored keyframes over the live shapes.
    pub fn timeline_plan(&self) -> Option<TimelinePlan> {
        let track = self.state().animations.as_ref()?;
        if track.is_empty() {
            return None;
        }
        Some(TimelinePlan::build(self.live_shapes(), track, self.config()))
    }

    /// A deterministic timeline ready for preview or export, seeked to 0.
    pub fn build_timeline(&self) -> Option<Timeline> {
        self.timeline_plan().map(|plan| Timeline::from_plan(&plan))
    }
}
