//! Sparse keyframe storage.

use crate::shapes::{SerializableColor, ShapeId, SharedShape};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use super::{AnimationError, AnimationResult};

/// One point of an animation sequence, with its full shape list.
///
/// This is the persisted and public view of a keyframe; the track itself
/// stores only per-keyframe changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationItem {
    pub id: String,
    pub name: String,
    pub shapes: Vec<SharedShape>,
    #[serde(rename = "_color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SerializableColor>,
}

/// A keyframe holding the shapes that differ from the previous keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub id: String,
    pub name: String,
    pub color: Option<SerializableColor>,
    changes: Vec<SharedShape>,
}

impl Keyframe {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("keyframe-{}", Uuid::new_v4().simple()),
            name: name.into(),
            color: None,
            changes: Vec::new(),
        }
    }

    /// Shapes added or changed at this keyframe.
    pub fn changes(&self) -> &[SharedShape] {
        &self.changes
    }
}

/// Replace shapes by id, appending the ones not yet present.
fn layer(base: &mut Vec<SharedShape>, changes: &[SharedShape]) {
    let mut index: HashMap<ShapeId, usize> = base
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id().to_string(), i))
        .collect();
    for shape in changes {
        match index.get(shape.id()) {
            Some(&i) => base[i] = shape.clone(),
            None => {
                index.insert(shape.id().to_string(), base.len());
                base.push(shape.clone());
            }
        }
    }
}

/// Shapes of `next` that are new or different compared to `prev`.
fn diff(prev: &[SharedShape], next: &[SharedShape]) -> Vec<SharedShape> {
    let prev: HashMap<&str, &SharedShape> = prev.iter().map(|s| (s.id(), s)).collect();
    next.iter()
        .filter(|shape| match prev.get(shape.id()) {
            Some(old) => !Arc::ptr_eq(old, shape) && ***old != ***shape,
            None => true,
        })
        .cloned()
        .collect()
}

/// Drop the keyframe-editing tag so stored shapes compare equal to their
/// untouched originals.
fn untag(mut shape: SharedShape) -> SharedShape {
    if shape.animation.item_index.is_some() {
        Arc::make_mut(&mut shape).animation.item_index = None;
    }
    shape
}

/// Ordered keyframes of a document.
///
/// Keyframe `n` resolves to keyframe `n - 1`'s shapes with its own changes
/// layered on top, so a shape never disappears once it has been introduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AnimationItem>", into = "Vec<AnimationItem>")]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a track from full per-keyframe snapshots.
    pub fn from_items(items: Vec<AnimationItem>) -> Self {
        let mut keyframes = Vec::with_capacity(items.len());
        let mut prev: Vec<SharedShape> = Vec::new();
        for item in items {
            let shapes: Vec<SharedShape> = item.shapes.into_iter().map(untag).collect();
            let changes = diff(&prev, &shapes);
            layer(&mut prev, &changes);
            keyframes.push(Keyframe {
                id: item.id,
                name: item.name,
                color: item.color,
                changes,
            });
        }
        Self { keyframes }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    fn check(&self, index: usize) -> AnimationResult<()> {
        if index < self.keyframes.len() {
            Ok(())
        } else {
            Err(AnimationError::KeyframeOutOfRange {
                index,
                len: self.keyframes.len(),
            })
        }
    }

    /// Append a keyframe. The first keyframe is seeded with `seed`; later
    /// ones start out identical to their predecessor.
    pub fn push(&mut self, name: impl Into<String>, seed: &[SharedShape]) -> usize {
        let mut keyframe = Keyframe::new(name);
        if self.keyframes.is_empty() {
            keyframe.changes = seed.iter().cloned().map(untag).collect();
        }
        self.keyframes.push(keyframe);
        self.keyframes.len() - 1
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.keyframes.get_mut(index) {
            Some(keyframe) => {
                keyframe.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn recolor(&mut self, index: usize, color: Option<SerializableColor>) -> bool {
        match self.keyframes.get_mut(index) {
            Some(keyframe) => {
                keyframe.color = color;
                true
            }
            None => false,
        }
    }

    /// Remove a keyframe. Later keyframes keep resolving to the same shapes.
    pub fn remove(&mut self, index: usize) -> Option<Keyframe> {
        if index >= self.keyframes.len() {
            return None;
        }
        let mut items = self.resolved_items();
        items.remove(index);
        let removed = self.keyframes.remove(index);
        let rebuilt = Self::from_items(items);
        // keep ids/names stable, only the change sets are rebuilt
        for (keyframe, rebuilt) in self.keyframes.iter_mut().zip(rebuilt.keyframes) {
            keyframe.changes = rebuilt.changes;
        }
        Some(removed)
    }

    /// Full shape list at keyframe `index`.
    pub fn resolved_shapes(&self, index: usize) -> AnimationResult<Vec<SharedShape>> {
        self.check(index)?;
        let mut shapes = Vec::new();
        for keyframe in &self.keyframes[..=index] {
            layer(&mut shapes, &keyframe.changes);
        }
        Ok(shapes)
    }

    /// Full snapshots of every keyframe, in order.
    pub fn resolved_items(&self) -> Vec<AnimationItem> {
        let mut shapes = Vec::new();
        self.keyframes
            .iter()
            .map(|keyframe| {
                layer(&mut shapes, &keyframe.changes);
                AnimationItem {
                    id: keyframe.id.clone(),
                    name: keyframe.name.clone(),
                    shapes: shapes.clone(),
                    color: keyframe.color,
                }
            })
            .collect()
    }

    /// Ids of the shapes keyframe `index` changes.
    pub fn changed_ids(&self, index: usize) -> Vec<ShapeId> {
        self.keyframes
            .get(index)
            .map(|k| k.changes.iter().map(|s| s.id().to_string()).collect())
            .unwrap_or_default()
    }

    /// Store the result of editing keyframe `index`.
    ///
    /// `edited` is unioned with the previous keyframe's shapes by id: edited
    /// values win, untouched shapes carry over. Only the difference to the
    /// previous keyframe is kept.
    pub fn commit_edit(&mut self, index: usize, edited: Vec<SharedShape>) -> AnimationResult<()> {
        self.check(index)?;
        let prev = match index {
            0 => Vec::new(),
            i => self.resolved_shapes(i - 1)?,
        };
        let edited: Vec<SharedShape> = edited.into_iter().map(untag).collect();
        let edited_ids: HashSet<&str> = edited.iter().map(|s| s.id()).collect();
        let mut union: Vec<SharedShape> = prev
            .iter()
            .filter(|s| !edited_ids.contains(s.id()))
            .cloned()
            .collect();
        union.extend(edited.iter().cloned());
        self.keyframes[index].changes = diff(&prev, &union);
        log::debug!(
            "Keyframe {} now changes {} shape(s)",
            index,
            self.keyframes[index].changes.len()
        );
        Ok(())
    }
}

impl From<Vec<AnimationItem>> for KeyframeTrack {
    fn from(items: Vec<AnimationItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<KeyframeTrack> for Vec<AnimationItem> {
    fn from(track: KeyframeTrack) -> Self {
        track.resolved_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeType};

    fn rect(id: &str, x: f64) -> SharedShape {
        let mut shape = Shape::new(ShapeType::Rect).at(x, 0.0);
        shape.id = id.to_string();
        Arc::new(shape)
    }

    #[test]
    fn test_second_keyframe_inherits_first() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0)]);
        track.push("K2", &[]);
        assert_eq!(track.resolved_shapes(1).unwrap(), vec![rect("a", 0.0)]);
        assert!(track.changed_ids(1).is_empty());
    }

    #[test]
    fn test_commit_edit_stores_only_changes() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0), rect("b", 50.0)]);
        track.push("K2", &[]);
        track.commit_edit(1, vec![rect("a", 100.0)]).unwrap();

        assert_eq!(track.changed_ids(1), vec!["a".to_string()]);
        let k2 = track.resolved_shapes(1).unwrap();
        assert_eq!(k2.len(), 2);
        assert!((k2[0].position.x - 100.0).abs() < f64::EPSILON);
        assert!((k2[1].position.x - 50.0).abs() < f64::EPSILON);
        let k1 = track.resolved_shapes(0).unwrap();
        assert!((k1[0].position.x - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_editing_tag_is_not_a_change() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0)]);
        track.push("K2", &[]);
        let mut tagged = (*rect("a", 0.0)).clone();
        tagged.animation.item_index = Some(1);
        track.commit_edit(1, vec![Arc::new(tagged)]).unwrap();
        assert!(track.changed_ids(1).is_empty());
    }

    #[test]
    fn test_new_shape_in_later_keyframe_is_appended() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0)]);
        track.push("K2", &[]);
        track.commit_edit(1, vec![rect("a", 0.0), rect("c", 10.0)]).unwrap();
        let ids: Vec<String> = track
            .resolved_shapes(1)
            .unwrap()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(track.resolved_shapes(0).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_keeps_later_snapshots() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0)]);
        track.push("K2", &[]);
        track.push("K3", &[]);
        track.commit_edit(1, vec![rect("a", 100.0)]).unwrap();
        let before = track.resolved_shapes(2).unwrap();

        let removed = track.remove(1).unwrap();
        assert_eq!(removed.name, "K2");
        assert_eq!(track.len(), 2);
        assert_eq!(track.resolved_shapes(1).unwrap(), before);
        assert_eq!(track.changed_ids(1), vec!["a".to_string()]);
    }

    #[test]
    fn test_out_of_range() {
        let mut track = KeyframeTrack::new();
        assert_eq!(
            track.commit_edit(0, vec![]),
            Err(AnimationError::KeyframeOutOfRange { index: 0, len: 0 })
        );
        assert!(!track.rename(3, "x"));
        assert!(track.remove(0).is_none());
    }

    #[test]
    fn test_serializes_as_full_items() {
        let mut track = KeyframeTrack::new();
        track.push("K1", &[rect("a", 0.0)]);
        track.push("K2", &[]);
        track.recolor(1, Some(SerializableColor::white()));
        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value[1]["shapes"][0]["id"], "a");
        assert_eq!(value[1]["name"], "K2");

        let back: KeyframeTrack = serde_json::from_value(value).unwrap();
        assert_eq!(back.resolved_items(), track.resolved_items());
        assert!(back.changed_ids(1).is_empty());
    }
}
