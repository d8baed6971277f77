//! Linear, bounded undo/redo history.

use crate::shapes::SharedShape;
use crate::store::SafeArea;
use crate::viewport::StageTransform;
use std::collections::VecDeque;

/// Default maximum number of history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// An immutable snapshot of the document at one edit step.
///
/// Shapes are shared with the live document and with neighbouring
/// snapshots; only shapes that changed between two edits are distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub shapes: Vec<SharedShape>,
    pub stage: StageTransform,
    pub safe_area: SafeArea,
}

/// Snapshot log with a cursor.
///
/// Entry 0 is the baseline ("nothing yet"); the first real commit lands at
/// index 1, which is also the undo floor.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistorySnapshot>,
    index: usize,
    limit: usize,
}

impl History {
    pub fn new(baseline: HistorySnapshot, limit: usize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.min(64));
        entries.push_back(baseline);
        Self {
            entries,
            index: 0,
            limit: limit.max(2),
        }
    }

    /// Drop every entry and start over from `baseline`.
    pub fn reset(&mut self, baseline: HistorySnapshot) {
        self.entries.clear();
        self.entries.push_back(baseline);
        self.index = 0;
        log::debug!("History reset");
    }

    /// Append a snapshot after the cursor, discarding any redo entries.
    pub fn commit(&mut self, snapshot: HistorySnapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
        log::debug!("History commit ({}/{})", self.index, self.entries.len());
    }

    pub fn can_undo(&self) -> bool {
        self.index > 1
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back. Returns the snapshot to restore, or `None` at the floor.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("Undo to {}", self.index);
        self.entries.get(self.index)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("Redo to {}", self.index);
        self.entries.get(self.index)
    }

    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.entries.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }
}
