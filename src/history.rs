//! Bounded linear undo/redo over full scene snapshots.
//!
//! The cursor always points at the snapshot matching the live document. A new
//! snapshot discards everything after the cursor. Past the cap the oldest
//! snapshot is evicted and the cursor stays at the tail.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::consts::DEFAULT_HISTORY_CAP;
use crate::doc::SceneData;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<SceneData>,
    cursor: usize,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl History {
    /// Create an empty history. A cap of zero is treated as one.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self { snapshots: Vec::new(), cursor: 0, cap: cap.max(1) }
    }

    /// Push a snapshot of the live document.
    pub fn snapshot(&mut self, data: SceneData) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(data);
        if self.snapshots.len() > self.cap {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back. Returns the snapshot to restore, or `None` at the baseline.
    pub fn undo(&mut self) -> Option<SceneData> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).cloned()
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the tail.
    pub fn redo(&mut self) -> Option<SceneData> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor).cloned()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// The snapshot matching the live document, if any was taken.
    #[must_use]
    pub fn current(&self) -> Option<&SceneData> {
        self.snapshots.get(self.cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}
