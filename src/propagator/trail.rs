//! Undo log for propagation.

use crate::model::SlotVar;

/// One state change, recorded so it can be reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrailEntry {
    /// A slot variable left `Open`.
    Slot(SlotVar),
    /// A usage indicator (by usage index) left `Open`.
    Usage(usize),
}

/// A linear undo log with frame markers.
///
/// `frames[i]` is the length of `entries` when decision level `i` was
/// opened. Backtracking a level reverts every entry above that mark.
#[derive(Debug, Clone, Default)]
pub(crate) struct Trail {
    entries: Vec<TrailEntry>,
    frames: Vec<usize>,
}

impl Trail {
    pub(crate) fn with_capacity(entries: usize) -> Self {
        Self {
            entries: Vec::with_capacity(entries),
            frames: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, entry: TrailEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Start of the innermost frame, or 0 at the root.
    pub(crate) fn frame_start(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    pub(crate) fn pop_frame(&mut self) -> Option<usize> {
        self.frames.pop()
    }

    /// Pops the newest entry if it lies above `mark`.
    #[inline]
    pub(crate) fn pop_above(&mut self, mark: usize) -> Option<TrailEntry> {
        if self.entries.len() > mark {
            self.entries.pop()
        } else {
            None
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
