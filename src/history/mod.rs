// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Snapshot-based undo and redo.
//!
//! Before every mutation the caller records a full copy of the current
//! state. Undo swaps the live state with the newest snapshot and keeps
//! the displaced state for redo. Snapshots are owned clones, so nothing
//! on either stack can alias the live state.

use std::collections::VecDeque;

/// Default number of undo steps retained
pub const DEFAULT_DEPTH: usize = 10;

/// Result of an undo or redo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// State was restored
    Applied,
    /// Stack was empty, nothing changed
    Empty,
}

/// Bounded undo/redo stacks of whole-state snapshots
#[derive(Debug, Clone)]
pub struct History<S: Clone> {
    /// Oldest snapshot at the front
    undo: VecDeque<S>,
    /// Most recently undone state at the back
    redo: Vec<S>,
    /// Maximum undo entries
    depth: usize,
}

impl<S: Clone> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl<S: Clone> History<S> {
    /// Create history retaining at most `depth` undo steps
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(depth + 1),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Get capacity
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Snapshot `current` ahead of a mutation.
    ///
    /// Evicts the oldest entry past capacity and invalidates redo.
    pub fn record(&mut self, current: &S) {
        self.undo.push_back(current.clone());
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Restore the newest snapshot into `current`
    pub fn undo(&mut self, current: &mut S) -> HistoryOutcome {
        match self.undo.pop_back() {
            Some(previous) => {
                let displaced = std::mem::replace(current, previous);
                self.redo.push(displaced);
                HistoryOutcome::Applied
            }
            None => HistoryOutcome::Empty,
        }
    }

    /// Re-apply the most recently undone state into `current`
    pub fn redo(&mut self, current: &mut S) -> HistoryOutcome {
        match self.redo.pop() {
            Some(next) => {
                let displaced = std::mem::replace(current, next);
                self.undo.push_back(displaced);
                while self.undo.len() > self.depth {
                    self.undo.pop_front();
                }
                HistoryOutcome::Applied
            }
            None => HistoryOutcome::Empty,
        }
    }

    /// Number of undo steps available
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Check if undo is possible
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is possible
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop both stacks
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
