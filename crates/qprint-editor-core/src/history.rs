//! Snapshot-based undo/redo
//!
//! Each entry is a full copy of the state taken before a mutation. Both
//! stacks are newest-first and capped; the oldest entries fall off.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_DEPTH: usize = 20;

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    depth: usize,
}

impl<T: Clone> History<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            depth: depth.max(1),
        }
    }

    /// Record `current` as the state to return to; invalidates redo.
    pub fn capture(&mut self, current: &T) {
        push_capped(&mut self.past, current.clone(), self.depth);
        self.future.clear();
    }

    /// Swap `current` with the most recent past state.
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.past.pop_front() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        push_capped(&mut self.future, replaced, self.depth);
        true
    }

    /// Swap `current` with the most recently undone state.
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        push_capped(&mut self.past, replaced, self.depth);
        true
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn clear_future(&mut self) {
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Most recent snapshot first
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter()
    }

    /// Every stored snapshot, past and future
    pub fn snapshots_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.past.iter_mut().chain(self.future.iter_mut())
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

fn push_capped<T>(stack: &mut VecDeque<T>, entry: T, depth: usize) {
    stack.push_front(entry);
    stack.truncate(depth);
}
