// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Insertion ordered set of pending passes

use indexmap::IndexSet;
use std::hash::Hash;

/// FIFO queue that holds each pass at most once.
///
/// Adding a pass that is already queued leaves its position unchanged.
#[derive(Debug, Clone)]
pub struct WorkQueue<P> {
    pending: IndexSet<P>,
}

impl<P> Default for WorkQueue<P> {
    fn default() -> Self {
        Self { pending: IndexSet::new() }
    }
}

impl<P: Copy + Eq + Hash> WorkQueue<P> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pass at the back; returns false if it was already queued
    pub fn add(&mut self, pass: P) -> bool {
        self.pending.insert(pass)
    }

    /// Queue every pass in order, returning how many were new
    pub fn extend<I: IntoIterator<Item = P>>(&mut self, passes: I) -> usize {
        passes.into_iter().filter(|pass| self.add(*pass)).count()
    }

    /// Remove the earliest queued pass
    pub fn pop_front(&mut self) -> Option<P> {
        self.pending.shift_remove_index(0)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, pass: &P) -> bool {
        self.pending.contains(pass)
    }

    /// Pending passes from front to back
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
