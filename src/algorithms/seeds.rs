//! Seed ordering queue for OPTICS expansion.
//!
//! ## Purpose
//!
//! OPTICS always expands the unprocessed point with the smallest
//! reachability distance next. This module provides the queue that keeps
//! those points ordered, in two flavours sharing one comparator:
//! a binary min-heap and a linear-scan list.
//!
//! ## Design notes
//!
//! * **One comparator**: `compare_seeds` orders by reachability and then by
//!   the configured `TieBreak`. `push`, `move_up` and `pop` all use it.
//! * **Positions in molecules**: The heap stores point ids; each molecule's
//!   `queue_index` records its slot so `move_up` finds it in O(1).
//! * **Borrowed state**: The queue never owns molecules. Every operation
//!   takes the molecule slice it orders by.
//!
//! ## Invariants
//!
//! * A point is in the queue iff its `queue_index != NOT_QUEUED`.
//! * Queued points have a defined reachability distance.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::cmp::Ordering;
use num_traits::Float;

use crate::primitives::molecule::{Molecule, NOT_QUEUED};

// ============================================================================
// Configuration
// ============================================================================

/// Seed queue implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueKind {
    /// Binary min-heap, O(log n) push and pop.
    #[default]
    Heap,

    /// Unordered list scanned on every pop.
    List,
}

/// Ordering of seeds with equal reachability distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Whatever order the queue implementation produces.
    Unspecified,

    /// Lower point id first.
    #[default]
    AscendingId,

    /// Higher point id first.
    DescendingId,
}

/// Compare two seeds: ascending reachability (undefined last), then tie-break.
#[inline]
pub fn compare_seeds<T: Float>(tie_break: TieBreak, a: &Molecule<T>, b: &Molecule<T>) -> Ordering {
    let ra = a.reachability_distance.unwrap_or_else(T::infinity);
    let rb = b.reachability_distance.unwrap_or_else(T::infinity);
    ra.partial_cmp(&rb)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match tie_break {
            TieBreak::Unspecified => Ordering::Equal,
            TieBreak::AscendingId => a.id.cmp(&b.id),
            TieBreak::DescendingId => b.id.cmp(&a.id),
        })
}

// ============================================================================
// Seed queue
// ============================================================================

/// Priority queue of point ids ordered by reachability distance.
#[derive(Debug, Clone, Default)]
pub struct SeedQueue {
    kind: QueueKind,
    tie_break: TieBreak,
    items: Vec<usize>,
}

impl SeedQueue {
    /// Create an empty queue.
    pub fn new(kind: QueueKind, tie_break: TieBreak) -> Self {
        Self {
            kind,
            tie_break,
            items: Vec::new(),
        }
    }

    /// Implementation in use.
    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Tie-break policy in use.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Number of queued points.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every point, marking each as not queued.
    pub fn clear<T>(&mut self, molecules: &mut [Molecule<T>]) {
        for &id in &self.items {
            molecules[id].queue_index = NOT_QUEUED;
        }
        self.items.clear();
    }

    /// Queue point `id`. Its reachability distance must already be set.
    pub fn push<T: Float>(&mut self, id: usize, molecules: &mut [Molecule<T>]) {
        let slot = self.items.len();
        self.items.push(id);
        molecules[id].queue_index = slot;
        if self.kind == QueueKind::Heap {
            self.sift_up(slot, molecules);
        }
    }

    /// Restore order after the reachability distance of queued point `id`
    /// decreased.
    pub fn move_up<T: Float>(&mut self, id: usize, molecules: &mut [Molecule<T>]) {
        let slot = molecules[id].queue_index;
        if slot == NOT_QUEUED || self.kind == QueueKind::List {
            return;
        }
        self.sift_up(slot, molecules);
    }

    /// Remove and return the point with the smallest reachability distance.
    pub fn pop<T: Float>(&mut self, molecules: &mut [Molecule<T>]) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let slot = match self.kind {
            QueueKind::Heap => 0,
            QueueKind::List => {
                let mut best = 0;
                for i in 1..self.items.len() {
                    let candidate = &molecules[self.items[i]];
                    let current = &molecules[self.items[best]];
                    if compare_seeds(self.tie_break, candidate, current) == Ordering::Less {
                        best = i;
                    }
                }
                best
            }
        };

        let id = self.items.swap_remove(slot);
        molecules[id].queue_index = NOT_QUEUED;
        if slot < self.items.len() {
            molecules[self.items[slot]].queue_index = slot;
            if self.kind == QueueKind::Heap {
                self.sift_down(slot, molecules);
            }
        }
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Heap maintenance
    // ------------------------------------------------------------------------

    #[inline]
    fn less<T: Float>(&self, molecules: &[Molecule<T>], a: usize, b: usize) -> bool {
        compare_seeds(
            self.tie_break,
            &molecules[self.items[a]],
            &molecules[self.items[b]],
        ) == Ordering::Less
    }

    fn swap<T>(&mut self, molecules: &mut [Molecule<T>], a: usize, b: usize) {
        self.items.swap(a, b);
        molecules[self.items[a]].queue_index = a;
        molecules[self.items[b]].queue_index = b;
    }

    fn sift_up<T: Float>(&mut self, mut slot: usize, molecules: &mut [Molecule<T>]) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(molecules, slot, parent) {
                break;
            }
            self.swap(molecules, slot, parent);
            slot = parent;
        }
    }

    fn sift_down<T: Float>(&mut self, mut slot: usize, molecules: &mut [Molecule<T>]) {
        let n = self.items.len();
        loop {
            let left = 2 * slot + 1;
            if left >= n {
                return;
            }
            let right = left + 1;
            let child = if right < n && self.less(molecules, right, left) {
                right
            } else {
                left
            };
            if !self.less(molecules, child, slot) {
                return;
            }
            self.swap(molecules, slot, child);
            slot = child;
        }
    }
}
