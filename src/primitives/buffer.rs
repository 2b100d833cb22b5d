//! Reusable buffers for neighbour queries and tree searches.
//!
//! ## Purpose
//!
//! Clustering issues one neighbour query per point, and the ancillary k-d
//! tree routines issue one search per point. This module provides the scratch
//! storage those queries write into so a run allocates once and then only
//! clears logical lengths.
//!
//! ## Design notes
//!
//! * **Explicit ownership**: Buffers are owned by the caller (usually the
//!   engine workspace) and passed by mutable borrow into queries. There is no
//!   hidden static or thread-local state.
//! * **Reuse**: Clearing keeps the allocation, so steady-state queries do
//!   not allocate.
//!
//! ## Key concepts
//!
//! * **Slot**: A list whose allocation survives `clear`.
//! * **Neighbourhood**: Indices of the points found by a query plus the
//!   distance to each, in the distance space of the producing index.
//! * **TreeSearchBuffer**: Candidate heap and traversal stack for `NdTree`.
//!
//! ## Invariants
//!
//! * `Neighbourhood::indices` and `Neighbourhood::distances` have equal length
//!   whenever distances were requested; otherwise `distances` is empty.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BinaryHeap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BinaryHeap;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::ops::{Deref, DerefMut};

// ============================================================================
// Slot
// ============================================================================

/// Growable list that keeps its allocation across queries.
#[derive(Debug, Clone)]
pub struct Slot<T>(Vec<T>);

impl<T> Slot<T> {
    /// Empty slot with room for `capacity` items.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Drop the contents, keep the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for Slot<T> {
    type Target = Vec<T>;
    #[inline]
    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for Slot<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

// ============================================================================
// Neighbourhood
// ============================================================================

/// Result container for a neighbour query.
#[derive(Debug, Clone)]
pub struct Neighbourhood<T> {
    /// Indices of the neighbours (unordered, including the query point).
    pub indices: Slot<usize>,
    /// Distance to each neighbour, aligned with `indices`.
    pub distances: Slot<T>,
}

impl<T> Neighbourhood<T> {
    /// Empty neighbourhood.
    pub fn new() -> Self {
        Self {
            indices: Slot::default(),
            distances: Slot::default(),
        }
    }

    /// Neighbourhood with room for `k` entries.
    pub fn with_capacity(k: usize) -> Self {
        Self {
            indices: Slot::new(k),
            distances: Slot::new(k),
        }
    }

    /// Number of neighbours currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the query found nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Clear both lists.
    #[inline]
    pub fn clear(&mut self) {
        self.indices.clear();
        self.distances.clear();
    }

    /// Append a neighbour with its distance.
    #[inline]
    pub fn push(&mut self, index: usize, distance: T) {
        self.indices.push(index);
        self.distances.push(distance);
    }

    /// Iterate `(index, distance)` pairs.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.indices.iter().copied().zip(self.distances.iter())
    }
}

impl<T> Default for Neighbourhood<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tree search buffer
// ============================================================================

/// Scratch state for one k-d tree search.
///
/// `heap` keeps the best candidates found so far with the worst on top;
/// `stack` holds `(node, visited)` pairs for the descent.
#[derive(Debug)]
pub struct TreeSearchBuffer<N> {
    pub(crate) heap: BinaryHeap<N>,
    pub(crate) stack: Vec<(usize, u8)>,
}

impl<N: Ord> TreeSearchBuffer<N> {
    /// Buffer sized for `k` candidates.
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            stack: Vec::new(),
        }
    }

    /// Forget the previous search.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.stack.clear();
    }
}

impl<N: Ord> Default for TreeSearchBuffer<N> {
    fn default() -> Self {
        Self::new(0)
    }
}
