//! Bounded order-statistic heap for core distances.
//!
//! ## Purpose
//!
//! The core distance of a point is the `min_points`-th smallest distance in
//! its neighbourhood. This module computes that value in O(n log k) with a
//! fixed-capacity max-heap instead of sorting the whole neighbourhood.
//!
//! ## Design notes
//!
//! * **Max-heap of capacity k**: The first `k` values are inserted directly.
//!   Each later value replaces the root only if it is smaller, then sifts
//!   down. The root is the answer once every value has been consumed.
//! * **Exact-size shortcut**: When exactly `k` values are supplied the answer
//!   is the plain maximum, found by a linear scan.
//! * **Reusable storage**: The heap array lives in the struct so repeated
//!   calls allocate at most once.
//!
//! ## Invariants
//!
//! * Fewer than `k` values yield `None` (undefined core distance).
//! * `k == 0` is treated as `k == 1`.
//!
//! ## Non-goals
//!
//! * This module does not handle NaN inputs; distances are assumed finite.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

/// Fixed-capacity max-heap computing the k-th smallest of a multiset.
#[derive(Debug, Clone)]
pub struct KthSmallest<T> {
    heap: Vec<T>,
}

impl<T> Default for KthSmallest<T> {
    fn default() -> Self {
        Self { heap: Vec::new() }
    }
}

impl<T: Float> KthSmallest<T> {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    /// Return the `k`-th smallest value of `values` (1-based rank).
    pub fn kth_smallest(&mut self, k: usize, values: &[T]) -> Option<T> {
        let k = k.max(1);
        let n = values.len();
        if n < k {
            return None;
        }
        if n == k {
            return Some(values.iter().copied().fold(values[0], T::max));
        }

        self.heap.clear();
        self.heap.extend_from_slice(&values[..k]);
        // Heapify the first k values.
        for i in (0..k / 2).rev() {
            sift_down(&mut self.heap, i);
        }
        for &v in &values[k..] {
            if v < self.heap[0] {
                self.heap[0] = v;
                sift_down(&mut self.heap, 0);
            }
        }
        Some(self.heap[0])
    }
}

/// Restore the max-heap property below `i`.
#[inline]
fn sift_down<T: Float>(heap: &mut [T], mut i: usize) {
    let n = heap.len();
    loop {
        let left = 2 * i + 1;
        if left >= n {
            return;
        }
        let right = left + 1;
        let largest = if right < n && heap[right] > heap[left] {
            right
        } else {
            left
        };
        if heap[largest] <= heap[i] {
            return;
        }
        heap.swap(i, largest);
        i = largest;
    }
}
