//! Dynamic k-d tree for nearest-neighbour and range search in nD space.
//!
//! ## Purpose
//!
//! This module implements a bucketed k-d tree that grows by insertion. It
//! backs the ancillary nearest-neighbour routines (k-distance sampling and
//! outlier scoring) and is independent of the clustering driver.
//!
//! ## Design notes
//!
//! * **Arena storage**: Nodes live in a single vector and refer to each other
//!   by index. Stems own two child indices, every node records its parent
//!   index, so ownership stays acyclic while insertion can still walk upwards.
//! * **Buckets**: Leaves hold up to `BUCKET_SIZE` points before splitting.
//! * **Widest-axis split**: A full leaf splits on the dimension with the
//!   largest (optionally weighted) extent at the midpoint of that extent.
//! * **Iterative search**: Queries use an explicit per-level status stack
//!   rather than recursion.
//!
//! ## Key concepts
//!
//! * **Bounds**: Every node keeps the tight axis-aligned bounds of its
//!   subtree. Searches skip a subtree when the query's distance to those
//!   bounds cannot beat the current worst retained candidate.
//! * **NaN coordinates**: A NaN widens the node bound to NaN in that
//!   dimension. NaN extents count as zero width, so that dimension is never
//!   chosen for splitting, and NaN bounds never prune.
//!
//! ## Invariants
//!
//! * A stem's `count` equals the number of points stored in its subtree.
//! * A split always produces two non-empty children; a leaf whose widest
//!   extent is zero doubles its capacity instead.
//! * Read-only searches may run concurrently from several threads; insertion
//!   must not overlap a search (enforced by `&mut self`).
//!
//! ## Non-goals
//!
//! * This module does not support removal of points.
//! * This module does not rebalance.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::{self, Equal};
use core::mem;
use num_traits::Float;

// Internal dependencies
use crate::math::distance::PointDistance;
use crate::primitives::buffer::TreeSearchBuffer;
use crate::primitives::errors::OpticsError;

/// Default number of points a leaf holds before it splits.
pub const BUCKET_SIZE: usize = 24;

// Traversal status of a stem on the search stack.
const FRESH: u8 = 0;
const NEAR_DONE: u8 = 1;
const BOTH_DONE: u8 = 2;

// ============================================================================
// Helper Types
// ============================================================================

/// Candidate retained during a k-nearest search.
///
/// Orders by distance so the worst candidate sits at the top of the max-heap.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<T> {
    /// Distance from the query, in the metric's comparison space.
    pub distance: T,
    node: usize,
    slot: usize,
}

impl<T: PartialEq> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}
impl<T: PartialEq> Eq for Candidate<T> {}

impl<T: PartialOrd> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialOrd> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.partial_cmp(&other.distance).unwrap_or(Equal)
    }
}

/// Search scratch space for `NdTree` queries.
pub type NdSearchBuffer<T> = TreeSearchBuffer<Candidate<T>>;

#[derive(Debug, Clone)]
enum NodeKind<T, V> {
    Leaf {
        /// Flattened coordinates, `dimensions` values per point.
        locations: Vec<T>,
        values: Vec<V>,
        capacity: usize,
    },
    Stem {
        split_dim: usize,
        split_value: T,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Node<T, V> {
    parent: Option<usize>,
    min: Vec<T>,
    max: Vec<T>,
    count: usize,
    kind: NodeKind<T, V>,
}

impl<T: Float, V> Node<T, V> {
    fn leaf(parent: Option<usize>, dimensions: usize, capacity: usize) -> Self {
        Self {
            parent,
            min: vec![T::zero(); dimensions],
            max: vec![T::zero(); dimensions],
            count: 0,
            kind: NodeKind::Leaf {
                locations: Vec::with_capacity(capacity * dimensions),
                values: Vec::with_capacity(capacity),
                capacity,
            },
        }
    }

    /// Widen the bounds to include `location` and count it.
    fn extend(&mut self, location: &[T]) {
        let first = self.count == 0;
        for (d, &v) in location.iter().enumerate() {
            if first {
                self.min[d] = v;
                self.max[d] = v;
            } else if v.is_nan() || self.min[d].is_nan() {
                self.min[d] = T::nan();
                self.max[d] = T::nan();
            } else {
                if v < self.min[d] {
                    self.min[d] = v;
                }
                if v > self.max[d] {
                    self.max[d] = v;
                }
            }
        }
        self.count += 1;
    }
}

// ============================================================================
// NdTree
// ============================================================================

/// Dynamic k-d tree mapping nD locations to values.
#[derive(Debug, Clone)]
pub struct NdTree<T, V> {
    nodes: Vec<Node<T, V>>,
    dimensions: usize,
    bucket_size: usize,
    weights: Option<Vec<T>>,
}

impl<T: Float, V> NdTree<T, V> {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Create an empty tree for `dimensions`-dimensional locations.
    pub fn new(dimensions: usize) -> Self {
        Self::with_bucket_size(dimensions, BUCKET_SIZE)
    }

    /// Create an empty tree with a custom leaf capacity (at least 2).
    pub fn with_bucket_size(dimensions: usize, bucket_size: usize) -> Self {
        let dimensions = dimensions.max(1);
        let bucket_size = bucket_size.max(2);
        Self {
            nodes: vec![Node::leaf(None, dimensions, bucket_size)],
            dimensions,
            bucket_size,
            weights: None,
        }
    }

    /// Scale each dimension's extent by a weight when choosing split axes.
    pub fn with_weights(mut self, weights: Vec<T>) -> Result<Self, OpticsError> {
        if weights.len() != self.dimensions {
            return Err(OpticsError::InvalidParameter(format!(
                "expected {} split weights, got {}",
                self.dimensions,
                weights.len()
            )));
        }
        self.weights = Some(weights);
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Number of stored points.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes[0].count
    }

    /// True when the tree holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the locations.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Bounds `(min, max)` of all stored points.
    pub fn bounds(&self) -> (&[T], &[T]) {
        (&self.nodes[0].min, &self.nodes[0].max)
    }

    /// Number of arena nodes (stems and leaves).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Add a point.
    pub fn add(&mut self, location: &[T], value: V) -> Result<(), OpticsError> {
        self.insert(location, value, false).map(|_| ())
    }

    /// Add a point unless one with exactly the same coordinates is present.
    ///
    /// Coordinates compare equal when `a == b` (so `-0.0` matches `0.0`) or
    /// both are NaN. Returns `true` if the point was added.
    pub fn add_if_absent(&mut self, location: &[T], value: V) -> Result<bool, OpticsError> {
        self.insert(location, value, true)
    }

    fn insert(&mut self, location: &[T], value: V, check_dup: bool) -> Result<bool, OpticsError> {
        if location.len() != self.dimensions {
            return Err(OpticsError::InvalidParameter(format!(
                "location has {} dimensions, tree has {}",
                location.len(),
                self.dimensions
            )));
        }

        let leaf = self.find_leaf(location);

        if check_dup {
            if let NodeKind::Leaf { locations, .. } = &self.nodes[leaf].kind {
                let dup = locations
                    .chunks_exact(self.dimensions)
                    .any(|stored| same_location(stored, location));
                if dup {
                    return Ok(false);
                }
            }
        }

        // Update bounds and counts from the leaf up to the root.
        let mut cursor = Some(leaf);
        while let Some(i) = cursor {
            self.nodes[i].extend(location);
            cursor = self.nodes[i].parent;
        }

        let overflow = match &mut self.nodes[leaf].kind {
            NodeKind::Leaf {
                locations,
                values,
                capacity,
            } => {
                locations.extend_from_slice(location);
                values.push(value);
                values.len() > *capacity
            }
            NodeKind::Stem { .. } => false,
        };
        if overflow {
            self.split(leaf);
        }
        Ok(true)
    }

    /// Descend to the leaf that owns `location`.
    fn find_leaf(&self, location: &[T]) -> usize {
        let mut node = 0;
        loop {
            match &self.nodes[node].kind {
                NodeKind::Stem {
                    split_dim,
                    split_value,
                    left,
                    right,
                } => {
                    node = if location[*split_dim] > *split_value {
                        *right
                    } else {
                        *left
                    };
                }
                NodeKind::Leaf { .. } => return node,
            }
        }
    }

    /// Choose the split dimension: widest weighted extent, NaN as zero width.
    fn widest_dimension(&self, node: usize) -> Option<usize> {
        let n = &self.nodes[node];
        let mut best: Option<(usize, T)> = None;
        for d in 0..self.dimensions {
            let mut width = n.max[d] - n.min[d];
            if width.is_nan() {
                width = T::zero();
            }
            if let Some(w) = &self.weights {
                width = width * w[d];
                if width.is_nan() {
                    width = T::zero();
                }
            }
            if width > T::zero() && best.map_or(true, |(_, bw)| width > bw) {
                best = Some((d, width));
            }
        }
        best.map(|(d, _)| d)
    }

    /// Split value: midpoint of the extent with overflow and NaN guards.
    fn split_value(&self, node: usize, dim: usize) -> T {
        let mut lo = self.nodes[node].min[dim];
        let mut hi = self.nodes[node].max[dim];
        if lo == T::neg_infinity() {
            lo = T::min_value();
        }
        if hi == T::infinity() {
            hi = T::max_value();
        }
        let two = T::one() + T::one();
        let mut mid = lo / two + hi / two;
        if mid.is_nan() {
            mid = T::zero();
        }
        // A duplicated upper boundary would send every point right.
        if mid == hi {
            mid = lo;
        }
        mid
    }

    fn split(&mut self, node: usize) {
        let Some(dim) = self.widest_dimension(node) else {
            self.grow_bucket(node);
            return;
        };
        let split_value = self.split_value(node, dim);

        let dims = self.dimensions;
        let (locations, values, capacity) = match &mut self.nodes[node].kind {
            NodeKind::Leaf {
                locations,
                values,
                capacity,
            } => (mem::take(locations), mem::take(values), *capacity),
            NodeKind::Stem { .. } => return,
        };

        let goes_right = |loc: &[T]| loc[dim] > split_value;
        let n_right = locations
            .chunks_exact(dims)
            .filter(|loc| goes_right(*loc))
            .count();
        if n_right == 0 || n_right == values.len() {
            // Cannot separate the bucket; restore it with more room.
            if let NodeKind::Leaf {
                locations: l,
                values: v,
                capacity: c,
            } = &mut self.nodes[node].kind
            {
                *l = locations;
                *v = values;
                *c = capacity * 2;
            }
            return;
        }

        let mut left = Node::leaf(Some(node), dims, self.bucket_size);
        let mut right = Node::leaf(Some(node), dims, self.bucket_size);
        for (loc, value) in locations.chunks_exact(dims).zip(values) {
            let child = if goes_right(loc) { &mut right } else { &mut left };
            child.extend(loc);
            if let NodeKind::Leaf {
                locations: l,
                values: v,
                capacity: c,
            } = &mut child.kind
            {
                l.extend_from_slice(loc);
                v.push(value);
                if v.len() > *c {
                    *c = v.len();
                }
            }
        }

        let left_idx = self.nodes.len();
        let right_idx = left_idx + 1;
        self.nodes.push(left);
        self.nodes.push(right);
        self.nodes[node].kind = NodeKind::Stem {
            split_dim: dim,
            split_value,
            left: left_idx,
            right: right_idx,
        };
    }

    fn grow_bucket(&mut self, node: usize) {
        if let NodeKind::Leaf { capacity, .. } = &mut self.nodes[node].kind {
            *capacity *= 2;
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Find up to `count` nearest points and pass each `(value, distance)` to
    /// `consumer`, ascending by distance when `sorted`.
    ///
    /// Candidates whose distance is NaN are never retained. Returns the
    /// number of results delivered.
    pub fn nearest_neighbours<D, F>(
        &self,
        location: &[T],
        count: usize,
        sorted: bool,
        distance: &D,
        buffer: &mut NdSearchBuffer<T>,
        mut consumer: F,
    ) -> usize
    where
        D: PointDistance<T>,
        F: FnMut(&V, T),
    {
        self.search_knn(location, count, distance, buffer);
        let found = buffer.heap.len();
        if sorted {
            let mut ordered = mem::take(&mut buffer.heap).into_sorted_vec();
            for c in &ordered {
                consumer(self.value(c.node, c.slot), c.distance);
            }
            ordered.clear();
            buffer.heap = ordered.into();
        } else {
            for c in buffer.heap.drain() {
                consumer(self.value(c.node, c.slot), c.distance);
            }
        }
        found
    }

    /// Convenience k-nearest query returning `(value, distance)` pairs sorted
    /// by ascending distance.
    pub fn k_nearest<D: PointDistance<T>>(
        &self,
        location: &[T],
        count: usize,
        distance: &D,
    ) -> Vec<(&V, T)> {
        let mut buffer = NdSearchBuffer::new(count);
        self.search_knn(location, count, distance, &mut buffer);
        buffer
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (self.value(c.node, c.slot), c.distance))
            .collect()
    }

    /// Single closest point, or `None` when the tree is empty or every
    /// candidate distance is NaN.
    pub fn nearest_neighbour<D: PointDistance<T>>(
        &self,
        location: &[T],
        distance: &D,
    ) -> Option<(&V, T)> {
        let mut buffer = NdSearchBuffer::new(1);
        self.search_knn(location, 1, distance, &mut buffer);
        buffer
            .heap
            .peek()
            .map(|c| (self.value(c.node, c.slot), c.distance))
    }

    /// Pass every point within `range` (inclusive) to `consumer`.
    ///
    /// Returns the number of points found.
    pub fn find_neighbours<D, F>(
        &self,
        location: &[T],
        range: T,
        distance: &D,
        buffer: &mut NdSearchBuffer<T>,
        mut consumer: F,
    ) -> usize
    where
        D: PointDistance<T>,
        F: FnMut(&V, T),
    {
        buffer.clear();
        if self.is_empty() || range.is_nan() {
            return 0;
        }
        let dims = self.dimensions;
        let stack = &mut buffer.stack;
        let mut found = 0;
        stack.push((0, FRESH));

        while let Some(top) = stack.len().checked_sub(1) {
            let (node_idx, status) = stack[top];
            match &self.nodes[node_idx].kind {
                NodeKind::Leaf {
                    locations, values, ..
                } => {
                    for (loc, value) in locations.chunks_exact(dims).zip(values.iter()) {
                        let d = distance.distance(location, loc);
                        if d <= range {
                            consumer(value, d);
                            found += 1;
                        }
                    }
                    stack.pop();
                }
                NodeKind::Stem {
                    split_dim,
                    split_value,
                    left,
                    right,
                } => {
                    let (near, far) = if location[*split_dim] > *split_value {
                        (*right, *left)
                    } else {
                        (*left, *right)
                    };
                    let next = match status {
                        FRESH => {
                            stack[top].1 = NEAR_DONE;
                            near
                        }
                        NEAR_DONE => {
                            stack[top].1 = BOTH_DONE;
                            far
                        }
                        _ => {
                            stack.pop();
                            continue;
                        }
                    };
                    let child = &self.nodes[next];
                    if child.count > 0
                        && distance.distance_to_bounds(location, &child.min, &child.max) <= range
                    {
                        stack.push((next, FRESH));
                    }
                }
            }
        }
        found
    }

    /// Core k-nearest traversal; leaves the retained candidates in `buffer.heap`.
    fn search_knn<D: PointDistance<T>>(
        &self,
        location: &[T],
        count: usize,
        distance: &D,
        buffer: &mut NdSearchBuffer<T>,
    ) {
        buffer.clear();
        if count == 0 || self.is_empty() {
            return;
        }
        let dims = self.dimensions;
        let heap = &mut buffer.heap;
        let stack = &mut buffer.stack;
        stack.push((0, FRESH));

        while let Some(top) = stack.len().checked_sub(1) {
            let (node_idx, status) = stack[top];
            match &self.nodes[node_idx].kind {
                NodeKind::Leaf { locations, .. } => {
                    for (slot, loc) in locations.chunks_exact(dims).enumerate() {
                        let d = distance.distance(location, loc);
                        if d.is_nan() {
                            continue;
                        }
                        if heap.len() < count {
                            heap.push(Candidate {
                                distance: d,
                                node: node_idx,
                                slot,
                            });
                        } else if let Some(mut worst) = heap.peek_mut() {
                            if d < worst.distance {
                                *worst = Candidate {
                                    distance: d,
                                    node: node_idx,
                                    slot,
                                };
                            }
                        }
                    }
                    stack.pop();
                }
                NodeKind::Stem {
                    split_dim,
                    split_value,
                    left,
                    right,
                } => match status {
                    FRESH => {
                        stack[top].1 = NEAR_DONE;
                        let near = if location[*split_dim] > *split_value {
                            *right
                        } else {
                            *left
                        };
                        stack.push((near, FRESH));
                    }
                    NEAR_DONE => {
                        stack[top].1 = BOTH_DONE;
                        let far = if location[*split_dim] > *split_value {
                            *left
                        } else {
                            *right
                        };
                        let child = &self.nodes[far];
                        if child.count == 0 {
                            continue;
                        }
                        let worth_visiting = heap.len() < count
                            || heap.peek().map_or(true, |worst| {
                                distance.distance_to_bounds(location, &child.min, &child.max)
                                    < worst.distance
                            });
                        if worth_visiting {
                            stack.push((far, FRESH));
                        }
                    }
                    _ => {
                        stack.pop();
                    }
                },
            }
        }
    }

    #[inline]
    fn value(&self, node: usize, slot: usize) -> &V {
        match &self.nodes[node].kind {
            NodeKind::Leaf { values, .. } => &values[slot],
            NodeKind::Stem { .. } => unreachable!("candidates always reference leaves"),
        }
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Check the structural invariants: stem counts equal the sum of their
    /// children and every leaf holds exactly `count` points.
    pub fn is_consistent(&self) -> bool {
        self.nodes.iter().all(|n| match &n.kind {
            NodeKind::Leaf { values, .. } => values.len() == n.count,
            NodeKind::Stem { left, right, .. } => {
                self.nodes[*left].count + self.nodes[*right].count == n.count
                    && self.nodes[*left].count > 0
                    && self.nodes[*right].count > 0
            }
        })
    }
}

/// Exact coordinate equality (`-0.0 == 0.0`, NaN matches NaN).
#[inline]
fn same_location<T: Float>(a: &[T], b: &[T]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| x == y || (x.is_nan() && y.is_nan()))
}
