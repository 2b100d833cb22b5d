//! Random-projection neighbourhoods for FastOPTICS.
//!
//! ## Purpose
//!
//! This module approximates density neighbourhoods without a generating
//! distance. Points are projected onto random unit directions; each sorted
//! projection is split at its midpoint recursively until a subset would
//! drop below `2 * min_points`. Every leaf subset is an approximate
//! neighbourhood for all of its members.
//!
//! ## Design notes
//!
//! * **Task accumulators**: `project_directions` processes a disjoint chunk
//!   of directions and writes only to its own `ProjectionAccumulator`. The
//!   caller merges accumulators in task order with `merge`.
//! * **Summed densities**: Each leaf adds the pairwise distances of its
//!   members to per-point sums and counts. The final core distance of a
//!   point is `sum / count`, the average distance within its neighbourhoods.
//! * **Sorted unions**: After merging, each neighbour list is sorted and
//!   deduplicated, so the union is independent of the task split.
//!
//! ## Invariants
//!
//! * Every neighbour list contains the point itself.
//! * A point whose union has fewer than `min_points` members has no core
//!   distance.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::cmp::Ordering;
use core::f64::consts::TAU;
use num_traits::Float;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::index::{MoleculeSpace, SpaceStrategy};
use crate::math::order_statistic::KthSmallest;
use crate::primitives::buffer::Neighbourhood;
use crate::primitives::errors::OpticsError;
use crate::primitives::progress::Tracker;

/// Projections per `⌈log2 n⌉` when the count is chosen automatically.
pub const PROJECTIONS_PER_LOG2: usize = 10;

/// Default number of random directions for `n` points: `10·⌈log2 n⌉`, at least one.
pub fn default_projections(n: usize) -> usize {
    let log2 = if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    };
    (PROJECTIONS_PER_LOG2 * log2).max(1)
}

/// Draw `count` unit directions uniformly on the circle.
pub fn random_directions<T: Float>(count: usize, seed: u64) -> Vec<[T; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let angle = T::from(rng.random_range(0.0..TAU)).unwrap_or_else(T::zero);
            [angle.cos(), angle.sin()]
        })
        .collect()
}

// ============================================================================
// Accumulator
// ============================================================================

/// Per-task neighbourhood and density sums.
#[derive(Debug, Clone)]
pub struct ProjectionAccumulator<T> {
    /// Sum of distances to leaf-mates, per point.
    pub sums: Vec<T>,
    /// Number of distances summed, per point.
    pub counts: Vec<usize>,
    /// Leaf-mates per point (may contain duplicates until `finish`).
    pub neighbours: Vec<Vec<usize>>,
}

impl<T: Float> ProjectionAccumulator<T> {
    /// Empty accumulator for `n` points.
    pub fn new(n: usize) -> Self {
        Self {
            sums: vec![T::zero(); n],
            counts: vec![0; n],
            neighbours: vec![Vec::new(); n],
        }
    }

    /// Add another task's accumulator into this one.
    pub fn merge(&mut self, other: ProjectionAccumulator<T>) {
        for (s, o) in self.sums.iter_mut().zip(other.sums) {
            *s = *s + o;
        }
        for (c, o) in self.counts.iter_mut().zip(other.counts) {
            *c += o;
        }
        for (list, mut o) in self.neighbours.iter_mut().zip(other.neighbours) {
            list.append(&mut o);
        }
    }

    /// Sort and deduplicate every neighbour list.
    pub fn dedup(&mut self) {
        for list in &mut self.neighbours {
            list.sort_unstable();
            list.dedup();
        }
    }

    fn add_leaf(&mut self, members: &[usize], x: &[T], y: &[T]) {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                let d = (x[i] - x[j]).hypot(y[i] - y[j]);
                self.sums[i] = self.sums[i] + d;
                self.sums[j] = self.sums[j] + d;
                self.counts[i] += 1;
                self.counts[j] += 1;
            }
            self.neighbours[i].extend_from_slice(members);
        }
    }
}

/// Project onto each direction, split, and accumulate leaf neighbourhoods.
///
/// Returns `Aborted` if the tracker is cancelled when the task starts.
pub fn project_directions<T: Float>(
    x: &[T],
    y: &[T],
    directions: &[[T; 2]],
    min_points: usize,
    tracker: &dyn Tracker,
) -> Result<ProjectionAccumulator<T>, OpticsError> {
    if tracker.is_cancelled() {
        return Err(OpticsError::Aborted);
    }
    let n = x.len();
    let min_split = min_points.max(1).saturating_mul(2);
    let mut acc = ProjectionAccumulator::new(n);
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut projected: Vec<T> = vec![T::zero(); n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for &[dx, dy] in directions {
        for i in 0..n {
            projected[i] = x[i] * dx + y[i] * dy;
        }
        order.clear();
        order.extend(0..n);
        order.sort_by(|&a, &b| {
            projected[a]
                .partial_cmp(&projected[b])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        stack.clear();
        stack.push((0, n));
        while let Some((start, end)) = stack.pop() {
            let len = end - start;
            if len >= min_split {
                let mid = start + len / 2;
                stack.push((mid, end));
                stack.push((start, mid));
            } else if len > 0 {
                acc.add_leaf(&order[start..end], x, y);
            }
        }
    }
    Ok(acc)
}

// ============================================================================
// Projected space
// ============================================================================

/// Merged random-projection neighbourhoods.
#[derive(Debug, Clone)]
pub struct ProjectedSpace<T> {
    x: Vec<T>,
    y: Vec<T>,
    neighbours: Vec<Vec<usize>>,
    average: Vec<Option<T>>,
}

impl<T: Float> ProjectedSpace<T> {
    /// Finalise merged accumulators into neighbourhoods and average distances.
    pub fn from_accumulator(x: &[T], y: &[T], mut acc: ProjectionAccumulator<T>) -> Self {
        acc.dedup();
        let average = acc
            .sums
            .iter()
            .zip(acc.counts.iter())
            .map(|(&s, &c)| {
                if c == 0 {
                    None
                } else {
                    T::from(c).map(|c| s / c)
                }
            })
            .collect();
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
            neighbours: acc.neighbours,
            average,
        }
    }

    /// Build sequentially on the calling thread.
    pub fn build(
        x: &[T],
        y: &[T],
        directions: &[[T; 2]],
        min_points: usize,
        tracker: &dyn Tracker,
    ) -> Result<Self, OpticsError> {
        let acc = project_directions(x, y, directions, min_points, tracker)?;
        Ok(Self::from_accumulator(x, y, acc))
    }

    /// Union neighbourhood of `index` (sorted, self included).
    pub fn neighbours_of(&self, index: usize) -> &[usize] {
        &self.neighbours[index]
    }

    /// Average leaf distance of `index`, if it was in any leaf with another point.
    pub fn average_distance(&self, index: usize) -> Option<T> {
        self.average[index]
    }
}

impl<T: Float + Send + Sync> MoleculeSpace<T> for ProjectedSpace<T> {
    fn strategy(&self) -> SpaceStrategy {
        SpaceStrategy::Projected
    }

    fn generating_distance(&self) -> T {
        T::infinity()
    }

    fn len(&self) -> usize {
        self.x.len()
    }

    fn find_neighbours(&self, index: usize, out: &mut Neighbourhood<T>) {
        out.clear();
        out.indices.extend_from_slice(&self.neighbours[index]);
    }

    fn find_neighbours_with_distances(&self, index: usize, out: &mut Neighbourhood<T>) {
        out.clear();
        let (qx, qy) = (self.x[index], self.y[index]);
        for &j in &self.neighbours[index] {
            let dx = self.x[j] - qx;
            let dy = self.y[j] - qy;
            out.push(j, dx * dx + dy * dy);
        }
    }

    fn count_neighbours(&self, index: usize, _limit: usize) -> usize {
        self.neighbours[index].len()
    }

    fn core_distance(
        &self,
        index: usize,
        neighbourhood: &Neighbourhood<T>,
        min_points: usize,
        _heap: &mut KthSmallest<T>,
    ) -> Option<T> {
        if neighbourhood.len() < min_points.max(1) {
            return None;
        }
        // A single-member union has no leaf-mates; its density is zero.
        Some(self.average[index].unwrap_or_else(T::zero))
    }
}
