//! OPTICS cluster ordering.
//!
//! ## Purpose
//!
//! This module walks the points in density-reachability order and records,
//! for each point, its core distance and the reachability distance under
//! which it was reached. The result is a permutation of all points from
//! which flat clusterings at any distance up to the generating distance can
//! be extracted.
//!
//! ## Design notes
//!
//! * **Index agnostic**: Expansion runs over any `MoleculeSpace`. The space
//!   supplies the neighbourhood and the core distance policy (k-th smallest
//!   distance for the grid family, average leaf distance for projected).
//! * **Strict improvement**: A queued point is repositioned only when its
//!   new reachability distance is strictly smaller.
//! * **Cooperative cancellation**: The tracker is polled after every
//!   appended record. A cancelled run returns `Aborted` and no records.
//!
//! ## Key concepts
//!
//! * **Reachability**: `max(core(p), d(p, q))` for neighbour `q` of core
//!   point `p`.
//! * **Segment start**: A record with undefined reachability; the point was
//!   not density-reachable from anything processed before it.
//!
//! ## Invariants
//!
//! * Every point appears in the output exactly once.
//! * Molecules must be reset before a run.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

use crate::algorithms::seeds::SeedQueue;
use crate::index::MoleculeSpace;
use crate::math::order_statistic::KthSmallest;
use crate::primitives::buffer::Neighbourhood;
use crate::primitives::errors::OpticsError;
use crate::primitives::molecule::{Molecule, NOT_QUEUED};
use crate::primitives::progress::Tracker;

/// Points between progress reports.
pub const PROGRESS_STRIDE: usize = 256;

// ============================================================================
// Output record
// ============================================================================

/// One entry of the OPTICS cluster order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticsRecord<T> {
    /// Point id (input position).
    pub id: usize,
    /// Reachability distance when the point was processed; `None` starts a segment.
    pub reachability: Option<T>,
    /// Core distance; `None` for non-core points.
    pub core_distance: Option<T>,
    /// Point the reachability distance was derived from.
    pub predecessor: Option<usize>,
}

impl<T: Float> OpticsRecord<T> {
    fn from_molecule(m: &Molecule<T>) -> Self {
        Self {
            id: m.id,
            reachability: m.reachability_distance,
            core_distance: m.core_distance,
            predecessor: m.predecessor,
        }
    }

    /// Whether the point is a core point.
    #[inline]
    pub fn is_core(&self) -> bool {
        self.core_distance.is_some()
    }
}

// ============================================================================
// Expansion buffers
// ============================================================================

/// Scratch storage reused across OPTICS runs.
#[derive(Debug, Clone)]
pub struct OpticsBuffer<T> {
    /// Neighbour query output.
    pub neighbourhood: Neighbourhood<T>,
    /// Order-statistic heap for core distances.
    pub heap: KthSmallest<T>,
    /// Seed queue.
    pub seeds: SeedQueue,
}

impl<T: Float> OpticsBuffer<T> {
    /// Create buffers with the given seed queue.
    pub fn new(seeds: SeedQueue) -> Self {
        Self {
            neighbourhood: Neighbourhood::new(),
            heap: KthSmallest::new(),
            seeds,
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Compute the OPTICS cluster order.
pub fn run_optics<T: Float>(
    space: &dyn MoleculeSpace<T>,
    molecules: &mut [Molecule<T>],
    min_points: usize,
    buffer: &mut OpticsBuffer<T>,
    tracker: &dyn Tracker,
) -> Result<Vec<OpticsRecord<T>>, OpticsError> {
    let n = molecules.len();
    let min_points = min_points.max(1);
    let mut order = Vec::with_capacity(n);
    buffer.seeds.clear(molecules);

    for start in 0..n {
        if molecules[start].processed {
            continue;
        }
        let mut current = Some(start);
        while let Some(id) = current {
            process(space, molecules, id, min_points, buffer);
            order.push(OpticsRecord::from_molecule(&molecules[id]));
            if tracker.is_cancelled() {
                buffer.seeds.clear(molecules);
                return Err(OpticsError::Aborted);
            }
            if order.len() % PROGRESS_STRIDE == 0 {
                tracker.progress(order.len(), n);
            }
            if molecules[id].is_core() {
                update_seeds(molecules, id, buffer);
            }
            current = buffer.seeds.pop(molecules);
        }
    }
    tracker.progress(n, n);
    Ok(order)
}

/// Query neighbours of `id`, mark it processed and set its core distance.
fn process<T: Float>(
    space: &dyn MoleculeSpace<T>,
    molecules: &mut [Molecule<T>],
    id: usize,
    min_points: usize,
    buffer: &mut OpticsBuffer<T>,
) {
    space.find_neighbours_with_distances(id, &mut buffer.neighbourhood);
    let core = space.core_distance(id, &buffer.neighbourhood, min_points, &mut buffer.heap);
    let m = &mut molecules[id];
    m.processed = true;
    m.core_distance = core;
}

/// Offer every unprocessed neighbour of core point `id` to the seed queue.
fn update_seeds<T: Float>(molecules: &mut [Molecule<T>], id: usize, buffer: &mut OpticsBuffer<T>) {
    let Some(core) = molecules[id].core_distance else {
        return;
    };
    let OpticsBuffer {
        neighbourhood,
        seeds,
        ..
    } = buffer;
    for (other, &d2) in neighbourhood.iter() {
        if molecules[other].processed {
            continue;
        }
        let reach = core.max(d2.sqrt());
        let previous = molecules[other].reachability_distance;
        if previous.is_some_and(|old| reach >= old) {
            continue;
        }
        let m = &mut molecules[other];
        m.reachability_distance = Some(reach);
        m.predecessor = Some(id);
        if m.queue_index == NOT_QUEUED {
            seeds.push(other, molecules);
        } else {
            seeds.move_up(other, molecules);
        }
    }
}
