//! DBSCAN flat clustering.
//!
//! ## Purpose
//!
//! This module assigns cluster labels by breadth-first expansion from core
//! points. A point with at least `min_points` neighbours (itself included)
//! starts or extends a cluster; every neighbour of a core point joins that
//! cluster; points reached by no core point stay noise (label 0).
//!
//! ## Design notes
//!
//! * **FIFO**: Unlike OPTICS there is no reachability ordering, so a plain
//!   `VecDeque` drives the expansion.
//! * **Cheap core test**: `MoleculeSpace::is_core` decides core status first
//!   (inner-radial answers from cell sizes); the full neighbour list is only
//!   fetched for core points.
//! * **Final labels**: Records are emitted in evaluation order and carry the
//!   label a point ends the run with, so a point first seen as noise and
//!   later claimed as a border point reports its cluster.
//!
//! ## Invariants
//!
//! * Cluster ids are `1..=cluster_count` in order of discovery.
//! * Every point is evaluated exactly once.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::VecDeque;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

use crate::algorithms::optics::PROGRESS_STRIDE;
use crate::index::MoleculeSpace;
use crate::primitives::buffer::Neighbourhood;
use crate::primitives::errors::OpticsError;
use crate::primitives::molecule::Molecule;
use crate::primitives::progress::Tracker;

/// One DBSCAN evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbscanRecord {
    /// Point id (input position).
    pub id: usize,
    /// Final cluster label (0 = noise).
    pub cluster_id: usize,
    /// Neighbours found when the point was evaluated (itself included).
    pub neighbour_count: usize,
}

/// Scratch storage reused across DBSCAN runs.
#[derive(Debug, Clone)]
pub struct DbscanBuffer<T> {
    /// Neighbour query output.
    pub neighbourhood: Neighbourhood<T>,
    /// Work queue.
    pub queue: VecDeque<usize>,
}

impl<T> DbscanBuffer<T> {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self {
            neighbourhood: Neighbourhood::new(),
            queue: VecDeque::new(),
        }
    }
}

impl<T> Default for DbscanBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Label every point and return the records in evaluation order together
/// with the number of clusters.
pub fn run_dbscan<T: Float>(
    space: &dyn MoleculeSpace<T>,
    molecules: &mut [Molecule<T>],
    min_points: usize,
    buffer: &mut DbscanBuffer<T>,
    tracker: &dyn Tracker,
) -> Result<(Vec<DbscanRecord>, usize), OpticsError> {
    let n = molecules.len();
    let min_points = min_points.max(1);
    let mut records = Vec::with_capacity(n);
    let mut clusters = 0;
    buffer.queue.clear();

    for start in 0..n {
        if molecules[start].processed {
            continue;
        }
        if !evaluate(space, molecules, start, min_points, buffer, &mut records) {
            check(tracker, &records, n)?;
            continue;
        }
        check(tracker, &records, n)?;

        clusters += 1;
        molecules[start].cluster_id = clusters;
        claim(molecules, clusters, buffer);

        while let Some(id) = buffer.queue.pop_front() {
            let core = evaluate(space, molecules, id, min_points, buffer, &mut records);
            check(tracker, &records, n)?;
            if core {
                claim(molecules, clusters, buffer);
            }
        }
    }

    for record in &mut records {
        record.cluster_id = molecules[record.id].cluster_id;
    }
    tracker.progress(n, n);
    Ok((records, clusters))
}

/// Mark `id` processed and record its neighbour count. For core points the
/// full neighbourhood is left in the buffer.
fn evaluate<T: Float>(
    space: &dyn MoleculeSpace<T>,
    molecules: &mut [Molecule<T>],
    id: usize,
    min_points: usize,
    buffer: &mut DbscanBuffer<T>,
    records: &mut Vec<DbscanRecord>,
) -> bool {
    molecules[id].processed = true;
    let core = space.is_core(id, min_points);
    let neighbour_count = if core {
        space.find_neighbours(id, &mut buffer.neighbourhood);
        buffer.neighbourhood.len()
    } else {
        space.count_neighbours(id, usize::MAX)
    };
    records.push(DbscanRecord {
        id,
        cluster_id: 0,
        neighbour_count,
    });
    core
}

/// Label unassigned neighbours in the buffer and queue the unprocessed ones.
fn claim<T>(molecules: &mut [Molecule<T>], cluster: usize, buffer: &mut DbscanBuffer<T>) {
    for &other in buffer.neighbourhood.indices.iter() {
        let m = &mut molecules[other];
        if m.cluster_id != 0 {
            continue;
        }
        m.cluster_id = cluster;
        if !m.processed {
            buffer.queue.push_back(other);
        }
    }
}

#[inline]
fn check(tracker: &dyn Tracker, records: &[DbscanRecord], n: usize) -> Result<(), OpticsError> {
    if tracker.is_cancelled() {
        return Err(OpticsError::Aborted);
    }
    if records.len() % PROGRESS_STRIDE == 0 {
        tracker.progress(records.len(), n);
    }
    Ok(())
}
