//! Workspace for reusable clustering buffers.
//!
//! The engine owns one workspace and lends its parts to the algorithms, so
//! repeated runs reuse the molecule array, neighbour buffers and queues
//! instead of reallocating them.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

use crate::algorithms::dbscan::DbscanBuffer;
use crate::algorithms::optics::OpticsBuffer;
use crate::algorithms::seeds::SeedQueue;
use crate::primitives::molecule::{reset_all, Molecule};

/// Pre-allocated state shared by every run of one engine.
#[derive(Debug, Clone)]
pub struct ClusteringWorkspace<T> {
    /// Per-point run state, indexed by id.
    pub molecules: Vec<Molecule<T>>,
    /// OPTICS and FastOPTICS buffers.
    pub optics: OpticsBuffer<T>,
    /// DBSCAN buffers.
    pub dbscan: DbscanBuffer<T>,
}

impl<T: Float> ClusteringWorkspace<T> {
    /// Create a workspace for the given points.
    pub fn new(x: &[T], y: &[T], seeds: SeedQueue) -> Self {
        let molecules = x
            .iter()
            .zip(y.iter())
            .enumerate()
            .map(|(id, (&xi, &yi))| Molecule::new(id, xi, yi))
            .collect();
        Self {
            molecules,
            optics: OpticsBuffer::new(seeds),
            dbscan: DbscanBuffer::new(),
        }
    }

    /// Clear all per-run state before a new run.
    ///
    /// Does not deallocate, only resets logical lengths.
    pub fn reset(&mut self) {
        self.optics.seeds.clear(&mut self.molecules);
        reset_all(&mut self.molecules);
        self.optics.neighbourhood.clear();
        self.dbscan.neighbourhood.clear();
        self.dbscan.queue.clear();
    }
}
