//! Per-point state for a single clustering run.
//!
//! ## Purpose
//!
//! A `Molecule` couples an input coordinate with the scratch fields that
//! OPTICS, DBSCAN and FastOPTICS mutate while they walk the data: the
//! processed flag, core and reachability distances, predecessor, cluster id
//! and the slot the point currently occupies in the seed queue.
//!
//! ## Invariants
//!
//! * `id` equals the input position and never changes.
//! * `core_distance` is assigned at most once per run.
//! * `reachability_distance` only ever decreases after its first assignment.
//! * `None` is the undefined distance; every defined distance is non-negative.
//! * `cluster_id == 0` means unassigned or noise.

/// Sentinel for "not currently in the seed queue".
pub const NOT_QUEUED: usize = usize::MAX;

/// A 2D point with the mutable state of one clustering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Molecule<T> {
    /// Stable identity (input order).
    pub id: usize,
    /// X coordinate.
    pub x: T,
    /// Y coordinate.
    pub y: T,
    /// Set once the point has been expanded.
    pub processed: bool,
    /// Core distance, undefined for non-core points.
    pub core_distance: Option<T>,
    /// Best reachability distance seen so far.
    pub reachability_distance: Option<T>,
    /// Point from which the current reachability distance was derived.
    pub predecessor: Option<usize>,
    /// Cluster label (0 = noise / unassigned).
    pub cluster_id: usize,
    /// Position inside the seed heap, or [`NOT_QUEUED`].
    pub queue_index: usize,
}

impl<T> Molecule<T> {
    /// Create a fresh molecule.
    pub fn new(id: usize, x: T, y: T) -> Self {
        Self {
            id,
            x,
            y,
            processed: false,
            core_distance: None,
            reachability_distance: None,
            predecessor: None,
            cluster_id: 0,
            queue_index: NOT_QUEUED,
        }
    }

    /// Clear all run state, keeping identity and coordinates.
    #[inline]
    pub fn reset(&mut self) {
        self.processed = false;
        self.core_distance = None;
        self.reachability_distance = None;
        self.predecessor = None;
        self.cluster_id = 0;
        self.queue_index = NOT_QUEUED;
    }

    /// Whether the point has a defined core distance.
    #[inline]
    pub fn is_core(&self) -> bool {
        self.core_distance.is_some()
    }
}

/// Reset the run state of every molecule.
pub fn reset_all<T>(molecules: &mut [Molecule<T>]) {
    for m in molecules.iter_mut() {
        m.reset();
    }
}
