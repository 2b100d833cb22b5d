//! FastOPTICS: OPTICS over random-projection neighbourhoods.
//!
//! ## Purpose
//!
//! This module builds the projected neighbour space; the engine then runs
//! the ordinary OPTICS expansion over it. Neighbourhoods come from random
//! projections instead of a generating-distance circle, and the core distance is the
//! average distance within those neighbourhoods.
//!
//! ## Design notes
//!
//! * **Two phases**: Projection is split into tasks, each owning a
//!   contiguous chunk of directions and its own accumulator. Tasks run on a
//!   `rayon` pool when the `std` feature is enabled and sequentially
//!   otherwise. Expansion is always sequential.
//! * **Join, not lock**: Task results are merged in task order after every
//!   task has finished.
//! * **Deterministic directions**: All directions are drawn up front from a
//!   single seeded `ChaCha8Rng`, so the neighbourhood unions do not depend on
//!   the number of tasks.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;
#[cfg(feature = "std")]
use rayon::prelude::*;

use crate::index::projected::{project_directions, ProjectedSpace, ProjectionAccumulator};
use crate::primitives::errors::OpticsError;
use crate::primitives::progress::Tracker;

/// Split `directions` into at most `tasks` contiguous, non-empty chunks.
pub fn partition_directions<T>(directions: &[[T; 2]], tasks: usize) -> Vec<&[[T; 2]]> {
    if directions.is_empty() {
        return Vec::new();
    }
    let tasks = tasks.clamp(1, directions.len());
    let chunk = directions.len().div_ceil(tasks);
    directions.chunks(chunk).collect()
}

/// Merge task results in task order. The first error wins.
pub fn merge_accumulators<T: Float>(
    n: usize,
    results: Vec<Result<ProjectionAccumulator<T>, OpticsError>>,
) -> Result<ProjectionAccumulator<T>, OpticsError> {
    let mut merged = ProjectionAccumulator::new(n);
    for result in results {
        merged.merge(result?);
    }
    Ok(merged)
}

/// Build the projected space on the calling thread, one task per chunk.
pub fn build_projected_sequential<T: Float>(
    x: &[T],
    y: &[T],
    directions: &[[T; 2]],
    tasks: usize,
    min_points: usize,
    tracker: &dyn Tracker,
) -> Result<ProjectedSpace<T>, OpticsError> {
    let results = partition_directions(directions, tasks)
        .into_iter()
        .map(|chunk| project_directions(x, y, chunk, min_points, tracker))
        .collect();
    let acc = merge_accumulators(x.len(), results)?;
    Ok(ProjectedSpace::from_accumulator(x, y, acc))
}

/// Build the projected space with one task per pool thread.
#[cfg(feature = "std")]
pub fn build_projected_parallel<T: Float + Send + Sync>(
    pool: &rayon::ThreadPool,
    x: &[T],
    y: &[T],
    directions: &[[T; 2]],
    min_points: usize,
    tracker: &dyn Tracker,
) -> Result<ProjectedSpace<T>, OpticsError> {
    let chunks = partition_directions(directions, pool.current_num_threads());
    let results: Vec<_> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| project_directions(x, y, chunk, min_points, tracker))
            .collect()
    });
    let acc = merge_accumulators(x.len(), results)?;
    Ok(ProjectedSpace::from_accumulator(x, y, acc))
}
