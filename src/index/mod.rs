//! Layer 3: Index
//!
//! # Purpose
//!
//! This layer provides the interchangeable neighbour-search strategies over
//! 2D point sets. Given a generating distance, every variant returns all
//! points within that distance of a query point (the query point included):
//! - `grid`: uniform cell grid, exact distance check on every candidate
//! - `radial`: grid plus a per-offset table of cells that lie wholly inside
//!   or wholly outside the generating circle
//! - `radial` (inner variant): radial cells ordered inner-first with an
//!   early-exit "at least `min_points`" test for DBSCAN
//! - `projected`: approximate neighbourhoods from random projections
//!   (FastOPTICS only, no generating distance)
//!
//! The grid-family variants differ only in how they prune, never in which
//! points they return. Choosing between them is a performance heuristic.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Index ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(feature = "std")]
use std::boxed::Box;

use core::f64::consts::PI;
use num_traits::Float;

use crate::math::order_statistic::KthSmallest;
use crate::primitives::buffer::Neighbourhood;
use crate::primitives::errors::OpticsError;

/// Uniform grid variant.
pub mod grid;

/// Random-projection neighbourhoods for FastOPTICS.
pub mod projected;

/// Radial and inner-radial variants.
pub mod radial;

use grid::GridSpace;
use radial::{InnerRadialSpace, RadialSpace};

// ============================================================================
// Constants
// ============================================================================

/// Expected points per generating circle above which the radial variant is used.
pub const DEFAULT_RADIAL_THRESHOLD: f64 = 20.0;

/// Expected points per generating circle above which DBSCAN uses the inner-radial variant.
pub const DEFAULT_INNER_THRESHOLD: f64 = 50.0;

/// Target expected points per grid cell when choosing the resolution.
pub const TARGET_POINTS_PER_CELL: f64 = 4.0;

/// Upper limit on grid cells per generating distance.
pub const MAX_RESOLUTION: usize = 8;

// ============================================================================
// Strategy selection
// ============================================================================

/// Neighbour-search strategy for generating-distance queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpaceStrategy {
    /// Choose from the density estimate.
    #[default]
    Auto,

    /// Uniform grid with exact checks.
    Grid,

    /// Grid with inside/outside circle classification of cells (circular processing).
    Radial,

    /// Radial grid with inner-first ordering and early-exit core test.
    InnerRadial,

    /// Random-projection neighbourhoods. Built by FastOPTICS only.
    Projected,
}

/// Which algorithm is asking for an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusteringAlgorithm {
    /// OPTICS cluster ordering.
    Optics,
    /// DBSCAN flat clustering.
    Dbscan,
}

/// Density thresholds used by [`select_strategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityThresholds {
    /// Expected points per circle above which radial processing is chosen.
    pub radial: f64,
    /// Expected points per circle above which DBSCAN uses inner-radial processing.
    pub inner: f64,
}

impl Default for DensityThresholds {
    fn default() -> Self {
        Self {
            radial: DEFAULT_RADIAL_THRESHOLD,
            inner: DEFAULT_INNER_THRESHOLD,
        }
    }
}

/// Expected number of points inside a circle of radius `r` assuming uniform
/// density over `area`: `π·r²·n / area`.
///
/// A zero or non-finite area means every point is expected inside.
pub fn expected_points_in_circle<T: Float>(n: usize, r: T, area: T) -> f64 {
    let r = r.to_f64().unwrap_or(0.0);
    let area = area.to_f64().unwrap_or(0.0);
    if !(area > 0.0) || !area.is_finite() {
        return n as f64;
    }
    PI * r * r * n as f64 / area
}

/// Resolve the strategy to build. Explicit choices are honoured; `Auto`
/// picks from the density estimate.
pub fn select_strategy(
    requested: SpaceStrategy,
    algorithm: ClusteringAlgorithm,
    expected_in_circle: f64,
    thresholds: &DensityThresholds,
) -> SpaceStrategy {
    if requested != SpaceStrategy::Auto {
        return requested;
    }
    match algorithm {
        ClusteringAlgorithm::Dbscan if expected_in_circle > thresholds.inner => {
            SpaceStrategy::InnerRadial
        }
        _ if expected_in_circle > thresholds.radial => SpaceStrategy::Radial,
        _ => SpaceStrategy::Grid,
    }
}

/// Grid cells per generating distance so that each cell expects roughly
/// [`TARGET_POINTS_PER_CELL`] points, in `[1, MAX_RESOLUTION]`.
pub fn auto_resolution(expected_in_circle: f64) -> usize {
    if !(expected_in_circle > 0.0) || !expected_in_circle.is_finite() {
        return 1;
    }
    // A cell of side r/res holds expected_in_circle / (π res²) points.
    let res = (expected_in_circle / (PI * TARGET_POINTS_PER_CELL)).sqrt().ceil();
    (res as usize).clamp(1, MAX_RESOLUTION)
}

// ============================================================================
// Cache decision
// ============================================================================

/// Parameters that identify a built index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceKey<T> {
    /// Resolved strategy (never `Auto`).
    pub strategy: SpaceStrategy,
    /// Generating distance the index was built for.
    pub generating_distance: T,
    /// Cells per generating distance.
    pub resolution: usize,
}

/// Whether an index built for `cached` can serve a request for `requested`.
///
/// Returns `true` when caching is disabled, nothing is cached, or any of the
/// strategy, generating distance or resolution differ.
pub fn needs_rebuild<T: Float>(
    cache_enabled: bool,
    cached: Option<&SpaceKey<T>>,
    requested: &SpaceKey<T>,
) -> bool {
    match cached {
        Some(key) if cache_enabled => key != requested,
        _ => true,
    }
}

// ============================================================================
// MoleculeSpace trait
// ============================================================================

/// A neighbour index built for one generating distance.
///
/// Distances written by `find_neighbours_with_distances` are squared.
pub trait MoleculeSpace<T: Float>: Send + Sync {
    /// The strategy this index implements.
    fn strategy(&self) -> SpaceStrategy;

    /// The generating distance the index was built for.
    fn generating_distance(&self) -> T;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// True when no points are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect every point within the generating distance of `index`.
    /// Only `out.indices` is filled.
    fn find_neighbours(&self, index: usize, out: &mut Neighbourhood<T>);

    /// Like `find_neighbours`, also recording the squared distance to each.
    fn find_neighbours_with_distances(&self, index: usize, out: &mut Neighbourhood<T>);

    /// Count neighbours of `index`, stopping once `limit` is reached.
    fn count_neighbours(&self, index: usize, limit: usize) -> usize;

    /// Whether `index` has at least `min_points` neighbours (itself included).
    fn is_core(&self, index: usize, min_points: usize) -> bool {
        self.count_neighbours(index, min_points) >= min_points
    }

    /// Core distance of `index` given its neighbourhood with squared distances.
    ///
    /// The default is the `min_points`-th smallest distance, undefined when
    /// the neighbourhood is smaller than `min_points`.
    fn core_distance(
        &self,
        _index: usize,
        neighbourhood: &Neighbourhood<T>,
        min_points: usize,
        heap: &mut KthSmallest<T>,
    ) -> Option<T> {
        heap.kth_smallest(min_points, &neighbourhood.distances)
            .map(Float::sqrt)
    }
}

/// Build the index for a resolved strategy.
///
/// `Auto` is treated as `Grid`. `Projected` has no generating distance and
/// is rejected.
pub fn build_space<T: Float + Send + Sync + 'static>(
    strategy: SpaceStrategy,
    x: &[T],
    y: &[T],
    generating_distance: T,
    resolution: usize,
) -> Result<Box<dyn MoleculeSpace<T>>, OpticsError> {
    Ok(match strategy {
        SpaceStrategy::Auto | SpaceStrategy::Grid => {
            Box::new(GridSpace::new(x, y, generating_distance, resolution))
        }
        SpaceStrategy::Radial => Box::new(RadialSpace::new(x, y, generating_distance, resolution)),
        SpaceStrategy::InnerRadial => Box::new(InnerRadialSpace::new(
            x,
            y,
            generating_distance,
            resolution,
        )),
        SpaceStrategy::Projected => {
            return Err(OpticsError::InvalidParameter(
                "projected space cannot be built for a generating distance".into(),
            ))
        }
    })
}
