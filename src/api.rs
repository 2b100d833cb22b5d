//! High-level API for density-based clustering.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements
//! a fluent builder for the options that stay fixed across runs (index
//! strategy, thresholds, queue policy, seeds, worker pool, tracker) and
//! turns a point set into a `ClusteringEngine`.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Options and coordinates are validated when `.build()` is called.
//! * **Duplicate detection**: Setting an option twice is reported as an error.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`ClusteringBuilder`] via `Clustering::new()`.
//! 2. Chain configuration methods (`.space_strategy()`, `.tie_break()`, etc.).
//! 3. Call `.build(&x, &y)` to obtain an engine and run `optics`, `dbscan`,
//!    `fast_optics`, `k_distances` or `outlier_scores` on it.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::fmt::{self, Debug, Formatter};
use num_traits::Float;

// Internal dependencies
use crate::engine::executor::EngineConfig;
use crate::engine::validator::Validator;
use crate::index::DensityThresholds;

// Publicly re-exported types
pub use crate::algorithms::seeds::{QueueKind, TieBreak};
pub use crate::engine::executor::ClusteringEngine;
pub use crate::engine::output::{
    ClusterAssignment, DbscanResult, KDistances, OpticsResult, OutlierScores,
};
pub use crate::index::SpaceStrategy;
pub use crate::primitives::bounds::Rect;
pub use crate::primitives::errors::OpticsError;
pub use crate::primitives::progress::{LogTracker, NullTracker, Tracker};

/// Fluent builder for clustering engines.
#[derive(Clone)]
pub struct ClusteringBuilder<T> {
    /// Area used for density calibration.
    pub bounds: Option<Rect<T>>,

    /// Neighbour index strategy.
    pub space_strategy: Option<SpaceStrategy>,

    /// Grid cells per generating distance.
    pub resolution: Option<usize>,

    /// Expected points per circle above which radial processing is used.
    pub radial_threshold: Option<f64>,

    /// Expected points per circle above which DBSCAN uses inner-radial processing.
    pub inner_threshold: Option<f64>,

    /// Seed queue implementation.
    pub queue_kind: Option<QueueKind>,

    /// Tie-break for equal reachability distances.
    pub tie_break: Option<TieBreak>,

    /// Reuse the index across runs.
    pub cache: Option<bool>,

    /// FastOPTICS projection count.
    pub projections: Option<usize>,

    /// Random seed for FastOPTICS and k-distance sampling.
    pub seed: Option<u64>,

    /// Worker pool size.
    pub threads: Option<usize>,

    /// Progress and cancellation collaborator.
    pub tracker: Option<Arc<dyn Tracker>>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: Debug> Debug for ClusteringBuilder<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusteringBuilder")
            .field("bounds", &self.bounds)
            .field("space_strategy", &self.space_strategy)
            .field("resolution", &self.resolution)
            .field("radial_threshold", &self.radial_threshold)
            .field("inner_threshold", &self.inner_threshold)
            .field("queue_kind", &self.queue_kind)
            .field("tie_break", &self.tie_break)
            .field("cache", &self.cache)
            .field("projections", &self.projections)
            .field("seed", &self.seed)
            .field("threads", &self.threads)
            .field("tracker", &self.tracker.is_some())
            .finish()
    }
}

impl<T> Default for ClusteringBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ClusteringBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bounds: None,
            space_strategy: None,
            resolution: None,
            radial_threshold: None,
            inner_threshold: None,
            queue_kind: None,
            tie_break: None,
            cache: None,
            projections: None,
            seed: None,
            threads: None,
            tracker: None,
            duplicate_param: None,
        }
    }

    fn mark(&mut self, already_set: bool, name: &'static str) {
        if already_set {
            self.duplicate_param = Some(name);
        }
    }

    /// Set the area used for generating-distance calibration.
    pub fn bounds(mut self, bounds: Rect<T>) -> Self {
        self.mark(self.bounds.is_some(), "bounds");
        self.bounds = Some(bounds);
        self
    }

    /// Set the neighbour index strategy.
    pub fn space_strategy(mut self, strategy: SpaceStrategy) -> Self {
        self.mark(self.space_strategy.is_some(), "space_strategy");
        self.space_strategy = Some(strategy);
        self
    }

    /// Set the number of grid cells per generating distance.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.mark(self.resolution.is_some(), "resolution");
        self.resolution = Some(resolution);
        self
    }

    /// Set the radial processing threshold (expected points per circle).
    pub fn radial_threshold(mut self, threshold: f64) -> Self {
        self.mark(self.radial_threshold.is_some(), "radial_threshold");
        self.radial_threshold = Some(threshold);
        self
    }

    /// Set the inner-radial processing threshold for DBSCAN.
    pub fn inner_threshold(mut self, threshold: f64) -> Self {
        self.mark(self.inner_threshold.is_some(), "inner_threshold");
        self.inner_threshold = Some(threshold);
        self
    }

    /// Set the seed queue implementation.
    pub fn queue_kind(mut self, kind: QueueKind) -> Self {
        self.mark(self.queue_kind.is_some(), "queue_kind");
        self.queue_kind = Some(kind);
        self
    }

    /// Set the tie-break policy.
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.mark(self.tie_break.is_some(), "tie_break");
        self.tie_break = Some(tie_break);
        self
    }

    /// Enable or disable index caching.
    pub fn cache(mut self, cache: bool) -> Self {
        self.mark(self.cache.is_some(), "cache");
        self.cache = Some(cache);
        self
    }

    /// Set the number of FastOPTICS projections.
    pub fn projections(mut self, projections: usize) -> Self {
        self.mark(self.projections.is_some(), "projections");
        self.projections = Some(projections);
        self
    }

    /// Set the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.mark(self.seed.is_some(), "seed");
        self.seed = Some(seed);
        self
    }

    /// Set the worker pool size.
    pub fn threads(mut self, threads: usize) -> Self {
        self.mark(self.threads.is_some(), "threads");
        self.threads = Some(threads);
        self
    }

    /// Set the progress and cancellation collaborator.
    pub fn tracker<K: Tracker + 'static>(mut self, tracker: K) -> Self {
        self.mark(self.tracker.is_some(), "tracker");
        self.tracker = Some(Arc::new(tracker));
        self
    }
}

impl<T: Float + Debug + Send + Sync + 'static> ClusteringBuilder<T> {
    /// Validate the configuration and the points, and create an engine.
    pub fn build(self, x: &[T], y: &[T]) -> Result<ClusteringEngine<T>, OpticsError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        Validator::validate_inputs(x, y)?;
        if let Some(bounds) = &self.bounds {
            Validator::validate_bounds(bounds)?;
        }

        let mut thresholds = DensityThresholds::default();
        if let Some(t) = self.radial_threshold {
            Validator::validate_threshold(t, "radial_threshold")?;
            thresholds.radial = t;
        }
        if let Some(t) = self.inner_threshold {
            Validator::validate_threshold(t, "inner_threshold")?;
            thresholds.inner = t;
        }
        let space_strategy = self.space_strategy.unwrap_or_default();
        Validator::validate_strategy(space_strategy)?;

        let config = EngineConfig {
            bounds: self.bounds,
            space_strategy,
            resolution: self.resolution,
            thresholds,
            queue_kind: self.queue_kind.unwrap_or_default(),
            tie_break: self.tie_break.unwrap_or_default(),
            cache: self.cache.unwrap_or(true),
            projections: self.projections,
            seed: self.seed.unwrap_or(0),
            threads: self.threads.map(Validator::clamp_threads),
        };
        let tracker = self
            .tracker
            .unwrap_or_else(|| Arc::new(NullTracker) as Arc<dyn Tracker>);
        Ok(ClusteringEngine::new(
            x.to_vec(),
            y.to_vec(),
            config,
            tracker,
        ))
    }
}

/// Run OPTICS once with default options.
pub fn optics<T: Float + Debug + Send + Sync + 'static>(
    x: &[T],
    y: &[T],
    generating_distance: T,
    min_points: usize,
) -> Result<OpticsResult<T>, OpticsError> {
    ClusteringBuilder::new()
        .build(x, y)?
        .optics(generating_distance, min_points)
}

/// Run DBSCAN once with default options.
pub fn dbscan<T: Float + Debug + Send + Sync + 'static>(
    x: &[T],
    y: &[T],
    generating_distance: T,
    min_points: usize,
) -> Result<DbscanResult<T>, OpticsError> {
    ClusteringBuilder::new()
        .build(x, y)?
        .dbscan(generating_distance, min_points)
}
