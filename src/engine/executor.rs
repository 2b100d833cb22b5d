//! Execution engine for clustering runs.
//!
//! ## Purpose
//!
//! This module provides `ClusteringEngine`, which owns a validated point
//! set and orchestrates every run over it: resolving the generating
//! distance, choosing and caching the neighbour index, lending the
//! workspace to the algorithms, and managing the worker pool used by
//! FastOPTICS and the k-d tree routines.
//!
//! ## Design notes
//!
//! * **One engine, many runs**: Runs take their per-run parameters
//!   (generating distance, `min_points`, `k`) explicitly. Everything else is
//!   fixed when the engine is built.
//! * **Explicit cache decision**: The index is rebuilt exactly when
//!   `needs_rebuild` says so.
//! * **Lazy pool**: The `rayon` pool is created on first use, reused, and
//!   dropped by `shutdown`. Without the `std` feature every phase runs on the
//!   calling thread.
//!
//! ## Key concepts
//!
//! * **Generating distance resolution**: Non-positive or non-finite requests
//!   are replaced by the uniform-density estimate
//!   `sqrt((area / n) · min_points / π)`; results are clamped to the bounds
//!   diagonal; colocated points force `1`.
//!
//! ## Invariants
//!
//! * Coordinates are finite and `x.len() == y.len()` (checked by the builder).
//! * The workspace molecules are reset before every run.
//!
//! ## Non-goals
//!
//! * This module does not validate builder options (handled by `validator`).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::f64::consts::PI;
use core::fmt::{self, Debug, Formatter};
use num_traits::Float;

use crate::algorithms::dbscan::run_dbscan;
#[cfg(feature = "std")]
use crate::algorithms::fast_optics::build_projected_parallel;
#[cfg(not(feature = "std"))]
use crate::algorithms::fast_optics::build_projected_sequential;
use crate::algorithms::optics::run_optics;
use crate::algorithms::outliers::{self, build_point_tree, sample_ids};
use crate::algorithms::seeds::{QueueKind, SeedQueue, TieBreak};
use crate::engine::output::{ClusterAssignment, DbscanResult, KDistances, OpticsResult, OutlierScores};
use crate::engine::validator::Validator;
use crate::engine::workspace::ClusteringWorkspace;
use crate::index::projected::{default_projections, random_directions};
use crate::index::{
    auto_resolution, build_space, expected_points_in_circle, needs_rebuild, select_strategy,
    ClusteringAlgorithm, DensityThresholds, MoleculeSpace, SpaceKey, SpaceStrategy,
};
use crate::math::ndtree::NdTree;
use crate::primitives::bounds::Rect;
use crate::primitives::errors::OpticsError;
use crate::primitives::progress::Tracker;

// ============================================================================
// Configuration
// ============================================================================

/// Options fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig<T> {
    /// Area used for density calibration; data bounds when `None`.
    pub bounds: Option<Rect<T>>,

    /// Requested index strategy.
    pub space_strategy: SpaceStrategy,

    /// Grid cells per generating distance; chosen from density when `None`.
    pub resolution: Option<usize>,

    /// Density thresholds for automatic strategy selection.
    pub thresholds: DensityThresholds,

    /// Seed queue implementation.
    pub queue_kind: QueueKind,

    /// Tie-break for equal reachability distances.
    pub tie_break: TieBreak,

    /// Reuse the index across runs with unchanged parameters.
    pub cache: bool,

    /// FastOPTICS projection count; `10·⌈log2 n⌉` when `None`.
    pub projections: Option<usize>,

    /// FastOPTICS and sampling seed.
    pub seed: u64,

    /// Worker pool size; the `rayon` default when `None`.
    pub threads: Option<usize>,
}

impl<T> Default for EngineConfig<T> {
    fn default() -> Self {
        Self {
            bounds: None,
            space_strategy: SpaceStrategy::default(),
            resolution: None,
            thresholds: DensityThresholds::default(),
            queue_kind: QueueKind::default(),
            tie_break: TieBreak::default(),
            cache: true,
            projections: None,
            seed: 0,
            threads: None,
        }
    }
}

/// Resolve the generating distance for a run.
///
/// * Colocated points (or no points) resolve to `1`.
/// * A non-positive or non-finite request is replaced by
///   `sqrt((area / n) · min_points / π)`, or `1` when the area is zero.
/// * The result never exceeds a positive bounds diagonal.
pub fn resolve_generating_distance<T: Float>(
    requested: T,
    min_points: usize,
    n: usize,
    bounds: &Rect<T>,
) -> T {
    if n == 0 || bounds.is_point() {
        return T::one();
    }
    let area = bounds.area();
    let mut r = if requested > T::zero() && requested.is_finite() {
        requested
    } else if area > T::zero() {
        let per_point = area / T::from(n).unwrap_or_else(T::one);
        let k = T::from(min_points.max(1)).unwrap_or_else(T::one);
        let pi = T::from(PI).unwrap_or_else(T::one);
        (per_point * k / pi).sqrt()
    } else {
        T::one()
    };
    let diagonal = bounds.diagonal();
    if diagonal > T::zero() && r > diagonal {
        r = diagonal;
    }
    r
}

// ============================================================================
// Engine
// ============================================================================

struct CachedSpace<T> {
    key: SpaceKey<T>,
    space: Box<dyn MoleculeSpace<T>>,
}

/// Clustering engine over one validated point set.
pub struct ClusteringEngine<T: Float> {
    x: Vec<T>,
    y: Vec<T>,
    bounds: Rect<T>,
    config: EngineConfig<T>,
    tracker: Arc<dyn Tracker>,
    workspace: ClusteringWorkspace<T>,
    cached: Option<CachedSpace<T>>,
    tree: Option<NdTree<T, usize>>,
    #[cfg(feature = "std")]
    pool: Option<rayon::ThreadPool>,
}

impl<T: Float + Debug> Debug for ClusteringEngine<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusteringEngine")
            .field("points", &self.x.len())
            .field("bounds", &self.bounds)
            .field("config", &self.config)
            .field("cached", &self.cached.as_ref().map(|c| c.key))
            .finish()
    }
}

impl<T: Float + Debug + Send + Sync + 'static> ClusteringEngine<T> {
    /// Create an engine. Inputs must already be validated.
    pub fn new(
        x: Vec<T>,
        y: Vec<T>,
        config: EngineConfig<T>,
        tracker: Arc<dyn Tracker>,
    ) -> Self {
        let bounds = config
            .bounds
            .unwrap_or_else(|| Rect::from_points(&x, &y));
        let seeds = SeedQueue::new(config.queue_kind, config.tie_break);
        let workspace = ClusteringWorkspace::new(&x, &y, seeds);
        Self {
            x,
            y,
            bounds,
            config,
            tracker,
            workspace,
            cached: None,
            tree: None,
            #[cfg(feature = "std")]
            pool: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True when the engine holds no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Area used for density calibration.
    pub fn bounds(&self) -> &Rect<T> {
        &self.bounds
    }

    /// Engine options.
    pub fn config(&self) -> &EngineConfig<T> {
        &self.config
    }

    /// Key of the cached index, if any.
    pub fn cached_space(&self) -> Option<SpaceKey<T>> {
        self.cached.as_ref().map(|c| c.key)
    }

    // ========================================================================
    // Clustering runs
    // ========================================================================

    /// Compute the OPTICS cluster order.
    pub fn optics(
        &mut self,
        generating_distance: T,
        min_points: usize,
    ) -> Result<OpticsResult<T>, OpticsError> {
        let min_points = Validator::clamp_min_points(min_points);
        let key = self.prepare_space(ClusteringAlgorithm::Optics, generating_distance, min_points)?;
        self.tracker.log("Computing OPTICS cluster order");
        self.workspace.reset();

        let Some(cached) = self.cached.as_ref() else {
            return Err(OpticsError::InvalidParameter("no index available".into()));
        };
        let ClusteringWorkspace {
            molecules, optics, ..
        } = &mut self.workspace;
        let order = run_optics(
            cached.space.as_ref(),
            molecules,
            min_points,
            optics,
            self.tracker.as_ref(),
        )
        .map_err(|e| self.report(e))?;
        self.release_uncached();

        let result = OpticsResult {
            order,
            generating_distance: key.generating_distance,
            min_points,
            strategy: key.strategy,
        };
        log::debug!(
            "OPTICS finished: {} points, {} core",
            result.len(),
            result.core_count()
        );
        Ok(result)
    }

    /// Label points with DBSCAN.
    pub fn dbscan(
        &mut self,
        generating_distance: T,
        min_points: usize,
    ) -> Result<DbscanResult<T>, OpticsError> {
        let min_points = Validator::clamp_min_points(min_points);
        let key = self.prepare_space(ClusteringAlgorithm::Dbscan, generating_distance, min_points)?;
        self.tracker.log("Computing DBSCAN clustering");
        self.workspace.reset();

        let Some(cached) = self.cached.as_ref() else {
            return Err(OpticsError::InvalidParameter("no index available".into()));
        };
        let ClusteringWorkspace {
            molecules, dbscan, ..
        } = &mut self.workspace;
        let (records, clusters) = run_dbscan(
            cached.space.as_ref(),
            molecules,
            min_points,
            dbscan,
            self.tracker.as_ref(),
        )
        .map_err(|e| self.report(e))?;
        let labels = self.workspace.molecules.iter().map(|m| m.cluster_id).collect();
        self.release_uncached();

        let assignment = ClusterAssignment::new(labels, clusters);
        log::debug!(
            "DBSCAN finished: {} clusters, {} noise",
            clusters,
            assignment.noise_count()
        );
        Ok(DbscanResult {
            records,
            assignment,
            generating_distance: key.generating_distance,
            min_points,
            strategy: key.strategy,
        })
    }

    /// Compute an approximate cluster order from random projections.
    pub fn fast_optics(&mut self, min_points: usize) -> Result<OpticsResult<T>, OpticsError> {
        let min_points = Validator::clamp_min_points(min_points);
        let n = self.x.len();
        let count = self
            .config
            .projections
            .map_or_else(|| default_projections(n), |p| p.max(1));
        log::debug!("FastOPTICS: {} projections, seed {}", count, self.config.seed);
        self.tracker.log("Computing random projections");
        let directions = random_directions::<T>(count, self.config.seed);

        #[cfg(feature = "std")]
        let space = {
            self.ensure_pool()?;
            let Some(pool) = self.pool.as_ref() else {
                return Err(OpticsError::ThreadPool("worker pool unavailable".into()));
            };
            build_projected_parallel(
                pool,
                &self.x,
                &self.y,
                &directions,
                min_points,
                self.tracker.as_ref(),
            )
        };
        #[cfg(not(feature = "std"))]
        let space = build_projected_sequential(
            &self.x,
            &self.y,
            &directions,
            1,
            min_points,
            self.tracker.as_ref(),
        );
        let space = space.map_err(|e| self.report(e))?;

        self.tracker.log("Computing FastOPTICS cluster order");
        self.workspace.reset();
        let ClusteringWorkspace {
            molecules, optics, ..
        } = &mut self.workspace;
        let order = run_optics(&space, molecules, min_points, optics, self.tracker.as_ref())
            .map_err(|e| self.report(e))?;

        Ok(OpticsResult {
            order,
            generating_distance: T::infinity(),
            min_points,
            strategy: SpaceStrategy::Projected,
        })
    }

    // ========================================================================
    // Nearest-neighbour routines
    // ========================================================================

    /// k-th neighbour distances for every point, or for `samples` seeded
    /// random points, sorted descending.
    pub fn k_distances(
        &mut self,
        k: usize,
        samples: Option<usize>,
    ) -> Result<KDistances<T>, OpticsError> {
        let k = Validator::clamp_k(k);
        let ids = sample_ids(self.x.len(), samples, self.config.seed);
        #[cfg(feature = "std")]
        self.ensure_pool()?;

        let tree = match self.tree.take() {
            Some(tree) => tree,
            None => build_point_tree(&self.x, &self.y)?,
        };
        let tree = &*self.tree.insert(tree);
        let (x, y) = (&self.x, &self.y);

        #[cfg(feature = "std")]
        let distances = match self.pool.as_ref() {
            Some(pool) => pool.install(|| outliers::k_distances(tree, x, y, k, &ids)),
            None => outliers::k_distances(tree, x, y, k, &ids),
        };
        #[cfg(not(feature = "std"))]
        let distances = outliers::k_distances(tree, x, y, k, &ids);

        Ok(KDistances { k, distances })
    }

    /// Local outlier probability of every point.
    pub fn outlier_scores(&mut self, k: usize, lambda: T) -> Result<OutlierScores<T>, OpticsError> {
        Validator::validate_lambda(lambda)?;
        let k = Validator::clamp_k(k);
        #[cfg(feature = "std")]
        self.ensure_pool()?;

        let tree = match self.tree.take() {
            Some(tree) => tree,
            None => build_point_tree(&self.x, &self.y)?,
        };
        let tree = &*self.tree.insert(tree);
        let (x, y) = (&self.x, &self.y);

        #[cfg(feature = "std")]
        let scores = match self.pool.as_ref() {
            Some(pool) => pool.install(|| outliers::outlier_scores(tree, x, y, k, lambda)),
            None => outliers::outlier_scores(tree, x, y, k, lambda),
        };
        #[cfg(not(feature = "std"))]
        let scores = outliers::outlier_scores(tree, x, y, k, lambda);

        Ok(OutlierScores { k, lambda, scores })
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Drop the worker pool and the cached index. Later runs recreate them.
    pub fn shutdown(&mut self) {
        #[cfg(feature = "std")]
        if self.pool.take().is_some() {
            log::debug!("worker pool shut down");
        }
        self.cached = None;
        self.tree = None;
    }

    #[cfg(feature = "std")]
    fn ensure_pool(&mut self) -> Result<(), OpticsError> {
        if self.pool.is_some() {
            return Ok(());
        }
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| OpticsError::ThreadPool(e.to_string()))?;
        log::debug!("worker pool started with {} threads", pool.current_num_threads());
        self.pool = Some(pool);
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Resolve the generating distance and make sure a matching index is cached.
    fn prepare_space(
        &mut self,
        algorithm: ClusteringAlgorithm,
        requested: T,
        min_points: usize,
    ) -> Result<SpaceKey<T>, OpticsError> {
        let n = self.x.len();
        let generating_distance =
            resolve_generating_distance(requested, min_points, n, &self.bounds);
        let expected = expected_points_in_circle(n, generating_distance, self.bounds.area());
        let strategy = select_strategy(
            self.config.space_strategy,
            algorithm,
            expected,
            &self.config.thresholds,
        );
        let resolution = match self.config.resolution {
            Some(r) => Validator::clamp_resolution(r),
            None => auto_resolution(expected),
        };
        let key = SpaceKey {
            strategy,
            generating_distance,
            resolution,
        };
        log::debug!(
            "{:?}: generating distance {:?}, {:.1} expected per circle, {:?} x{}",
            algorithm,
            generating_distance,
            expected,
            strategy,
            resolution
        );

        let cached = self.cached.as_ref().map(|c| &c.key);
        if needs_rebuild(self.config.cache, cached, &key) {
            log::debug!("building {:?} index", strategy);
            let space = build_space(strategy, &self.x, &self.y, generating_distance, resolution)?;
            self.cached = Some(CachedSpace { key, space });
        } else {
            log::debug!("reusing cached {:?} index", strategy);
        }
        Ok(key)
    }

    fn release_uncached(&mut self) {
        if !self.config.cache {
            self.cached = None;
        }
    }

    fn report(&self, error: OpticsError) -> OpticsError {
        if error == OpticsError::Aborted {
            log::info!("clustering run aborted");
            self.tracker.log("Clustering run aborted");
        }
        error
    }
}
