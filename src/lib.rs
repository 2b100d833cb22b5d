//! # OPTICS: Density-Based Spatial Clustering for Rust
//!
//! OPTICS, DBSCAN and FastOPTICS over 2D point sets, with density-adaptive
//! neighbour indexes and a dynamic k-d tree for nearest-neighbour work.
//!
//! ## What is OPTICS?
//!
//! OPTICS (Ordering Points To Identify the Clustering Structure) walks a
//! point set in density-reachability order. For every point it records a
//! *core distance* (how far one must look to find `min_points` neighbours)
//! and a *reachability distance* (how far the point is from the dense region
//! that reached it). Plotting reachability in visitation order gives a
//! profile whose valleys are clusters; cutting the profile at any distance
//! up to the generating distance yields the DBSCAN clustering at that
//! distance.
//!
//! **What this crate provides:**
//! - Exact OPTICS and DBSCAN over a uniform grid index, with radial and
//!   inner-radial pruning chosen automatically from the expected density
//! - FastOPTICS: an approximate ordering from random 1D projections, no
//!   generating distance needed
//! - Flat cluster extraction from an OPTICS ordering
//! - k-distance curves for picking a generating distance
//! - Local outlier probabilities (LoOP)
//! - Cooperative cancellation and progress reporting through a `Tracker`
//!
//! **How a run works:**
//!
//! 1. Resolve the generating distance (estimated from density when not given)
//! 2. Pick a neighbour index from the expected points per search circle
//! 3. Build the index (or reuse the cached one)
//! 4. Expand clusters from a seed queue ordered by reachability distance
//!
//! ## Quick Start
//!
//! ### Typical Use
//!
//! ```rust
//! use optics_rs::prelude::*;
//!
//! let x = vec![0.0, 0.0, 1.0, 10.0, 10.0, 11.0];
//! let y = vec![0.0, 1.0, 0.0, 10.0, 11.0, 10.0];
//!
//! // Build the engine once, run as often as needed
//! let mut engine = Clustering::new()
//!     .tie_break(AscendingId)   // Deterministic ordering of equal distances
//!     .build(&x, &y)?;
//!
//! let result = engine.dbscan(2.0, 2)?;
//!
//! println!("{}", result);
//! # assert_eq!(result.cluster_count(), 2);
//! # Result::<(), OpticsError>::Ok(())
//! ```
//!
//! ```text
//! Generating distance: 2
//! Min points: 2
//! Index: Grid
//!
//! Summary:
//!   Data points: 6
//!   Clusters: 2
//!   Noise: 0
//!
//! Cluster Sizes:
//!    Cluster     Size
//!   -----------------
//!          1        3
//!          2        3
//! ```
//!
//! ### Cluster Ordering
//!
//! ```rust
//! use optics_rs::prelude::*;
//!
//! let x = vec![0.0, 0.5, 1.0, 0.2, 8.0, 8.5, 9.0];
//! let y = vec![0.0, 0.4, 0.1, 0.9, 8.0, 8.3, 8.1];
//!
//! let mut engine = Clustering::new()
//!     .space_strategy(Auto)        // Grid, Radial or InnerRadial by density
//!     .queue_kind(Heap)            // Binary heap seed queue
//!     .cache(true)                 // Reuse the index across runs
//!     .build(&x, &y)?;
//!
//! // A non-positive generating distance is estimated from the data
//! let order = engine.optics(0.0, 3)?;
//! let profile = order.reachability_profile();
//! assert_eq!(profile.len(), x.len());
//!
//! // Flat clusters at any threshold up to the generating distance
//! let flat = order.extract_dbscan_clustering(2.0);
//! println!("{}", flat);
//! # Result::<(), OpticsError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! Every run returns `Result<_, OpticsError>`. Configuration mistakes
//! (mismatched lengths, non-finite coordinates, an option set twice) are
//! reported by `build`; a run cancelled through its tracker returns
//! `Err(OpticsError::Aborted)`. Out-of-range counts such as
//! `min_points = 0` are clamped rather than rejected.
//!
//! ```rust
//! use optics_rs::prelude::*;
//!
//! let x = vec![0.0, 1.0, 2.0];
//! let y = vec![0.0, 1.0];
//!
//! match Clustering::<f64>::new().build(&x, &y) {
//!     Ok(_) => unreachable!(),
//!     Err(e) => eprintln!("Invalid input: {}", e),
//! }
//! ```
//!
//! ## Minimal Usage (no_std / Embedded)
//!
//! The crate supports `no_std` environments with `alloc`. Disable default
//! features to remove the standard library and the `rayon` worker pool;
//! every phase then runs on the calling thread:
//!
//! ```toml
//! [dependencies]
//! optics-rs = { version = "0.1", default-features = false }
//! ```
//!
//! ## Parameters
//!
//! All builder parameters have sensible defaults.
//!
//! | Parameter            | Default          | Range/Options                       | Description                                    |
//! |----------------------|------------------|-------------------------------------|------------------------------------------------|
//! | **bounds**           | data bounds      | finite `Rect`                       | Area used to estimate density                  |
//! | **space_strategy**   | `Auto`           | `Auto`, `Grid`, `Radial`, `InnerRadial` | Neighbour index                            |
//! | **resolution**       | from density     | [1, 8]                              | Grid cells per generating distance             |
//! | **radial_threshold** | 20               | > 0                                 | Expected points per circle for radial pruning  |
//! | **inner_threshold**  | 50               | > 0                                 | Same, for DBSCAN inner-first pruning           |
//! | **queue_kind**       | `Heap`           | `Heap`, `List`                      | Seed queue implementation                      |
//! | **tie_break**        | `AscendingId`    | `AscendingId`, `DescendingId`, `Unspecified` | Order of equal reachability distances |
//! | **cache**            | true             | true/false                          | Keep the index between runs                    |
//! | **projections**      | `10·⌈log2 n⌉`    | [1, ∞)                              | FastOPTICS random projections                  |
//! | **seed**             | 0                | any `u64`                           | FastOPTICS and sampling seed                   |
//! | **threads**          | `rayon` default  | [1, ∞)                              | Worker pool size                               |
//! | **tracker**          | `NullTracker`    | any `Tracker`                       | Progress and cancellation                      |
//!
//! ## References
//!
//! - Ankerst, M., Breunig, M. M., Kriegel, H.-P. & Sander, J. (1999). "OPTICS: Ordering Points To Identify the Clustering Structure"
//! - Ester, M., Kriegel, H.-P., Sander, J. & Xu, X. (1996). "A Density-Based Algorithm for Discovering Clusters in Large Spatial Databases with Noise"
//! - Schneider, J. & Vlachos, M. (2013). "Fast parameterless density-based clustering via random projections"
//! - Kriegel, H.-P., Kröger, P., Schubert, E. & Zimek, A. (2009). "LoOP: Local Outlier Probabilities"
//!
//! ## License
//!
//! Dual-licensed under MIT or Apache-2.0.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data structures and basic utilities.
//
// Contains the per-point `Molecule`, the bounding `Rect`, reusable query
// buffers, the `Tracker` collaborator and the error type.
mod primitives;

// Layer 2: Math - numeric building blocks.
//
// Contains the order-statistic heap, distance metrics, the dynamic k-d tree
// and the error function.
mod math;

// Layer 3: Index - neighbour search strategies.
//
// Contains the grid, radial and inner-radial indexes, the projected
// neighbourhoods used by FastOPTICS, and the strategy selection heuristics.
mod index;

// Layer 4: Algorithms - clustering algorithms.
//
// Contains the seed queue, OPTICS, DBSCAN, FastOPTICS, cluster extraction
// and the k-d tree based outlier routines.
mod algorithms;

// Layer 5: Engine - orchestration and execution control.
//
// Contains generating-distance resolution, index caching, the worker pool
// and result assembly.
mod engine;

// High-level fluent API for clustering.
//
// Provides the `Clustering` builder that validates options and points and
// creates an engine.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard clustering prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use optics_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        dbscan, optics, ClusterAssignment, ClusteringBuilder as Clustering, ClusteringEngine,
        DbscanResult, KDistances, LogTracker, NullTracker, OpticsError, OpticsResult,
        OutlierScores, QueueKind,
        QueueKind::{Heap, List},
        Rect, SpaceStrategy,
        SpaceStrategy::{Auto, Grid, InnerRadial, Radial},
        TieBreak,
        TieBreak::{AscendingId, DescendingId, Unspecified},
        Tracker,
    };
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// Exposes the layered modules to integration tests and benchmarks.
/// Compiled only with the `dev` feature.
///
/// **Warning**: Nothing here is covered by semver.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal neighbour indexes.
    pub mod index {
        pub use crate::index::*;
    }
    /// Internal clustering algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
