//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the numeric building blocks used by the indexes and
//! algorithms:
//! - The bounded order-statistic heap that yields core distances
//! - Distance metrics with point-to-box lower bounds
//! - The dynamic k-d tree used for ancillary nearest-neighbour search
//! - Special functions for outlier scoring
//!
//! These are reusable pieces with no clustering-specific state.
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
//! Layer 3: Index
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Distance metrics.
pub mod distance;

/// Dynamic k-d tree.
pub mod ndtree;

/// k-th smallest value via a bounded max-heap.
pub mod order_statistic;

/// Special functions.
pub mod special;
