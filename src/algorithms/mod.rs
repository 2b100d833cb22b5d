//! Layer 4: Algorithms
//!
//! # Purpose
//!
//! This layer provides the clustering procedures themselves:
//! - The seed queue driving OPTICS expansion order
//! - OPTICS, DBSCAN and FastOPTICS over any `MoleculeSpace`
//! - Flat-cluster extraction from a cluster order
//! - k-distance sampling and local outlier probabilities over `NdTree`
//!
//! Algorithms borrow molecules and buffers from the engine; they own no
//! state between runs.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Algorithms ← You are here
//!   ↓
//! Layer 3: Index
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// DBSCAN breadth-first expansion.
pub mod dbscan;

/// Flat clustering from a cluster order.
pub mod extraction;

/// FastOPTICS over random-projection neighbourhoods.
pub mod fast_optics;

/// OPTICS cluster ordering.
pub mod optics;

/// k-distance sampling and LoOP scores.
pub mod outliers;

/// Seed ordering queue.
pub mod seeds;
