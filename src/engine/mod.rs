//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer turns the algorithms into repeatable runs over one point set:
//! - `executor`: the `ClusteringEngine` that resolves the generating
//!   distance, selects and caches the index, and owns the worker pool
//! - `output`: result types and their views
//! - `validator`: input checks and parameter clamping
//! - `workspace`: per-engine buffers reused across runs
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Index
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Clustering engine.
pub mod executor;

/// Result types.
pub mod output;

/// Validation and clamping.
pub mod validator;

/// Reusable buffers.
pub mod workspace;
