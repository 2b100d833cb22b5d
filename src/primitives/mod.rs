//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the data structures every other layer builds on:
//! - The per-point `Molecule` record and the bounding `Rect`
//! - Reusable query buffers
//! - The progress/cancellation `Tracker` collaborator
//! - The crate error type
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Bounding rectangle.
pub mod bounds;

/// Reusable buffers for neighbour queries and tree searches.
pub mod buffer;

/// Error types.
pub mod errors;

/// Per-point run state.
pub mod molecule;

/// Progress reporting and cancellation.
pub mod progress;
