//! Error types for clustering operations.
//!
//! ## Purpose
//!
//! This module defines the single error type returned by every fallible
//! operation in the crate: input validation, builder configuration, worker
//! pool creation and cooperative cancellation.
//!
//! ## Design notes
//!
//! * **Hand-written**: `Display` is implemented manually so the type works
//!   without the standard library.
//! * **Lenient configuration**: Out-of-range counts (`min_points < 1`, zero
//!   projections, zero threads) are clamped by the validator instead of being
//!   reported here.
//! * **Cancellation is an outcome**: `Aborted` means the caller asked the run
//!   to stop. It is distinct from a computed-but-empty result.
//!
//! ## Non-goals
//!
//! * This module does not attempt recovery or retries.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::string::String;

use core::fmt;

/// Errors produced while configuring or running a clustering engine.
#[derive(Debug, Clone, PartialEq)]
pub enum OpticsError {
    /// The x and y coordinate arrays have different lengths.
    MismatchedInputs {
        /// Number of x coordinates.
        x_len: usize,
        /// Number of y coordinates.
        y_len: usize,
    },

    /// A coordinate or bound is NaN or infinite.
    InvalidNumericValue(String),

    /// The bounding rectangle is malformed (min greater than max).
    InvalidBounds(String),

    /// A builder parameter was set more than once.
    DuplicateParameter {
        /// Name of the repeated parameter.
        parameter: &'static str,
    },

    /// A parameter is outside the range that can be corrected by clamping.
    InvalidParameter(String),

    /// The run observed a cancellation request and stopped.
    Aborted,

    /// The worker pool could not be created.
    ThreadPool(String),
}

impl fmt::Display for OpticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpticsError::MismatchedInputs { x_len, y_len } => {
                write!(f, "Length mismatch: x has {} points, y has {}", x_len, y_len)
            }
            OpticsError::InvalidNumericValue(detail) => {
                write!(f, "Invalid numeric value: {}", detail)
            }
            OpticsError::InvalidBounds(detail) => write!(f, "Invalid bounds: {}", detail),
            OpticsError::DuplicateParameter { parameter } => {
                write!(f, "Parameter '{}' was set more than once", parameter)
            }
            OpticsError::InvalidParameter(detail) => write!(f, "Invalid parameter: {}", detail),
            OpticsError::Aborted => write!(f, "Clustering run was aborted"),
            OpticsError::ThreadPool(detail) => write!(f, "Worker pool error: {}", detail),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OpticsError {}
