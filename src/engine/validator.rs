//! Input validation and lenient clamping for clustering runs.
//!
//! ## Purpose
//!
//! This module checks coordinates, bounds and builder options before an
//! engine is built, and clamps per-run counts that are merely out of range.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Lenient counts**: `min_points`, `k` and the grid resolution are
//!   clamped rather than rejected, so parameter sweeps never fail on a
//!   boundary value. Every clamp is logged at `debug`.
//!
//! ## Invariants
//!
//! * Validated coordinates are finite and the arrays have equal length.
//! * Validated bounds are finite with `min <= max` on both axes.
//!
//! ## Non-goals
//!
//! * This module does not resolve the generating distance.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

use num_traits::Float;

use crate::index::{SpaceStrategy, MAX_RESOLUTION};
use crate::primitives::bounds::Rect;
use crate::primitives::errors::OpticsError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for clustering inputs and options.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Input Validation
    // ========================================================================

    /// Validate coordinate arrays. Empty input is valid.
    pub fn validate_inputs<T: Float>(x: &[T], y: &[T]) -> Result<(), OpticsError> {
        if x.len() != y.len() {
            return Err(OpticsError::MismatchedInputs {
                x_len: x.len(),
                y_len: y.len(),
            });
        }

        for (i, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
            if !xi.is_finite() {
                return Err(OpticsError::InvalidNumericValue(format!(
                    "x[{}]={}",
                    i,
                    xi.to_f64().unwrap_or(f64::NAN)
                )));
            }
            if !yi.is_finite() {
                return Err(OpticsError::InvalidNumericValue(format!(
                    "y[{}]={}",
                    i,
                    yi.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }
        Ok(())
    }

    /// Validate a caller-supplied bounding rectangle.
    pub fn validate_bounds<T: Float>(bounds: &Rect<T>) -> Result<(), OpticsError> {
        let limits = [bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y];
        if limits.iter().any(|v| !v.is_finite()) {
            return Err(OpticsError::InvalidNumericValue(format!(
                "bounds=[{}, {}, {}, {}]",
                bounds.min_x.to_f64().unwrap_or(f64::NAN),
                bounds.min_y.to_f64().unwrap_or(f64::NAN),
                bounds.max_x.to_f64().unwrap_or(f64::NAN),
                bounds.max_y.to_f64().unwrap_or(f64::NAN),
            )));
        }
        if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
            return Err(OpticsError::InvalidBounds(format!(
                "min ({}, {}) exceeds max ({}, {})",
                bounds.min_x.to_f64().unwrap_or(f64::NAN),
                bounds.min_y.to_f64().unwrap_or(f64::NAN),
                bounds.max_x.to_f64().unwrap_or(f64::NAN),
                bounds.max_y.to_f64().unwrap_or(f64::NAN),
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Option Validation
    // ========================================================================

    /// Validate a density threshold (finite and positive).
    pub fn validate_threshold(value: f64, name: &str) -> Result<(), OpticsError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(OpticsError::InvalidParameter(format!(
                "{} must be finite and positive, got {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Validate the requested index strategy. `Projected` is reserved for FastOPTICS.
    pub fn validate_strategy(strategy: SpaceStrategy) -> Result<(), OpticsError> {
        if strategy == SpaceStrategy::Projected {
            return Err(OpticsError::InvalidParameter(
                "the projected space is only used by FastOPTICS".into(),
            ));
        }
        Ok(())
    }

    /// Validate the LoOP significance multiplier.
    pub fn validate_lambda<T: Float>(lambda: T) -> Result<(), OpticsError> {
        if !lambda.is_finite() || lambda <= T::zero() {
            return Err(OpticsError::InvalidParameter(format!(
                "lambda must be finite and positive, got {}",
                lambda.to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), OpticsError> {
        if let Some(param) = duplicate_param {
            return Err(OpticsError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }

    // ========================================================================
    // Lenient Clamping
    // ========================================================================

    /// Clamp `min_points` to at least 1.
    pub fn clamp_min_points(min_points: usize) -> usize {
        if min_points < 1 {
            log::debug!("min_points {} clamped to 1", min_points);
            return 1;
        }
        min_points
    }

    /// Clamp a grid resolution to `[1, MAX_RESOLUTION]`.
    pub fn clamp_resolution(resolution: usize) -> usize {
        let clamped = resolution.clamp(1, MAX_RESOLUTION);
        if clamped != resolution {
            log::debug!("resolution {} clamped to {}", resolution, clamped);
        }
        clamped
    }

    /// Clamp a neighbour count to at least 1.
    pub fn clamp_k(k: usize) -> usize {
        if k < 1 {
            log::debug!("k {} clamped to 1", k);
            return 1;
        }
        k
    }

    /// Clamp the worker pool size to at least 1.
    pub fn clamp_threads(threads: usize) -> usize {
        if threads < 1 {
            log::debug!("threads {} clamped to 1", threads);
            return 1;
        }
        threads
    }
}
