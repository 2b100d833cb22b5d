//! Distance functions for n-dimensional nearest-neighbour search.
//!
//! ## Purpose
//!
//! This module provides the metrics used by the generic k-d tree. Every
//! metric knows how to measure a point-to-point distance and a lower bound on
//! the distance from a point to an axis-aligned box, which is what the tree
//! needs to prune subtrees.
//!
//! ## Design notes
//!
//! * **Trait-based**: `PointDistance` lets callers plug in their own metric.
//! * **Squared Euclidean default**: Avoids the square root in hot loops;
//!   callers convert with `post_process_distance` when they need metres.
//! * **NaN tolerant**: A NaN coordinate or bound contributes zero to the box
//!   distance, so a NaN dimension never prunes a subtree.
//!
//! ## Invariants
//!
//! * Distances are non-negative for finite inputs.
//! * `distance_to_bounds(p, min, max) <= distance(p, q)` for every `q` inside
//!   the box.

// External dependencies
use num_traits::Float;

// ============================================================================
// Distance trait
// ============================================================================

/// Metric used by `NdTree` searches.
pub trait PointDistance<T: Float> {
    /// Distance between two points of equal dimension.
    fn distance(&self, a: &[T], b: &[T]) -> T;

    /// Lower bound of the distance from `point` to any point inside the box.
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T;

    /// Convert a distance from comparison space to metric space.
    ///
    /// Identity for every metric except `SquaredEuclidean`.
    fn post_process_distance(&self, d: T) -> T {
        d
    }
}

// ============================================================================
// Distance Metric Enum
// ============================================================================

/// Built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance: Σ(xᵢ - yᵢ)²
    #[default]
    SquaredEuclidean,

    /// Euclidean distance: √(Σ(xᵢ - yᵢ)²)
    Euclidean,

    /// Manhattan distance (L1 norm): Σ|xᵢ - yᵢ|
    Manhattan,

    /// Chebyshev distance (L∞ norm): max|xᵢ - yᵢ|
    Chebyshev,
}

impl DistanceMetric {
    /// Squared Euclidean distance between two points.
    #[inline]
    pub fn squared_euclidean<T: Float>(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len(), "Points must have same dimension");
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| {
                let diff = ai - bi;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn euclidean<T: Float>(a: &[T], b: &[T]) -> T {
        Self::squared_euclidean(a, b).sqrt()
    }

    /// Manhattan distance (L1 norm).
    #[inline]
    pub fn manhattan<T: Float>(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Chebyshev distance (L-inf norm).
    #[inline]
    pub fn chebyshev<T: Float>(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), T::max)
    }

    /// Per-dimension gap between a coordinate and an interval.
    ///
    /// Zero when the coordinate is inside the interval or any value is NaN.
    #[inline]
    pub fn axis_gap<T: Float>(p: T, min: T, max: T) -> T {
        if p < min {
            min - p
        } else if p > max {
            p - max
        } else {
            T::zero()
        }
    }
}

impl<T: Float> PointDistance<T> for DistanceMetric {
    fn distance(&self, a: &[T], b: &[T]) -> T {
        match self {
            DistanceMetric::SquaredEuclidean => Self::squared_euclidean(a, b),
            DistanceMetric::Euclidean => Self::euclidean(a, b),
            DistanceMetric::Manhattan => Self::manhattan(a, b),
            DistanceMetric::Chebyshev => Self::chebyshev(a, b),
        }
    }

    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T {
        let gaps = point
            .iter()
            .zip(min.iter().zip(max.iter()))
            .map(|(&p, (&lo, &hi))| Self::axis_gap(p, lo, hi));
        match self {
            DistanceMetric::SquaredEuclidean => gaps.map(|g| g * g).fold(T::zero(), |a, x| a + x),
            DistanceMetric::Euclidean => gaps.map(|g| g * g).fold(T::zero(), |a, x| a + x).sqrt(),
            DistanceMetric::Manhattan => gaps.fold(T::zero(), |a, x| a + x),
            DistanceMetric::Chebyshev => gaps.fold(T::zero(), T::max),
        }
    }

    fn post_process_distance(&self, d: T) -> T {
        match self {
            DistanceMetric::SquaredEuclidean => d.sqrt(),
            _ => d,
        }
    }
}
