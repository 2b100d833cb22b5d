//! k-distance sampling and local outlier probabilities.
//!
//! ## Purpose
//!
//! These routines answer "how far is the k-th neighbour" questions with the
//! generic `NdTree` rather than a generating-distance index:
//! - `k_distances` gives the data for a k-distance plot, the usual aid for
//!   choosing a generating distance and `min_points`.
//! - `outlier_scores` gives Local Outlier Probabilities (LoOP) in `[0, 1]`.
//!
//! ## Design notes
//!
//! * **Shared read-only tree**: The tree is built once, then queried from
//!   many threads through `rayon` when the `std` feature is enabled.
//! * **Self in k-distance**: The k-th neighbour count includes the point
//!   itself, matching how `min_points` counts for core distances.
//! * **Self excluded in LoOP**: Context sets are the `k` nearest other
//!   points.
//!
//! ## Key concepts
//!
//! * **Probabilistic distance**: `λ · sqrt(mean squared distance to context)`.
//! * **PLOF**: own probabilistic distance over the context mean, minus one.
//! * **Score**: `max(0, erf(PLOF / (nPLOF · √2)))` where
//!   `nPLOF = λ · sqrt(mean PLOF²)`.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::cmp::Ordering;
use num_traits::Float;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "std")]
use rayon::prelude::*;

use crate::math::distance::{DistanceMetric, PointDistance};
use crate::math::ndtree::NdTree;
use crate::math::special::erf;
use crate::primitives::errors::OpticsError;

/// Default LoOP significance multiplier.
pub const DEFAULT_LAMBDA: f64 = 3.0;

/// Build a 2D tree holding each point's id.
pub fn build_point_tree<T: Float>(x: &[T], y: &[T]) -> Result<NdTree<T, usize>, OpticsError> {
    let mut tree = NdTree::new(2);
    for (i, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
        tree.add(&[xi, yi], i)?;
    }
    Ok(tree)
}

/// Map `f` over `ids`, in parallel when available.
#[cfg(feature = "std")]
fn map_ids<R, F>(ids: &[usize], f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    ids.par_iter().map(|&i| f(i)).collect()
}

#[cfg(not(feature = "std"))]
fn map_ids<R, F>(ids: &[usize], f: F) -> Vec<R>
where
    F: Fn(usize) -> R,
{
    ids.iter().map(|&i| f(i)).collect()
}

// ============================================================================
// k-distances
// ============================================================================

/// Distance to the `k`-th nearest point (self included) for each id in
/// `ids`, sorted descending.
///
/// When fewer than `k` points exist the farthest available distance is used.
pub fn k_distances<T: Float + Send + Sync>(
    tree: &NdTree<T, usize>,
    x: &[T],
    y: &[T],
    k: usize,
    ids: &[usize],
) -> Vec<T> {
    let k = k.max(1);
    let metric = DistanceMetric::SquaredEuclidean;
    let mut distances = map_ids(ids, |i| {
        tree.k_nearest(&[x[i], y[i]], k, &metric)
            .last()
            .map_or_else(T::zero, |&(_, d2)| metric.post_process_distance(d2))
    });
    distances.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    distances
}

/// Ids to evaluate: every point, or `samples` distinct points drawn with a
/// seeded generator (sorted ascending).
pub fn sample_ids(n: usize, samples: Option<usize>, seed: u64) -> Vec<usize> {
    match samples {
        Some(count) if count < n => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut ids = rand::seq::index::sample(&mut rng, n, count).into_vec();
            ids.sort_unstable();
            ids
        }
        _ => (0..n).collect(),
    }
}

// ============================================================================
// Local outlier probabilities
// ============================================================================

/// LoOP score for every point, indexed by id.
///
/// `k` is clamped to `[1, n - 1]`. Fewer than two points score zero.
pub fn outlier_scores<T: Float + Send + Sync>(
    tree: &NdTree<T, usize>,
    x: &[T],
    y: &[T],
    k: usize,
    lambda: T,
) -> Vec<T> {
    let n = x.len();
    if n < 2 {
        return vec![T::zero(); n];
    }
    let k = k.clamp(1, n - 1);
    let metric = DistanceMetric::SquaredEuclidean;
    let ids: Vec<usize> = (0..n).collect();

    // Context sets with squared distances, self excluded.
    let contexts: Vec<Vec<(usize, T)>> = map_ids(&ids, |i| {
        tree.k_nearest(&[x[i], y[i]], k + 1, &metric)
            .into_iter()
            .filter(|&(&id, _)| id != i)
            .take(k)
            .map(|(&id, d2)| (id, d2))
            .collect()
    });

    let pdist: Vec<T> = contexts
        .iter()
        .map(|context| lambda * mean(context.iter().map(|&(_, d2)| d2)).sqrt())
        .collect();

    let plof: Vec<T> = contexts
        .iter()
        .zip(pdist.iter())
        .map(|(context, &own)| {
            let expected = mean(context.iter().map(|&(id, _)| pdist[id]));
            if expected > T::zero() {
                own / expected - T::one()
            } else {
                T::zero()
            }
        })
        .collect();

    let nplof = lambda * mean(plof.iter().map(|&p| p * p)).sqrt();
    if !(nplof > T::zero()) {
        return vec![T::zero(); n];
    }
    let scale = nplof * T::from(core::f64::consts::SQRT_2).unwrap_or_else(T::one);
    plof.iter()
        .map(|&p| erf(p / scale).max(T::zero()))
        .collect()
}

fn mean<T: Float>(values: impl Iterator<Item = T>) -> T {
    let (sum, count) = values.fold((T::zero(), 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return T::zero();
    }
    sum / T::from(count).unwrap_or_else(T::one)
}
