//! Flat clusterings from an OPTICS cluster order.
//!
//! Thresholding the reachability plot at `ε' ≤ ε` reproduces a DBSCAN
//! clustering at `ε'` up to the assignment of border points that are
//! density-reachable from more than one cluster.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

use crate::algorithms::optics::OpticsRecord;

/// Label points by cutting the cluster order at `threshold`.
///
/// Returns labels indexed by point id (0 = noise) and the cluster count.
/// A record whose reachability is undefined or above the threshold starts a
/// new cluster when its core distance is within the threshold and is noise
/// otherwise; any other record joins the current cluster.
pub fn extract_dbscan<T: Float>(order: &[OpticsRecord<T>], threshold: T) -> (Vec<usize>, usize) {
    let n = order.iter().map(|r| r.id + 1).max().unwrap_or(0);
    let mut labels = vec![0; n];
    let mut clusters = 0;
    let mut current = 0;

    for record in order {
        let reachable = record.reachability.is_some_and(|r| r <= threshold);
        if reachable {
            labels[record.id] = current;
            continue;
        }
        if record.core_distance.is_some_and(|c| c <= threshold) {
            clusters += 1;
            current = clusters;
            labels[record.id] = current;
        } else {
            current = 0;
        }
    }
    (labels, clusters)
}

/// Number of members per cluster; index 0 counts noise.
pub fn cluster_sizes(labels: &[usize], clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; clusters + 1];
    for &label in labels {
        if label < sizes.len() {
            sizes[label] += 1;
        }
    }
    sizes
}
