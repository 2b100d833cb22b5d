//! Result types returned by the clustering engine.
//!
//! ## Purpose
//!
//! This module wraps the raw records produced by the algorithms together
//! with the parameters that produced them, and offers the common views
//! callers need: per-id arrays, the reachability profile, flat cluster
//! extraction and human-readable summaries.
//!
//! ## Design notes
//!
//! * **Per-id views**: The cluster order is stored in visitation order;
//!   per-id accessors scatter it back into input order.
//! * **Display**: Every result prints a `Summary:` block followed by a
//!   table, in the same layout for all result kinds.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::fmt::{self, Display, Formatter};
use num_traits::Float;

use crate::algorithms::dbscan::DbscanRecord;
use crate::algorithms::extraction::{cluster_sizes, extract_dbscan};
use crate::algorithms::optics::OpticsRecord;
use crate::index::SpaceStrategy;

/// Rows printed by `Display` before the table is elided.
const DISPLAY_ROWS: usize = 10;

// ============================================================================
// Cluster assignment
// ============================================================================

/// Flat clustering: one label per point id (0 = noise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    /// Label per point id.
    pub labels: Vec<usize>,
    /// Number of clusters; labels run from 1 to this value.
    pub cluster_count: usize,
}

impl ClusterAssignment {
    /// Wrap labels and a cluster count.
    pub fn new(labels: Vec<usize>, cluster_count: usize) -> Self {
        Self {
            labels,
            cluster_count,
        }
    }

    /// Number of labelled points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no points are labelled.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Points labelled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 0).count()
    }

    /// Members per cluster; index 0 counts noise.
    pub fn sizes(&self) -> Vec<usize> {
        cluster_sizes(&self.labels, self.cluster_count)
    }

    /// Ids of the points labelled `cluster`, ascending.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == cluster)
            .map(|(id, _)| id)
            .collect()
    }

    /// Relabel clusters in order of their smallest member id.
    ///
    /// Two assignments describing the same partition compare equal after
    /// canonicalisation regardless of discovery order.
    pub fn canonical(&self) -> Self {
        let mut mapping = vec![0; self.cluster_count + 1];
        let mut next = 0;
        let labels = self
            .labels
            .iter()
            .map(|&l| {
                if l == 0 {
                    return 0;
                }
                if mapping[l] == 0 {
                    next += 1;
                    mapping[l] = next;
                }
                mapping[l]
            })
            .collect();
        Self::new(labels, next)
    }
}

impl Display for ClusterAssignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Data points: {}", self.labels.len())?;
        writeln!(f, "  Clusters: {}", self.cluster_count)?;
        writeln!(f, "  Noise: {}", self.noise_count())?;
        writeln!(f)?;
        writeln!(f, "Cluster Sizes:")?;
        writeln!(f, "  {:>8} {:>8}", "Cluster", "Size")?;
        writeln!(f, "  -----------------")?;
        for (cluster, size) in self.sizes().iter().enumerate().skip(1) {
            writeln!(f, "  {:>8} {:>8}", cluster, size)?;
        }
        Ok(())
    }
}

// ============================================================================
// OPTICS result
// ============================================================================

/// Cluster order produced by OPTICS or FastOPTICS.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticsResult<T> {
    /// Records in visitation order.
    pub order: Vec<OpticsRecord<T>>,
    /// Generating distance actually used (+∞ for FastOPTICS).
    pub generating_distance: T,
    /// Minimum neighbourhood size after clamping.
    pub min_points: usize,
    /// Index strategy used.
    pub strategy: SpaceStrategy,
}

impl<T: Float> OpticsResult<T> {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the input was empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Point ids in cluster order.
    pub fn ids(&self) -> Vec<usize> {
        self.order.iter().map(|r| r.id).collect()
    }

    /// Reachability distances in cluster order; undefined is `+∞`.
    pub fn reachability_profile(&self) -> Vec<T> {
        self.order
            .iter()
            .map(|r| r.reachability.unwrap_or_else(T::infinity))
            .collect()
    }

    /// Core distance per point id.
    pub fn core_distances(&self) -> Vec<Option<T>> {
        let mut out = vec![None; self.order.len()];
        for r in &self.order {
            out[r.id] = r.core_distance;
        }
        out
    }

    /// Predecessor per point id.
    pub fn predecessors(&self) -> Vec<Option<usize>> {
        let mut out = vec![None; self.order.len()];
        for r in &self.order {
            out[r.id] = r.predecessor;
        }
        out
    }

    /// Number of core points.
    pub fn core_count(&self) -> usize {
        self.order.iter().filter(|r| r.is_core()).count()
    }

    /// Flat clustering at `threshold`, clamped to the generating distance.
    pub fn extract_dbscan_clustering(&self, threshold: T) -> ClusterAssignment {
        let threshold = threshold.min(self.generating_distance);
        let (labels, clusters) = extract_dbscan(&self.order, threshold);
        ClusterAssignment::new(labels, clusters)
    }
}

impl<T: Float + Display> Display for OpticsResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Data points: {}", self.order.len())?;
        writeln!(f, "  Generating distance: {}", self.generating_distance)?;
        writeln!(f, "  Min points: {}", self.min_points)?;
        writeln!(f, "  Index: {:?}", self.strategy)?;
        writeln!(f, "  Core points: {}", self.core_count())?;
        writeln!(f)?;
        writeln!(f, "Cluster Order:")?;
        writeln!(
            f,
            "  {:>8} {:>12} {:>12} {:>8}",
            "Id", "Reach", "Core", "Pred"
        )?;
        writeln!(f, "  ------------------------------------------")?;
        for r in self.order.iter().take(DISPLAY_ROWS) {
            write!(f, "  {:>8} ", r.id)?;
            match r.reachability {
                Some(d) => write!(f, "{:>12.5} ", d)?,
                None => write!(f, "{:>12} ", "undefined")?,
            }
            match r.core_distance {
                Some(d) => write!(f, "{:>12.5} ", d)?,
                None => write!(f, "{:>12} ", "undefined")?,
            }
            match r.predecessor {
                Some(p) => writeln!(f, "{:>8}", p)?,
                None => writeln!(f, "{:>8}", "-")?,
            }
        }
        if self.order.len() > DISPLAY_ROWS {
            writeln!(f, "  ... ({} more)", self.order.len() - DISPLAY_ROWS)?;
        }
        Ok(())
    }
}

// ============================================================================
// DBSCAN result
// ============================================================================

/// Labels produced by DBSCAN.
#[derive(Debug, Clone, PartialEq)]
pub struct DbscanResult<T> {
    /// Records in evaluation order.
    pub records: Vec<DbscanRecord>,
    /// Labels per point id.
    pub assignment: ClusterAssignment,
    /// Generating distance actually used.
    pub generating_distance: T,
    /// Minimum neighbourhood size after clamping.
    pub min_points: usize,
    /// Index strategy used.
    pub strategy: SpaceStrategy,
}

impl<T: Float> DbscanResult<T> {
    /// Number of clusters found.
    pub fn cluster_count(&self) -> usize {
        self.assignment.cluster_count
    }

    /// Label per point id (0 = noise).
    pub fn labels(&self) -> &[usize] {
        &self.assignment.labels
    }

    /// Points labelled as noise.
    pub fn noise_count(&self) -> usize {
        self.assignment.noise_count()
    }
}

impl<T: Float + Display> Display for DbscanResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generating distance: {}", self.generating_distance)?;
        writeln!(f, "Min points: {}", self.min_points)?;
        writeln!(f, "Index: {:?}", self.strategy)?;
        writeln!(f)?;
        write!(f, "{}", self.assignment)
    }
}

// ============================================================================
// k-distances
// ============================================================================

/// Sorted k-th neighbour distances.
#[derive(Debug, Clone, PartialEq)]
pub struct KDistances<T> {
    /// Neighbour rank (self included).
    pub k: usize,
    /// Distances, descending.
    pub distances: Vec<T>,
}

impl<T: Float> KDistances<T> {
    /// Distance at quantile `q` of the descending curve, `q` in `[0, 1]`.
    pub fn at_quantile(&self, q: T) -> Option<T> {
        let last = self.distances.len().checked_sub(1)?;
        let q = q.max(T::zero()).min(T::one());
        let pos = (q * T::from(last)?).round().to_usize()?;
        self.distances.get(pos.min(last)).copied()
    }
}

impl<T: Float + Display> Display for KDistances<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Samples: {}", self.distances.len())?;
        writeln!(f, "  k: {}", self.k)?;
        if let (Some(max), Some(min)) = (self.distances.first(), self.distances.last()) {
            writeln!(f, "  Max: {:.5}", max)?;
            writeln!(f, "  Min: {:.5}", min)?;
        }
        Ok(())
    }
}

// ============================================================================
// Outlier scores
// ============================================================================

/// Local outlier probabilities per point id.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierScores<T> {
    /// Context size.
    pub k: usize,
    /// Significance multiplier.
    pub lambda: T,
    /// Score in `[0, 1]` per point id.
    pub scores: Vec<T>,
}

impl<T: Float> OutlierScores<T> {
    /// Ids whose score exceeds `threshold`, ascending.
    pub fn outliers(&self, threshold: T) -> Vec<usize> {
        self.scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s > threshold)
            .map(|(id, _)| id)
            .collect()
    }
}

impl<T: Float + Display> Display for OutlierScores<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Data points: {}", self.scores.len())?;
        writeln!(f, "  k: {}", self.k)?;
        writeln!(f, "  Lambda: {}", self.lambda)?;
        writeln!(f)?;
        writeln!(f, "Scores:")?;
        writeln!(f, "  {:>8} {:>10}", "Id", "LoOP")?;
        writeln!(f, "  -------------------")?;
        for (id, s) in self.scores.iter().enumerate().take(DISPLAY_ROWS) {
            writeln!(f, "  {:>8} {:>10.5}", id, s)?;
        }
        if self.scores.len() > DISPLAY_ROWS {
            writeln!(f, "  ... ({} more)", self.scores.len() - DISPLAY_ROWS)?;
        }
        Ok(())
    }
}
