#![cfg(feature = "dev")]

use optics_rs::internals::algorithms::dbscan::{run_dbscan, DbscanBuffer, DbscanRecord};
use optics_rs::internals::algorithms::extraction::extract_dbscan;
use optics_rs::internals::algorithms::optics::{run_optics, OpticsBuffer};
use optics_rs::internals::algorithms::seeds::{QueueKind, SeedQueue, TieBreak};
use optics_rs::internals::index::grid::GridSpace;
use optics_rs::internals::index::radial::{InnerRadialSpace, RadialSpace};
use optics_rs::internals::index::MoleculeSpace;
use optics_rs::internals::primitives::molecule::Molecule;
use optics_rs::internals::primitives::progress::{LogTracker, NullTracker};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn molecules(x: &[f64], y: &[f64]) -> Vec<Molecule<f64>> {
    (0..x.len()).map(|i| Molecule::new(i, x[i], y[i])).collect()
}

fn dbscan(
    space: &dyn MoleculeSpace<f64>,
    x: &[f64],
    y: &[f64],
    min_points: usize,
) -> (Vec<usize>, Vec<DbscanRecord>, usize) {
    let mut m = molecules(x, y);
    let mut buffer = DbscanBuffer::new();
    let (records, clusters) = run_dbscan(space, &mut m, min_points, &mut buffer, &NullTracker).unwrap();
    let labels = m.iter().map(|m| m.cluster_id).collect();
    (labels, records, clusters)
}

fn scattered(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let x = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
    let y = (0..n).map(|_| rng.random_range(0.0..10.0)).collect();
    (x, y)
}

/// Relabel so clusters are numbered by their smallest member id.
fn canonical(labels: &[usize]) -> Vec<usize> {
    let mut mapping = std::collections::HashMap::new();
    labels
        .iter()
        .map(|&l| {
            if l == 0 {
                return 0;
            }
            let next = mapping.len() + 1;
            *mapping.entry(l).or_insert(next)
        })
        .collect()
}

fn is_core(x: &[f64], y: &[f64], i: usize, r: f64, min_points: usize) -> bool {
    (0..x.len())
        .filter(|&j| {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            dx * dx + dy * dy <= r * r
        })
        .count()
        >= min_points
}

// ============================================================================
// DBSCAN Tests
// ============================================================================

#[test]
fn test_two_triangles() {
    let x = vec![0.0, 0.0, 1.0, 10.0, 10.0, 11.0];
    let y = vec![0.0, 1.0, 0.0, 10.0, 11.0, 10.0];
    let space = GridSpace::new(&x, &y, 2.0, 1);
    let (labels, records, clusters) = dbscan(&space, &x, &y, 2);

    assert_eq!(clusters, 2);
    assert_eq!(labels, vec![1, 1, 1, 2, 2, 2]);
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.neighbour_count == 3));
    assert!(records.iter().all(|r| r.cluster_id == labels[r.id]));
}

#[test]
fn test_every_point_evaluated_once() {
    let (x, y) = scattered(400, 1);
    let space = GridSpace::new(&x, &y, 0.6, 2);
    let (_, records, _) = dbscan(&space, &x, &y, 4);

    let mut seen = vec![false; x.len()];
    for r in &records {
        assert!(!seen[r.id]);
        seen[r.id] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn test_core_points_are_labelled_and_noise_is_isolated() {
    let (x, y) = scattered(300, 2);
    let r = 0.7;
    let min_points = 5;
    let space = GridSpace::new(&x, &y, r, 2);
    let (labels, _, clusters) = dbscan(&space, &x, &y, min_points);

    for i in 0..x.len() {
        if is_core(&x, &y, i, r, min_points) {
            assert_ne!(labels[i], 0, "core point {} labelled noise", i);
        }
        if labels[i] == 0 {
            // Noise has no core point within r
            for j in 0..x.len() {
                let d2 = (x[i] - x[j]).powi(2) + (y[i] - y[j]).powi(2);
                if d2 <= r * r {
                    assert!(!is_core(&x, &y, j, r, min_points));
                }
            }
        }
        assert!(labels[i] <= clusters);
    }
}

#[test]
fn test_spaces_agree() {
    let (x, y) = scattered(500, 3);
    let r = 0.8;
    let grid = GridSpace::new(&x, &y, r, 3);
    let radial = RadialSpace::new(&x, &y, r, 3);
    let inner = InnerRadialSpace::new(&x, &y, r, 3);

    let (reference, _, clusters) = dbscan(&grid, &x, &y, 6);
    let (labels_r, _, clusters_r) = dbscan(&radial, &x, &y, 6);
    let (labels_i, _, clusters_i) = dbscan(&inner, &x, &y, 6);
    assert_eq!(clusters, clusters_r);
    assert_eq!(clusters, clusters_i);
    assert_eq!(canonical(&reference), canonical(&labels_r));
    assert_eq!(canonical(&reference), canonical(&labels_i));
}

#[test]
fn test_agrees_with_optics_extraction_on_core_points() {
    let (x, y) = scattered(400, 4);
    let r = 0.7;
    let min_points = 5;
    let space = GridSpace::new(&x, &y, r, 2);
    let (labels, _, _) = dbscan(&space, &x, &y, min_points);

    let mut m = molecules(&x, &y);
    let mut buffer = OpticsBuffer::new(SeedQueue::new(QueueKind::Heap, TieBreak::AscendingId));
    let order = run_optics(&space, &mut m, min_points, &mut buffer, &NullTracker).unwrap();
    let (extracted, _) = extract_dbscan(&order, r);

    let core: Vec<usize> = (0..x.len())
        .filter(|&i| is_core(&x, &y, i, r, min_points))
        .collect();
    let a: Vec<usize> = core.iter().map(|&i| labels[i]).collect();
    let b: Vec<usize> = core.iter().map(|&i| extracted[i]).collect();
    assert_eq!(canonical(&a), canonical(&b));
}

#[test]
fn test_min_points_one_makes_every_point_core() {
    let x = vec![0.0, 5.0, 10.0];
    let y = vec![0.0, 0.0, 0.0];
    let space = GridSpace::new(&x, &y, 1.0, 1);
    let (labels, _, clusters) = dbscan(&space, &x, &y, 0);
    assert_eq!(clusters, 3);
    assert_eq!(labels, vec![1, 2, 3]);
}

#[test]
fn test_cancelled_run_is_aborted() {
    let (x, y) = scattered(50, 5);
    let space = GridSpace::new(&x, &y, 1.0, 1);
    let mut m = molecules(&x, &y);
    let mut buffer = DbscanBuffer::new();
    let tracker = LogTracker::new();
    tracker.cancel();
    assert!(run_dbscan(&space, &mut m, 3, &mut buffer, &tracker).is_err());
}
