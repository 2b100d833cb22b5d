#![cfg(feature = "dev")]

use optics_rs::internals::algorithms::fast_optics::{
    build_projected_sequential, merge_accumulators, partition_directions,
};
use optics_rs::internals::algorithms::optics::{run_optics, OpticsBuffer};
use optics_rs::internals::algorithms::seeds::{QueueKind, SeedQueue, TieBreak};
use optics_rs::internals::index::projected::{random_directions, ProjectionAccumulator};
use optics_rs::internals::primitives::errors::OpticsError;
use optics_rs::internals::primitives::molecule::Molecule;
use optics_rs::internals::primitives::progress::{LogTracker, NullTracker};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn two_blobs(seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut x = Vec::new();
    let mut y = Vec::new();
    for &(cx, cy) in &[(0.0, 0.0), (50.0, 50.0)] {
        for _ in 0..80 {
            x.push(cx + rng.random_range(-1.0..1.0));
            y.push(cy + rng.random_range(-1.0..1.0));
        }
    }
    (x, y)
}

fn molecules(x: &[f64], y: &[f64]) -> Vec<Molecule<f64>> {
    (0..x.len()).map(|i| Molecule::new(i, x[i], y[i])).collect()
}

// ============================================================================
// Partitioning Tests
// ============================================================================

#[test]
fn test_partition_directions() {
    let dirs: Vec<[f64; 2]> = random_directions(10, 0);
    let parts = partition_directions(&dirs, 3);
    assert_eq!(parts.len(), 3);
    assert_eq!(parts.iter().map(|p| p.len()).sum::<usize>(), 10);
    assert!(parts.iter().all(|p| !p.is_empty()));

    assert_eq!(partition_directions(&dirs, 0).len(), 1);
    assert_eq!(partition_directions(&dirs, 50).len(), 10);
    assert!(partition_directions::<f64>(&[], 4).is_empty());
}

#[test]
fn test_merge_accumulators_first_error_wins() {
    let results = vec![
        Ok(ProjectionAccumulator::<f64>::new(3)),
        Err(OpticsError::Aborted),
        Err(OpticsError::InvalidParameter("later".into())),
    ];
    assert_eq!(merge_accumulators(3, results).unwrap_err(), OpticsError::Aborted);
}

// ============================================================================
// Neighbourhood Determinism
// ============================================================================

#[test]
fn test_neighbourhoods_independent_of_task_count() {
    let (x, y) = two_blobs(1);
    let dirs = random_directions(30, 7);
    let one = build_projected_sequential(&x, &y, &dirs, 1, 5, &NullTracker).unwrap();
    let four = build_projected_sequential(&x, &y, &dirs, 4, 5, &NullTracker).unwrap();
    for i in 0..x.len() {
        assert_eq!(one.neighbours_of(i), four.neighbours_of(i));
        let a = one.average_distance(i).unwrap();
        let b = four.average_distance(i).unwrap();
        assert!((a - b).abs() <= 1e-9 * a.max(1.0));
    }
}

#[cfg(feature = "std")]
#[test]
fn test_parallel_matches_sequential_neighbourhoods() {
    use optics_rs::internals::algorithms::fast_optics::build_projected_parallel;

    let (x, y) = two_blobs(2);
    let dirs = random_directions(20, 3);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(3)
        .build()
        .unwrap();
    let parallel = build_projected_parallel(&pool, &x, &y, &dirs, 4, &NullTracker).unwrap();
    let sequential = build_projected_sequential(&x, &y, &dirs, 3, 4, &NullTracker).unwrap();
    for i in 0..x.len() {
        assert_eq!(parallel.neighbours_of(i), sequential.neighbours_of(i));
    }
}

#[test]
fn test_cancelled_projection_is_aborted() {
    let (x, y) = two_blobs(3);
    let dirs = random_directions(8, 0);
    let tracker = LogTracker::new();
    tracker.cancel();
    let result = build_projected_sequential(&x, &y, &dirs, 2, 4, &tracker);
    assert_eq!(result.unwrap_err(), OpticsError::Aborted);
}

// ============================================================================
// Ordering Tests
// ============================================================================

#[test]
fn test_fast_optics_separates_blobs() {
    let (x, y) = two_blobs(4);
    let dirs = random_directions(40, 11);
    let space = build_projected_sequential(&x, &y, &dirs, 1, 5, &NullTracker).unwrap();
    let mut m = molecules(&x, &y);
    let mut buffer = OpticsBuffer::new(SeedQueue::new(QueueKind::Heap, TieBreak::AscendingId));
    let order = run_optics(&space, &mut m, 5, &mut buffer, &NullTracker).unwrap();

    assert_eq!(order.len(), x.len());
    let mut seen = vec![false; x.len()];
    for r in &order {
        assert!(!seen[r.id]);
        seen[r.id] = true;
    }

    // The order finishes one blob before jumping to the other
    let jumps = order
        .iter()
        .filter(|r| r.predecessor.is_some_and(|p| (p < 80) != (r.id < 80)))
        .count();
    assert!(jumps <= 1);
    let first_blob = order[0].id < 80;
    assert!(order[..80].iter().all(|r| (r.id < 80) == first_blob));
}

#[test]
fn test_fast_optics_seeded_is_reproducible() {
    let (x, y) = two_blobs(5);
    let run = || {
        let dirs = random_directions(25, 99);
        let space = build_projected_sequential(&x, &y, &dirs, 1, 4, &NullTracker).unwrap();
        let mut m = molecules(&x, &y);
        let mut buffer =
            OpticsBuffer::new(SeedQueue::new(QueueKind::Heap, TieBreak::AscendingId));
        run_optics(&space, &mut m, 4, &mut buffer, &NullTracker).unwrap()
    };
    assert_eq!(run(), run());
}
