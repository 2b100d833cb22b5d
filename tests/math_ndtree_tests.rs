#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use optics_rs::internals::math::distance::{DistanceMetric, PointDistance};
use optics_rs::internals::math::ndtree::{NdSearchBuffer, NdTree};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_tree(n: usize, seed: u64) -> (NdTree<f64, usize>, Vec<[f64; 2]>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tree = NdTree::new(2);
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let p = [rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)];
        tree.add(&p, i).unwrap();
        points.push(p);
    }
    (tree, points)
}

fn brute_force_sorted(points: &[[f64; 2]], query: &[f64; 2]) -> Vec<f64> {
    let mut d: Vec<f64> = points
        .iter()
        .map(|p| DistanceMetric::euclidean(p, query))
        .collect();
    d.sort_by(|a, b| a.partial_cmp(b).unwrap());
    d
}

// ============================================================================
// Structure Tests
// ============================================================================

#[test]
fn test_empty_tree() {
    let tree: NdTree<f64, usize> = NdTree::new(2);
    assert!(tree.is_empty());
    assert!(tree
        .nearest_neighbour(&[0.0, 0.0], &DistanceMetric::Euclidean)
        .is_none());
    assert!(tree.k_nearest(&[0.0, 0.0], 3, &DistanceMetric::Euclidean).is_empty());
}

#[test]
fn test_insertion_splits_and_stays_consistent() {
    let (tree, _) = random_tree(1000, 7);
    assert_eq!(tree.len(), 1000);
    assert!(tree.node_count() > 1);
    assert!(tree.is_consistent());
}

#[test]
fn test_dimension_mismatch_is_error() {
    let mut tree: NdTree<f64, usize> = NdTree::new(2);
    assert!(tree.add(&[1.0, 2.0, 3.0], 0).is_err());
    assert!(tree.is_empty());
}

#[test]
fn test_identical_points_grow_bucket() {
    let mut tree = NdTree::with_bucket_size(2, 4);
    for i in 0..50 {
        tree.add(&[1.0, 1.0], i).unwrap();
    }
    assert_eq!(tree.len(), 50);
    assert!(tree.is_consistent());
    let found = tree.k_nearest(&[1.0, 1.0], 50, &DistanceMetric::Euclidean);
    assert_eq!(found.len(), 50);
}

#[test]
fn test_add_if_absent() {
    let mut tree = NdTree::new(2);
    assert!(tree.add_if_absent(&[1.0, 2.0], 0).unwrap());
    assert!(!tree.add_if_absent(&[1.0, 2.0], 1).unwrap());
    assert!(!tree.add_if_absent(&[1.0, 2.0f64], 2).unwrap());
    assert!(tree.add_if_absent(&[1.0, 2.5], 3).unwrap());
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_add_if_absent_signed_zero_and_nan() {
    let mut tree = NdTree::new(2);
    assert!(tree.add_if_absent(&[0.0, 1.0], 0).unwrap());
    assert!(!tree.add_if_absent(&[-0.0, 1.0], 1).unwrap());
    assert!(tree.add_if_absent(&[f64::NAN, 1.0], 2).unwrap());
    assert!(!tree.add_if_absent(&[f64::NAN, 1.0], 3).unwrap());
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_weights_length_must_match() {
    let tree: NdTree<f64, usize> = NdTree::new(2);
    assert!(tree.with_weights(vec![1.0]).is_err());
    let tree: NdTree<f64, usize> = NdTree::new(2);
    assert!(tree.with_weights(vec![1.0, 0.5]).is_ok());
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_k_nearest_matches_brute_force() {
    let (tree, points) = random_tree(500, 11);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..25 {
        let q = [rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0)];
        let expected = brute_force_sorted(&points, &q);
        let found = tree.k_nearest(&q, 10, &DistanceMetric::Euclidean);
        assert_eq!(found.len(), 10);
        for (i, (_, d)) in found.iter().enumerate() {
            assert_relative_eq!(*d, expected[i], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_nearest_neighbours_sorted_and_unsorted() {
    let (tree, _) = random_tree(300, 3);
    let metric = DistanceMetric::SquaredEuclidean;
    let mut buffer = NdSearchBuffer::new(8);
    let q = [0.0, 0.0];

    let mut sorted = Vec::new();
    let n = tree.nearest_neighbours(&q, 8, true, &metric, &mut buffer, |&v, d| {
        sorted.push((v, d))
    });
    assert_eq!(n, 8);
    assert!(sorted.windows(2).all(|w| w[0].1 <= w[1].1));

    let mut unsorted = Vec::new();
    tree.nearest_neighbours(&q, 8, false, &metric, &mut buffer, |&v, d| {
        unsorted.push((v, d))
    });
    let mut ids_sorted: Vec<usize> = sorted.iter().map(|&(v, _)| v).collect();
    let mut ids_unsorted: Vec<usize> = unsorted.iter().map(|&(v, _)| v).collect();
    ids_sorted.sort_unstable();
    ids_unsorted.sort_unstable();
    assert_eq!(ids_sorted, ids_unsorted);
}

#[test]
fn test_nearest_neighbour_returns_closest() {
    let mut tree = NdTree::new(2);
    tree.add(&[0.0, 0.0], "origin").unwrap();
    tree.add(&[5.0, 5.0], "far").unwrap();
    tree.add(&[1.0, 0.5], "near").unwrap();

    let (value, d) = tree
        .nearest_neighbour(&[0.9, 0.6], &DistanceMetric::Euclidean)
        .unwrap();
    assert_eq!(*value, "near");
    assert_relative_eq!(d, (0.01f64 + 0.01).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_nearest_neighbour_all_nan_is_none() {
    let mut tree = NdTree::new(2);
    tree.add(&[1.0, 1.0], 0usize).unwrap();
    tree.add(&[2.0, 2.0], 1usize).unwrap();
    assert!(tree
        .nearest_neighbour(&[f64::NAN, 0.0], &DistanceMetric::Euclidean)
        .is_none());
}

#[test]
fn test_find_neighbours_inclusive_range() {
    let (tree, points) = random_tree(400, 21);
    let metric = DistanceMetric::Euclidean;
    let mut buffer = NdSearchBuffer::new(0);
    let q = points[17];
    let range = 8.0;

    let mut found = Vec::new();
    let count = tree.find_neighbours(&q, range, &metric, &mut buffer, |&v, d| {
        found.push((v, d))
    });

    let expected: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| metric.distance(&q, &p[..]) <= range)
        .map(|(i, _)| i)
        .collect();
    let mut ids: Vec<usize> = found.iter().map(|&(v, _)| v).collect();
    ids.sort_unstable();
    assert_eq!(count, expected.len());
    assert_eq!(ids, expected);
    assert!(ids.contains(&17));
}

#[test]
fn test_find_neighbours_exact_boundary_included() {
    let mut tree = NdTree::new(2);
    tree.add(&[0.0, 0.0], 0usize).unwrap();
    tree.add(&[3.0, 4.0], 1usize).unwrap();
    let mut buffer = NdSearchBuffer::new(0);
    let count = tree.find_neighbours(
        &[0.0, 0.0],
        5.0,
        &DistanceMetric::Euclidean,
        &mut buffer,
        |_, _| {},
    );
    assert_eq!(count, 2);
}

// ============================================================================
// Multi-dimensional and Degenerate Coordinate Tests
// ============================================================================

fn random_points(n: usize, dims: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..dims).map(|_| rng.random_range(-10.0..10.0)).collect())
        .collect()
}

#[test]
fn test_round_trip_nearest_is_self() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for dims in 2..=5 {
        let points = random_points(200, dims, &mut rng);
        let mut tree = NdTree::new(dims);
        for (i, p) in points.iter().enumerate() {
            tree.add(p, i).unwrap();
        }
        assert!(tree.is_consistent());
        for (i, p) in points.iter().enumerate() {
            let (&value, d) = tree
                .nearest_neighbour(p, &DistanceMetric::Euclidean)
                .unwrap();
            assert_eq!(value, i);
            assert_eq!(d, 0.0);
        }
    }
}

#[test]
fn test_nearest_neighbours_matches_brute_force_by_id() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let metric = DistanceMetric::Euclidean;
    for dims in 2..=5 {
        let points = random_points(200, dims, &mut rng);
        let mut tree = NdTree::new(dims);
        for (i, p) in points.iter().enumerate() {
            tree.add(p, i).unwrap();
        }
        let mut buffer = NdSearchBuffer::new(5);

        for _ in 0..50 {
            let q: Vec<f64> = (0..dims).map(|_| rng.random_range(-12.0..12.0)).collect();
            let mut expected: Vec<(usize, f64)> = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i, metric.distance(&q, p)))
                .collect();
            expected.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            expected.truncate(5);

            let mut found = Vec::new();
            let n = tree.nearest_neighbours(&q, 5, true, &metric, &mut buffer, |&v, d| {
                found.push((v, d))
            });
            assert_eq!(n, 5);
            for ((id, d), (eid, ed)) in found.iter().zip(&expected) {
                assert_eq!(id, eid, "dims {}", dims);
                assert_relative_eq!(*d, *ed, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_split_with_infinite_and_nan_coordinates() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    let mut tree = NdTree::new(2);
    // Infinite and extreme values first so the root splits before bounds turn NaN
    for i in 0..240 {
        let y = rng.random_range(-5.0..5.0);
        let p = match i % 8 {
            0 => [f64::INFINITY, y],
            1 => [f64::NEG_INFINITY, y],
            2 => [f64::MAX, y],
            _ => [rng.random_range(-5.0..5.0), y],
        };
        tree.add(&p, i).unwrap();
    }
    for i in 240..300 {
        let v = rng.random_range(-5.0..5.0);
        let p = if i % 2 == 0 { [f64::NAN, v] } else { [v, f64::NAN] };
        tree.add(&p, i).unwrap();
    }
    assert_eq!(tree.len(), 300);
    assert!(tree.node_count() > 1);
    assert!(tree.is_consistent());

    let found = tree.k_nearest(&[0.0, 0.0], 10, &DistanceMetric::Euclidean);
    assert_eq!(found.len(), 10);
    assert!(found.iter().all(|(_, d)| d.is_finite()));
}

#[test]
fn test_split_value_equal_to_max_is_moved_to_min() {
    // Midpoint of two adjacent floats rounds up to the larger one
    let lo = 1.0 + f64::EPSILON;
    let hi = 1.0 + 2.0 * f64::EPSILON;
    let mut tree = NdTree::with_bucket_size(2, 4);
    for i in 0..40 {
        let x = if i % 2 == 0 { lo } else { hi };
        tree.add(&[x, 0.0], i).unwrap();
    }
    assert_eq!(tree.len(), 40);
    assert!(tree.node_count() > 1);
    assert!(tree.is_consistent());

    let metric = DistanceMetric::Euclidean;
    let mut buffer = NdSearchBuffer::new(0);
    let at_hi = tree.find_neighbours(&[hi, 0.0], 0.0, &metric, &mut buffer, |_, _| {});
    let at_lo = tree.find_neighbours(&[lo, 0.0], 0.0, &metric, &mut buffer, |_, _| {});
    assert_eq!(at_hi, 20);
    assert_eq!(at_lo, 20);
}
