#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use optics_rs::internals::algorithms::outliers::{
    build_point_tree, k_distances, outlier_scores, sample_ids, DEFAULT_LAMBDA,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn cluster_with_outlier() -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut x: Vec<f64> = (0..100).map(|_| rng.random_range(0.0..1.0)).collect();
    let mut y: Vec<f64> = (0..100).map(|_| rng.random_range(0.0..1.0)).collect();
    x.push(10.0);
    y.push(10.0);
    (x, y)
}

// ============================================================================
// k-distance Tests
// ============================================================================

#[test]
fn test_k_distances_line() {
    let x: Vec<f64> = vec![0.0, 1.0, 2.0, 3.0, 10.0];
    let y = vec![0.0; 5];
    let tree = build_point_tree(&x, &y).unwrap();
    let ids: Vec<usize> = (0..5).collect();

    // k = 1 is the point itself
    let d1 = k_distances(&tree, &x, &y, 1, &ids);
    assert!(d1.iter().all(|&d| d == 0.0));

    // k = 2: nearest other point, sorted descending
    let d2 = k_distances(&tree, &x, &y, 2, &ids);
    assert_eq!(d2.len(), 5);
    assert_relative_eq!(d2[0], 7.0);
    assert!(d2[1..].iter().all(|&d| (d - 1.0).abs() < 1e-12));
}

#[test]
fn test_k_distances_descending() {
    let (x, y) = cluster_with_outlier();
    let tree = build_point_tree(&x, &y).unwrap();
    let ids: Vec<usize> = (0..x.len()).collect();
    let d = k_distances(&tree, &x, &y, 5, &ids);
    assert!(d.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_k_larger_than_n_uses_farthest() {
    let x = vec![0.0, 3.0];
    let y = vec![0.0, 4.0];
    let tree = build_point_tree(&x, &y).unwrap();
    let d = k_distances(&tree, &x, &y, 10, &[0, 1]);
    assert_relative_eq!(d[0], 5.0);
    assert_relative_eq!(d[1], 5.0);
}

#[test]
fn test_sample_ids() {
    assert_eq!(sample_ids(5, None, 0), vec![0, 1, 2, 3, 4]);
    assert_eq!(sample_ids(5, Some(10), 0), vec![0, 1, 2, 3, 4]);

    let a = sample_ids(1000, Some(50), 3);
    let b = sample_ids(1000, Some(50), 3);
    assert_eq!(a, b);
    assert_eq!(a.len(), 50);
    assert!(a.windows(2).all(|w| w[0] < w[1]));
    assert!(a.iter().all(|&i| i < 1000));
}

// ============================================================================
// Outlier Score Tests
// ============================================================================

#[test]
fn test_outlier_scores_flag_isolated_point() {
    let (x, y) = cluster_with_outlier();
    let tree = build_point_tree(&x, &y).unwrap();
    let scores = outlier_scores(&tree, &x, &y, 10, DEFAULT_LAMBDA);

    assert_eq!(scores.len(), x.len());
    assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    let outlier = scores[100];
    assert!(outlier > 0.9, "outlier score {}", outlier);
    let max_inlier = scores[..100].iter().copied().fold(0.0, f64::max);
    assert!(outlier > max_inlier);
}

#[test]
fn test_outlier_scores_uniform_grid_symmetry() {
    let x: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
    let y: Vec<f64> = (0..100).map(|i| (i / 10) as f64).collect();
    let tree = build_point_tree(&x, &y).unwrap();
    let scores = outlier_scores(&tree, &x, &y, 8, DEFAULT_LAMBDA);

    // Corners are mirror images of each other
    for &corner in &[9, 90, 99] {
        assert_relative_eq!(scores[corner], scores[0], epsilon = 1e-9);
    }
    // A corner is less typical than the centre
    assert!(scores[0] > scores[44]);
}

#[test]
fn test_outlier_scores_degenerate_inputs() {
    let tree = build_point_tree(&[1.0], &[1.0]).unwrap();
    assert_eq!(outlier_scores(&tree, &[1.0], &[1.0], 5, 3.0), vec![0.0]);

    let x = vec![2.0; 6];
    let y = vec![2.0; 6];
    let tree = build_point_tree(&x, &y).unwrap();
    assert_eq!(outlier_scores(&tree, &x, &y, 3, 3.0), vec![0.0; 6]);
}
