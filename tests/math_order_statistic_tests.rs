#![cfg(feature = "dev")]

use optics_rs::internals::math::order_statistic::KthSmallest;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn sorted_kth(values: &[f64], k: usize) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sorted[k - 1]
}

#[test]
fn test_kth_smallest_basic() {
    let mut heap = KthSmallest::new();
    let values = [5.0, 1.0, 4.0, 2.0, 3.0];
    assert_eq!(heap.kth_smallest(1, &values), Some(1.0));
    assert_eq!(heap.kth_smallest(2, &values), Some(2.0));
    assert_eq!(heap.kth_smallest(5, &values), Some(5.0));
}

#[test]
fn test_kth_smallest_insufficient_values() {
    let mut heap = KthSmallest::<f64>::new();
    assert_eq!(heap.kth_smallest(4, &[1.0, 2.0, 3.0]), None);
    assert_eq!(heap.kth_smallest(1, &[]), None);
}

#[test]
fn test_kth_smallest_zero_rank_is_minimum() {
    let mut heap = KthSmallest::new();
    assert_eq!(heap.kth_smallest(0, &[3.0, 1.0, 2.0]), Some(1.0));
}

#[test]
fn test_kth_smallest_with_duplicates() {
    let mut heap = KthSmallest::new();
    let values = [2.0, 2.0, 0.0, 0.0, 0.0, 7.0];
    assert_eq!(heap.kth_smallest(3, &values), Some(0.0));
    assert_eq!(heap.kth_smallest(4, &values), Some(2.0));
}

#[test]
fn test_kth_smallest_matches_sort() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut heap = KthSmallest::new();
    for _ in 0..50 {
        let n = rng.random_range(1..200);
        let values: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..100.0)).collect();
        let k = rng.random_range(1..=n);
        assert_eq!(heap.kth_smallest(k, &values), Some(sorted_kth(&values, k)));
    }
}

#[test]
fn test_kth_smallest_reuse_does_not_leak_state() {
    let mut heap = KthSmallest::new();
    assert_eq!(heap.kth_smallest(2, &[10.0, 20.0, 30.0, 40.0]), Some(20.0));
    assert_eq!(heap.kth_smallest(2, &[1.0, 0.5, 3.0]), Some(1.0));
}
