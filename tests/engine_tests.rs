#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use optics_rs::internals::algorithms::optics::OpticsRecord;
use optics_rs::internals::engine::executor::resolve_generating_distance;
use optics_rs::internals::engine::output::{ClusterAssignment, KDistances, OpticsResult, OutlierScores};
use optics_rs::internals::engine::validator::Validator;
use optics_rs::internals::index::SpaceStrategy;
use optics_rs::internals::primitives::bounds::Rect;
use optics_rs::internals::primitives::errors::OpticsError;

// ============================================================================
// Validator Tests
// ============================================================================

#[test]
fn test_validate_inputs() {
    assert!(Validator::validate_inputs::<f64>(&[], &[]).is_ok());
    assert!(Validator::validate_inputs(&[1.0, 2.0], &[3.0, 4.0]).is_ok());
    assert_eq!(
        Validator::validate_inputs(&[1.0, 2.0], &[3.0]),
        Err(OpticsError::MismatchedInputs { x_len: 2, y_len: 1 })
    );
    assert!(matches!(
        Validator::validate_inputs(&[1.0, f64::NAN], &[3.0, 4.0]),
        Err(OpticsError::InvalidNumericValue(_))
    ));
    assert!(matches!(
        Validator::validate_inputs(&[1.0, 2.0], &[f64::INFINITY, 4.0]),
        Err(OpticsError::InvalidNumericValue(_))
    ));
}

#[test]
fn test_validate_bounds() {
    assert!(Validator::validate_bounds(&Rect::new(0.0, 0.0, 1.0, 1.0)).is_ok());
    assert!(Validator::validate_bounds(&Rect::new(0.0, 0.0, 0.0, 0.0)).is_ok());
    assert!(matches!(
        Validator::validate_bounds(&Rect::new(2.0, 0.0, 1.0, 1.0)),
        Err(OpticsError::InvalidBounds(_))
    ));
    assert!(matches!(
        Validator::validate_bounds(&Rect::new(0.0, f64::NAN, 1.0, 1.0)),
        Err(OpticsError::InvalidNumericValue(_))
    ));
}

#[test]
fn test_validate_options() {
    assert!(Validator::validate_threshold(20.0, "radial_threshold").is_ok());
    assert!(Validator::validate_threshold(0.0, "radial_threshold").is_err());
    assert!(Validator::validate_threshold(f64::NAN, "inner_threshold").is_err());
    assert!(Validator::validate_strategy(SpaceStrategy::Radial).is_ok());
    assert!(Validator::validate_strategy(SpaceStrategy::Projected).is_err());
    assert!(Validator::validate_lambda(3.0).is_ok());
    assert!(Validator::validate_lambda(-1.0).is_err());
    assert_eq!(
        Validator::validate_no_duplicates(Some("seed")),
        Err(OpticsError::DuplicateParameter { parameter: "seed" })
    );
    assert!(Validator::validate_no_duplicates(None).is_ok());
}

#[test]
fn test_lenient_clamping() {
    assert_eq!(Validator::clamp_min_points(0), 1);
    assert_eq!(Validator::clamp_min_points(7), 7);
    assert_eq!(Validator::clamp_resolution(0), 1);
    assert_eq!(Validator::clamp_resolution(100), 8);
    assert_eq!(Validator::clamp_resolution(3), 3);
    assert_eq!(Validator::clamp_k(0), 1);
    assert_eq!(Validator::clamp_k(4), 4);
    assert_eq!(Validator::clamp_threads(0), 1);
    assert_eq!(Validator::clamp_threads(3), 3);
}

// ============================================================================
// Generating Distance Tests
// ============================================================================

#[test]
fn test_resolve_explicit_distance() {
    let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(resolve_generating_distance(2.5, 4, 100, &bounds), 2.5);
}

#[test]
fn test_resolve_estimated_distance() {
    let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
    // sqrt((100 / 100) · 4 / π)
    let expected = (4.0 / core::f64::consts::PI).sqrt();
    assert_relative_eq!(resolve_generating_distance(0.0, 4, 100, &bounds), expected);
    assert_relative_eq!(resolve_generating_distance(-1.0, 4, 100, &bounds), expected);
    assert_relative_eq!(resolve_generating_distance(f64::NAN, 4, 100, &bounds), expected);
    assert_relative_eq!(
        resolve_generating_distance(f64::INFINITY, 4, 100, &bounds),
        expected
    );
}

#[test]
fn test_resolve_clamps_to_diagonal() {
    let bounds = Rect::new(0.0, 0.0, 3.0, 4.0);
    assert_eq!(resolve_generating_distance(100.0, 4, 10, &bounds), 5.0);
}

#[test]
fn test_resolve_colocated_is_one() {
    let bounds = Rect::new(1.0, 1.0, 1.0, 1.0);
    assert_eq!(resolve_generating_distance(0.0, 4, 10, &bounds), 1.0);
    assert_eq!(resolve_generating_distance(7.0, 4, 10, &bounds), 1.0);
}

#[test]
fn test_resolve_zero_area_line_clamps_to_length() {
    // Collinear points: zero area, positive diagonal
    let bounds = Rect::new(0.0, 0.0, 0.5, 0.0);
    assert_eq!(resolve_generating_distance(0.0, 4, 10, &bounds), 0.5);
    assert_eq!(resolve_generating_distance(0.2, 4, 10, &bounds), 0.2);
}

// ============================================================================
// Output Tests
// ============================================================================

#[test]
fn test_cluster_assignment_views() {
    let a = ClusterAssignment::new(vec![2, 0, 2, 1, 1, 0], 2);
    assert_eq!(a.len(), 6);
    assert_eq!(a.noise_count(), 2);
    assert_eq!(a.sizes(), vec![2, 2, 2]);
    assert_eq!(a.members(2), vec![0, 2]);

    let c = a.canonical();
    assert_eq!(c.labels, vec![1, 0, 1, 2, 2, 0]);
    assert_eq!(c.cluster_count, 2);
}

#[test]
fn test_cluster_assignment_display() {
    let a = ClusterAssignment::new(vec![1, 1, 0], 1);
    let text = format!("{}", a);
    assert!(text.contains("Data points: 3"));
    assert!(text.contains("Clusters: 1"));
    assert!(text.contains("Noise: 1"));
}

fn sample_order() -> OpticsResult<f64> {
    OpticsResult {
        order: vec![
            OpticsRecord {
                id: 1,
                reachability: None,
                core_distance: Some(0.5),
                predecessor: None,
            },
            OpticsRecord {
                id: 0,
                reachability: Some(0.5),
                core_distance: None,
                predecessor: Some(1),
            },
            OpticsRecord {
                id: 2,
                reachability: Some(1.5),
                core_distance: Some(0.7),
                predecessor: Some(1),
            },
        ],
        generating_distance: 2.0,
        min_points: 2,
        strategy: SpaceStrategy::Grid,
    }
}

#[test]
fn test_optics_result_views() {
    let result = sample_order();
    assert_eq!(result.ids(), vec![1, 0, 2]);
    assert_eq!(result.core_count(), 2);
    assert_eq!(result.core_distances(), vec![None, Some(0.5), Some(0.7)]);
    assert_eq!(result.predecessors(), vec![Some(1), None, Some(1)]);

    let profile = result.reachability_profile();
    assert!(profile[0].is_infinite());
    assert_eq!(&profile[1..], &[0.5, 1.5]);
}

#[test]
fn test_optics_result_extraction_clamped_to_generating_distance() {
    let result = sample_order();
    let tight = result.extract_dbscan_clustering(1.0);
    assert_eq!(tight.cluster_count, 2);
    assert_eq!(tight.labels, vec![1, 1, 2]);

    let wide = result.extract_dbscan_clustering(100.0);
    assert_eq!(wide.cluster_count, 1);
    assert_eq!(wide.labels, vec![1, 1, 1]);
}

#[test]
fn test_optics_result_display() {
    let text = format!("{}", sample_order());
    assert!(text.contains("Data points: 3"));
    assert!(text.contains("Core points: 2"));
    assert!(text.contains("undefined"));
}

#[test]
fn test_k_distances_quantile() {
    let k = KDistances {
        k: 4,
        distances: vec![5.0, 4.0, 3.0, 2.0, 1.0],
    };
    assert_eq!(k.at_quantile(0.0), Some(5.0));
    assert_eq!(k.at_quantile(0.5), Some(3.0));
    assert_eq!(k.at_quantile(1.0), Some(1.0));
    assert_eq!(k.at_quantile(2.0), Some(1.0));

    let empty = KDistances::<f64> {
        k: 4,
        distances: vec![],
    };
    assert_eq!(empty.at_quantile(0.5), None);
}

#[test]
fn test_outlier_scores_threshold() {
    let s = OutlierScores {
        k: 5,
        lambda: 3.0,
        scores: vec![0.1, 0.95, 0.2, 0.8],
    };
    assert_eq!(s.outliers(0.5), vec![1, 3]);
}
