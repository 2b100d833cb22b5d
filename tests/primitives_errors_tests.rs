#![cfg(feature = "dev")]

use optics_rs::internals::primitives::bounds::Rect;
use optics_rs::internals::primitives::errors::OpticsError;
use optics_rs::internals::primitives::molecule::{reset_all, Molecule, NOT_QUEUED};
use optics_rs::internals::primitives::progress::{LogTracker, NullTracker, Tracker};

use approx::assert_relative_eq;
use std::sync::Arc;

// ============================================================================
// Error Display Tests
// ============================================================================

#[test]
fn test_optics_error_display() {
    // MismatchedInputs
    let err = OpticsError::MismatchedInputs {
        x_len: 10,
        y_len: 5,
    };
    assert_eq!(
        format!("{}", err),
        "Length mismatch: x has 10 points, y has 5"
    );

    // InvalidNumericValue
    let err = OpticsError::InvalidNumericValue("x[3]=NaN".to_string());
    assert_eq!(format!("{}", err), "Invalid numeric value: x[3]=NaN");

    // InvalidBounds
    let err = OpticsError::InvalidBounds("min exceeds max".to_string());
    assert_eq!(format!("{}", err), "Invalid bounds: min exceeds max");

    // DuplicateParameter
    let err = OpticsError::DuplicateParameter { parameter: "seed" };
    assert_eq!(
        format!("{}", err),
        "Parameter 'seed' was set more than once"
    );

    // InvalidParameter
    let err = OpticsError::InvalidParameter("threads must be at least 1".to_string());
    assert_eq!(
        format!("{}", err),
        "Invalid parameter: threads must be at least 1"
    );

    // Aborted
    assert_eq!(
        format!("{}", OpticsError::Aborted),
        "Clustering run was aborted"
    );

    // ThreadPool
    let err = OpticsError::ThreadPool("spawn failed".to_string());
    assert_eq!(format!("{}", err), "Worker pool error: spawn failed");
}

#[test]
fn test_optics_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(OpticsError::Aborted);
    assert_eq!(err.to_string(), "Clustering run was aborted");
}

#[test]
fn test_optics_error_equality() {
    assert_eq!(OpticsError::Aborted, OpticsError::Aborted);
    assert_ne!(
        OpticsError::Aborted,
        OpticsError::InvalidParameter("x".to_string())
    );
}

// ============================================================================
// Rect Tests
// ============================================================================

#[test]
fn test_rect_from_points() {
    let x = [1.0, -2.0, 4.0];
    let y = [3.0, 0.0, -1.0];
    let rect = Rect::from_points(&x, &y);

    assert_eq!(rect, Rect::new(-2.0, -1.0, 4.0, 3.0));
    assert_relative_eq!(rect.width(), 6.0);
    assert_relative_eq!(rect.height(), 4.0);
    assert_relative_eq!(rect.area(), 24.0);
    assert_relative_eq!(rect.diagonal(), 52.0f64.sqrt());
    assert!(!rect.is_point());
}

#[test]
fn test_rect_colocated_points() {
    let x = [2.0; 5];
    let y = [3.0; 5];
    let rect = Rect::from_points(&x, &y);

    assert!(rect.is_point());
    assert_eq!(rect.area(), 0.0);
    assert_eq!(rect.diagonal(), 0.0);
}

#[test]
fn test_rect_empty_input() {
    let rect: Rect<f64> = Rect::from_points(&[], &[]);
    assert!(rect.is_point());
}

// ============================================================================
// Molecule Tests
// ============================================================================

#[test]
fn test_molecule_reset() {
    let mut molecules: Vec<Molecule<f64>> = (0..3)
        .map(|i| Molecule::new(i, i as f64, 0.0))
        .collect();
    molecules[1].processed = true;
    molecules[1].core_distance = Some(0.5);
    molecules[1].reachability_distance = Some(1.5);
    molecules[1].predecessor = Some(0);
    molecules[1].cluster_id = 2;
    molecules[1].queue_index = 0;
    assert!(molecules[1].is_core());

    reset_all(&mut molecules);

    let m = &molecules[1];
    assert_eq!(m.id, 1);
    assert_eq!(m.x, 1.0);
    assert!(!m.processed);
    assert!(!m.is_core());
    assert_eq!(m.reachability_distance, None);
    assert_eq!(m.predecessor, None);
    assert_eq!(m.cluster_id, 0);
    assert_eq!(m.queue_index, NOT_QUEUED);
}

// ============================================================================
// Tracker Tests
// ============================================================================

#[test]
fn test_null_tracker_never_cancels() {
    let tracker = NullTracker;
    tracker.log("ignored");
    tracker.progress(1, 2);
    assert!(!tracker.is_cancelled());
}

#[test]
fn test_log_tracker_cancel_and_reset() {
    let tracker = Arc::new(LogTracker::new());
    let shared = Arc::clone(&tracker);
    assert!(!shared.is_cancelled());

    tracker.cancel();
    assert!(shared.is_cancelled());

    tracker.reset();
    assert!(!shared.is_cancelled());
}
