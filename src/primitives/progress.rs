//! Progress reporting and cooperative cancellation.
//!
//! ## Purpose
//!
//! Long clustering runs report progress and poll for cancellation through the
//! [`Tracker`] trait. The engine never blocks on a tracker and never times
//! out on its own; stopping a run is entirely the caller's decision.
//!
//! ## Design notes
//!
//! * **Polled**: OPTICS and DBSCAN check `is_cancelled` once per processed
//!   point, FastOPTICS once per projection task.
//! * **Shareable**: Trackers are `Send + Sync` so parallel projection tasks
//!   can poll the same instance.
//! * **Logging**: `LogTracker` forwards to the `log` facade.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicBool, Ordering};

/// Progress and cancellation collaborator.
pub trait Tracker: Send + Sync {
    /// Record a human-readable status message.
    fn log(&self, _message: &str) {}

    /// Report that `current` of `total` work items are complete.
    fn progress(&self, _current: usize, _total: usize) {}

    /// Whether the current run should stop.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<K: Tracker + ?Sized> Tracker for Arc<K> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn progress(&self, current: usize, total: usize) {
        (**self).progress(current, total)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Tracker that ignores everything and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl Tracker for NullTracker {}

/// Tracker that forwards messages to `log` and can be cancelled.
#[derive(Debug, Default)]
pub struct LogTracker {
    cancelled: AtomicBool,
}

impl LogTracker {
    /// Create a tracker that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current and all later runs.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

impl Tracker for LogTracker {
    fn log(&self, message: &str) {
        log::info!("{}", message);
    }

    fn progress(&self, current: usize, total: usize) {
        log::trace!("progress {}/{}", current, total);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
