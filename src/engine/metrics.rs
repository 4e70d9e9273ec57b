//! Run metrics.
//!
//! Cheap counters describing one validation run. Collection is always on:
//! everything here is an integer bump or a single `Instant` read, so there is
//! no opt-in tier the way heavier trace data would need.

use std::time::Duration;

/// Counters and timing for one validation run.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time inside `validate()`.
    pub total: Duration,
    /// Compiled rules executed for the active scene.
    pub rules: usize,
    /// Rule-field pairs that reached checker dispatch.
    pub checked: usize,
    /// Rule-field pairs skipped by gates (only-checked, `when`, empty-skip).
    pub skipped: usize,
    /// Filter pipelines applied (with write-back).
    pub filtered: usize,
    /// Errors recorded.
    pub failed: usize,
}
