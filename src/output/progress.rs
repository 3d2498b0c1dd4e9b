//! Progress reporting
//!
//! A write-only channel for human-readable status lines and completion
//! fractions. Harvesting behaves identically whichever sink is plugged in.

use tracing::info;

/// Receives progress updates from discovery and enrichment
pub trait ProgressSink: Send + Sync {
    /// A human-readable status line
    fn status(&self, message: &str);

    /// Completion of the current phase, between 0.0 and 1.0
    fn fraction(&self, value: f64);
}

/// Discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn status(&self, _message: &str) {}

    fn fraction(&self, _value: f64) {}
}

/// Forwards updates to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn status(&self, message: &str) {
        info!(target: "job_harvest::progress", "{}", message);
    }

    fn fraction(&self, value: f64) {
        info!(
            target: "job_harvest::progress",
            "{:.0}% complete",
            value.clamp(0.0, 1.0) * 100.0
        );
    }
}
