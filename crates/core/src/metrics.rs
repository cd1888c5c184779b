// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry seam. The counters/histograms the rest of this stack names
//! (resources created/modified/disappeared, scan duration and errors) are
//! emitted through this trait; shipping them to a real metrics backend is
//! out of scope, so the only production implementation logs them via
//! `tracing`.

use std::time::Duration;

/// A label pair attached to a counter increment or duration observation,
/// e.g. `("provider", "aws")`.
pub type Label<'a> = (&'a str, &'a str);

/// Minimal counter/histogram sink. Abstracted so callers can substitute a
/// [`NoopMetrics`] in tests instead of asserting against log output.
pub trait Metrics: Send + Sync {
    fn inc_counter(&self, name: &str, labels: &[Label<'_>]);
    fn observe_duration(&self, name: &str, duration: Duration, labels: &[Label<'_>]);
}

/// Discards everything. The default when no metrics collaborator is
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn inc_counter(&self, _name: &str, _labels: &[Label<'_>]) {}
    fn observe_duration(&self, _name: &str, _duration: Duration, _labels: &[Label<'_>]) {}
}

/// Logs each counter increment and duration observation as a structured
/// `tracing` event at `debug` level, under the `metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl Metrics for TracingMetrics {
    fn inc_counter(&self, name: &str, labels: &[Label<'_>]) {
        tracing::debug!(target: "metrics", counter = name, ?labels, "inc_counter");
    }

    fn observe_duration(&self, name: &str, duration: Duration, labels: &[Label<'_>]) {
        tracing::debug!(
            target: "metrics",
            histogram = name,
            duration_ms = duration.as_millis() as u64,
            ?labels,
            "observe_duration"
        );
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
