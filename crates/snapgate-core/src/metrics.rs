//! Global atomic counters for snapshot assertions.
//!
//! Counters are incremented silently by the orchestrator. Call
//! [`Metrics::flush`] to emit the current values as a single
//! `tracing::info!` event (e.g. at the end of a test run).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    assertions: AtomicU64,
    passed: AtomicU64,
    failed: AtomicU64,
    recorded: AtomicU64,
    diagnostics_written: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub assertions: u64,
    pub passed: u64,
    pub failed: u64,
    pub recorded: u64,
    pub diagnostics_written: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            assertions: AtomicU64::new(0),
            passed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            recorded: AtomicU64::new(0),
            diagnostics_written: AtomicU64::new(0),
        }
    }

    pub fn inc_assertions(&self) {
        self.assertions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "assertions", "counter incremented");
    }

    pub fn inc_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "passed", "counter incremented");
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "failed", "counter incremented");
    }

    pub fn inc_recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "recorded", "counter incremented");
    }

    pub fn inc_diagnostics_written(&self) {
        self.diagnostics_written.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "diagnostics_written", "counter incremented");
    }

    /// Read all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            assertions: self.assertions.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            diagnostics_written: self.diagnostics_written.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            assertions = s.assertions,
            passed = s.passed,
            failed = s.failed,
            recorded = s.recorded,
            diagnostics_written = s.diagnostics_written,
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.assertions.store(0, Ordering::Relaxed);
        self.passed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.recorded.store(0, Ordering::Relaxed);
        self.diagnostics_written.store(0, Ordering::Relaxed);
    }
}
