//! Structured observability hooks for snapshot assertions.
//!
//! - `SnapshotSpan`: RAII guard for an assertion-scoped tracing span
//! - `emit_*`: one event per terminal state of an assertion
//!
//! Filter with `RUST_LOG=snapgate_core=info`; see [`crate::init_tracing`].

use std::path::Path;

use tracing::{info, warn};

use crate::compare::DifferenceStats;
use crate::domain::Dimensions;

/// RAII guard that enters a snapshot-scoped span for the duration of one
/// assertion.
///
/// ```ignore
/// let _span = SnapshotSpan::enter("MatchesViewScreenshot");
/// // events below carry snapshot = "MatchesViewScreenshot"
/// ```
pub struct SnapshotSpan {
    _span: tracing::span::EnteredSpan,
}

impl SnapshotSpan {
    pub fn enter(snapshot: &str) -> Self {
        let span = tracing::info_span!("snapgate.assert", snapshot = %snapshot);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: captured image stored as the new baseline.
pub fn emit_recorded(snapshot: &str, dimensions: Dimensions) {
    info!(
        event = "snapshot.recorded",
        snapshot = %snapshot,
        dimensions = %dimensions,
    );
}

/// Emit event: captured image matched its baseline.
pub fn emit_passed(snapshot: &str, stats: &DifferenceStats) {
    info!(
        event = "snapshot.passed",
        snapshot = %snapshot,
        differing_pixels = stats.differing_pixels,
        total_pixels = stats.total_pixels,
    );
}

/// Emit event: baseline and captured image have different dimensions.
pub fn emit_size_mismatch(snapshot: &str, expected: Dimensions, actual: Dimensions) {
    warn!(
        event = "snapshot.size_mismatch",
        snapshot = %snapshot,
        expected = %expected,
        actual = %actual,
    );
}

/// Emit event: the validator rejected the comparison.
pub fn emit_validation_failed(snapshot: &str, stats: &DifferenceStats) {
    warn!(
        event = "snapshot.validation_failed",
        snapshot = %snapshot,
        differing_pixels = stats.differing_pixels,
        total_pixels = stats.total_pixels,
        peak_distance = stats.peak_distance,
    );
}

/// Emit event: a diagnostic image was written.
pub fn emit_diagnostic_written(snapshot: &str, path: &Path) {
    info!(
        event = "snapshot.diagnostic_written",
        snapshot = %snapshot,
        path = %path.display(),
    );
}
