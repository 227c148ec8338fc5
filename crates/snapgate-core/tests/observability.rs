//! Observability tests for snapshot assertion tracing.
//!
//! Each terminal state of an assertion emits one structured event; these
//! check the event names and fields that reach a capturing subscriber.

use std::path::Path;

use snapgate_core::obs::{
    emit_diagnostic_written, emit_passed, emit_recorded, emit_size_mismatch,
    emit_validation_failed,
};
use snapgate_core::{DifferenceStats, Dimensions, SnapshotSpan};
use tracing_test::traced_test;

fn stats() -> DifferenceStats {
    DifferenceStats {
        differing_pixels: 12,
        total_pixels: 4800,
        max_distance: 0.004,
        peak_distance: 0.5,
        mean_distance: 0.001,
    }
}

#[traced_test]
#[test]
fn test_emit_recorded_logs_dimensions() {
    emit_recorded("home", Dimensions::new(1080, 1920));

    assert!(logs_contain("snapshot.recorded"));
    assert!(logs_contain("snapshot=home"));
    assert!(logs_contain("dimensions=1080x1920"));
}

#[traced_test]
#[test]
fn test_emit_passed_logs_pixel_counts() {
    emit_passed("home", &stats());

    assert!(logs_contain("snapshot.passed"));
    assert!(logs_contain("differing_pixels=12"));
    assert!(logs_contain("total_pixels=4800"));
}

/// WARN-level events are captured too.
#[traced_test]
#[test]
fn test_emit_size_mismatch_logs_warning() {
    emit_size_mismatch("home", Dimensions::new(1080, 1920), Dimensions::new(1080, 2000));

    assert!(logs_contain("WARN"));
    assert!(logs_contain("snapshot.size_mismatch"));
    assert!(logs_contain("expected=1080x1920"));
    assert!(logs_contain("actual=1080x2000"));
}

#[traced_test]
#[test]
fn test_emit_validation_failed_logs_warning() {
    emit_validation_failed("home", &stats());

    assert!(logs_contain("WARN"));
    assert!(logs_contain("snapshot.validation_failed"));
    assert!(logs_contain("differing_pixels=12"));
    assert!(logs_contain("peak_distance=0.5"));
}

#[traced_test]
#[test]
fn test_emit_diagnostic_written_logs_path() {
    emit_diagnostic_written("home", Path::new("/tmp/diffs/home-diff.png"));

    assert!(logs_contain("snapshot.diagnostic_written"));
    assert!(logs_contain("/tmp/diffs/home-diff.png"));
}

#[traced_test]
#[test]
fn test_snapshot_span_enter_creates_span() {
    let span = SnapshotSpan::enter("test-span-snapshot");
    emit_passed("test-span-snapshot", &stats());
    drop(span);

    assert!(logs_contain("snapgate.assert"));
    assert!(logs_contain("test-span-snapshot"));
}

#[traced_test]
#[test]
fn test_nested_events_within_span() {
    let _span = SnapshotSpan::enter("nested");
    emit_validation_failed("nested", &stats());
    emit_diagnostic_written("nested", Path::new("/tmp/diffs/nested-diff.png"));

    logs_assert(|lines: &[&str]| {
        let in_span: Vec<_> = lines
            .iter()
            .filter(|line| line.contains("snapgate.assert"))
            .collect();
        match in_span.len() {
            2 => Ok(()),
            n => Err(format!("expected 2 events inside the span, got {n}")),
        }
    });
}
