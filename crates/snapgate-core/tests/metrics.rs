//! Counter behaviour across full assertions.
//!
//! Kept in its own test binary: `METRICS` is process-global, so no other test
//! may run assertions concurrently with this one.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use snapgate_core::{MemoryBaselineStore, SnapshotConfig, SnapshotId, Snapshots, METRICS};

#[test]
fn counters_track_every_terminal_state() {
    METRICS.reset();
    let dir = tempfile::tempdir().unwrap();
    let baseline = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
    let store = Arc::new(
        MemoryBaselineStore::new()
            .with_baseline(SnapshotId::new("home").unwrap(), baseline.clone()),
    );
    let config = SnapshotConfig::default().with_output_dir(dir.path());

    let verify = Snapshots::new(store.clone(), config.clone()).unwrap();
    verify.assert_snapshot(&baseline, "home").unwrap();
    verify.assert_snapshot(&RgbaImage::new(4, 4), "home").unwrap_err();
    verify.assert_snapshot(&RgbaImage::new(5, 4), "home").unwrap_err();
    verify.assert_snapshot(&baseline, "unknown").unwrap_err();

    // Direct verification against a caller-loaded baseline counts too.
    let home = SnapshotId::new("home").unwrap();
    verify.verify(&home, &baseline, &baseline).unwrap();
    verify
        .verify(&home, &baseline, &RgbaImage::new(4, 4))
        .unwrap_err();

    let record = Snapshots::new(store, config.with_record_mode(true)).unwrap();
    record.assert_snapshot(&baseline, "other").unwrap();

    let m = METRICS.snapshot();
    assert_eq!(m.assertions, 7);
    assert_eq!(m.passed, 2);
    assert_eq!(m.failed, 4);
    assert_eq!(m.recorded, 1);
    assert_eq!(m.diagnostics_written, 3);

    METRICS.flush();
}
