//! Snapgate Core Library
//!
//! Verifies captured UI renders against recorded baseline images. A
//! shift-tolerant comparator scores every pixel, a validator decides
//! pass/fail, and failures leave a diagnostic PNG whose absolute path is
//! reported as `Output written to: <path>`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapgate_core::{FsBaselineStore, SnapshotConfig, Snapshots};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsBaselineStore::new("snapshots")?;
//! let config = SnapshotConfig::default().with_shift(1, 1).with_env_overrides()?;
//! let snapshots = Snapshots::new(Arc::new(store), config)?;
//!
//! let captured = image::open("capture.png")?.to_rgba8();
//! snapshots.assert_snapshot(&captured, "MatchesViewScreenshot")?;
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod codec;
pub mod compare;
pub mod config;
pub mod diagnostic;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod render;
pub mod reporting;
pub mod store;
pub mod telemetry;
pub mod validate;

pub use assertion::{AssertOutcome, Snapshots};
pub use codec::{decode_png, write_png_atomic, CodecError};
pub use compare::{
    pixel_distance, CompareConfig, CompareError, Comparison, DifferenceMap, DifferenceStats,
    DistanceComparator, ImageComparator, DEFAULT_MAX_DISTANCE,
};
pub use config::{SnapshotConfig, DEFAULT_OUTPUT_DIR};
pub use diagnostic::{DiagnosticArtifact, DiagnosticError, DiagnosticKind, DiagnosticWriter};
pub use domain::{
    congruent, Dimensions, Result, SnapshotError, SnapshotId, OUTPUT_WRITTEN_PREFIX,
};
pub use render::{render_mismatch, render_size_mismatch, HIGHLIGHT};
pub use reporting::{
    render_report_md, write_report_json, write_report_md, ComparisonReport, ImageDigest, Verdict,
};
pub use store::fs::FsBaselineStore;
pub use store::memory::MemoryBaselineStore;
pub use store::{BaselineStore, StoreError};
pub use validate::{
    CountValidator, PredicateValidator, ResultValidator, ThresholdValidator, ValidationOutcome,
    ValidatorPolicy,
};

pub use metrics::METRICS;
pub use obs::SnapshotSpan;
pub use telemetry::init_tracing;

/// Snapgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
