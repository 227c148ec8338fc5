//! Snapshot assertion orchestration.
//!
//! [`Snapshots::assert_snapshot`] is the entry point test suites call. One
//! assertion walks:
//!
//! ```text
//! Start → BaselineLookup ─┬─ Record
//!                         ├─ MissingBaselineFailure
//!                         └─ SizeCheck ─┬─ SizeMismatchFailure
//!                                       └─ Compare → Validate ─┬─ Pass
//!                                                              └─ ValidationFailure
//! ```
//!
//! Record mode wins over verification for every assertion. Size mismatches
//! fail fast before any validator is consulted. Every failure that concerns
//! the pixels writes a diagnostic image and reports its absolute path.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::compare::{Comparison, DifferenceStats, DistanceComparator, ImageComparator};
use crate::config::SnapshotConfig;
use crate::diagnostic::{DiagnosticKind, DiagnosticWriter};
use crate::domain::{congruent, Dimensions, Result, SnapshotError, SnapshotId};
use crate::metrics::METRICS;
use crate::obs;
use crate::render::{render_mismatch, render_size_mismatch};
use crate::store::BaselineStore;
use crate::validate::{ResultValidator, ValidationOutcome};

/// Successful end states of an assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum AssertOutcome {
    /// The captured image matched its baseline.
    Passed(DifferenceStats),
    /// Record mode: the captured image became the baseline.
    Recorded { dimensions: Dimensions },
}

impl AssertOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AssertOutcome::Recorded { .. })
    }
}

/// Snapshot assertion engine.
///
/// Holds the baseline store, comparator, validator and diagnostic writer for
/// a test run. Holds no per-assertion state, so one instance can be shared
/// across test threads.
pub struct Snapshots {
    config: SnapshotConfig,
    store: Arc<dyn BaselineStore>,
    comparator: Box<dyn ImageComparator>,
    default_validator: Box<dyn ResultValidator>,
    custom_validator: Option<Box<dyn ResultValidator>>,
    diagnostics: DiagnosticWriter,
}

impl Snapshots {
    /// Build an engine from `config`, reading baselines from `store`.
    pub fn new(store: Arc<dyn BaselineStore>, config: SnapshotConfig) -> Result<Self> {
        config.validate()?;
        let comparator = DistanceComparator::new(config.compare_config())?;
        Ok(Self {
            default_validator: config.validator.build(),
            diagnostics: DiagnosticWriter::new(config.output_dir.clone()),
            comparator: Box::new(comparator),
            custom_validator: None,
            store,
            config,
        })
    }

    /// Consult `validator` instead of the configured policy.
    pub fn with_validator(mut self, validator: impl ResultValidator + 'static) -> Self {
        self.custom_validator = Some(Box::new(validator));
        self
    }

    /// Replace the default distance comparator.
    pub fn with_comparator(mut self, comparator: impl ImageComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn BaselineStore {
        self.store.as_ref()
    }

    pub fn diagnostics(&self) -> &DiagnosticWriter {
        &self.diagnostics
    }

    fn validator(&self) -> &dyn ResultValidator {
        self.custom_validator
            .as_deref()
            .unwrap_or(self.default_validator.as_ref())
    }

    /// Assert that `captured` matches the baseline recorded as `name`.
    ///
    /// In record mode the captured image is stored as the baseline and no
    /// comparison happens. Otherwise a missing baseline, a dimension mismatch
    /// or a rejected comparison is an error; the latter two carry the path of
    /// the diagnostic image written for them.
    pub fn assert_snapshot(&self, captured: &RgbaImage, name: &str) -> Result<AssertOutcome> {
        self.track(name, || self.run(captured, name))
    }

    /// Verify `captured` against an already loaded `baseline`.
    ///
    /// Runs the size check, comparison and validation steps of an assertion,
    /// writing a diagnostic on failure, and counts as one assertion. Returns
    /// the comparison stats on success.
    pub fn verify(
        &self,
        id: &SnapshotId,
        baseline: &RgbaImage,
        captured: &RgbaImage,
    ) -> Result<DifferenceStats> {
        self.track(id.as_str(), || self.check(id, baseline, captured))
    }

    /// Run one assertion inside its span and count how it ended. Passes and
    /// recordings are counted where they happen.
    fn track<T>(&self, name: &str, assertion: impl FnOnce() -> Result<T>) -> Result<T> {
        let _span = obs::SnapshotSpan::enter(name);
        METRICS.inc_assertions();

        let result = assertion();
        if result.is_err() {
            METRICS.inc_failed();
        }
        result
    }

    fn run(&self, captured: &RgbaImage, name: &str) -> Result<AssertOutcome> {
        let id = SnapshotId::new(name)?;

        if self.config.record_mode {
            self.store.save(&id, captured)?;
            let dimensions = Dimensions::of(captured);
            METRICS.inc_recorded();
            obs::emit_recorded(id.as_str(), dimensions);
            return Ok(AssertOutcome::Recorded { dimensions });
        }

        let baseline = self
            .store
            .load(&id)?
            .ok_or_else(|| SnapshotError::MissingBaseline {
                name: id.to_string(),
            })?;

        self.check(&id, &baseline, captured)
            .map(AssertOutcome::Passed)
    }

    fn check(
        &self,
        id: &SnapshotId,
        baseline: &RgbaImage,
        captured: &RgbaImage,
    ) -> Result<DifferenceStats> {
        if !congruent(baseline, captured) {
            let expected = Dimensions::of(baseline);
            let actual = Dimensions::of(captured);
            obs::emit_size_mismatch(id.as_str(), expected, actual);

            let composite = render_size_mismatch(baseline, captured);
            let diagnostic = self
                .diagnostics
                .write(id, DiagnosticKind::SizeMismatch, &composite)?;
            METRICS.inc_diagnostics_written();
            obs::emit_diagnostic_written(id.as_str(), &diagnostic.path);

            return Err(SnapshotError::SizeMismatch {
                name: id.to_string(),
                expected,
                actual,
                diagnostic,
            });
        }

        let (comparison, outcome) = self.evaluate(baseline, captured)?;
        if outcome.passed {
            METRICS.inc_passed();
            obs::emit_passed(id.as_str(), &outcome.stats);
            return Ok(outcome.stats);
        }

        obs::emit_validation_failed(id.as_str(), &outcome.stats);
        let overlay = render_mismatch(
            baseline,
            captured,
            &comparison.map,
            comparison.stats.max_distance,
        );
        let diagnostic = self
            .diagnostics
            .write(id, DiagnosticKind::Mismatch, &overlay)?;
        METRICS.inc_diagnostics_written();
        obs::emit_diagnostic_written(id.as_str(), &diagnostic.path);

        Err(SnapshotError::ValidationFailed {
            name: id.to_string(),
            outcome,
            diagnostic,
        })
    }

    /// Compare two congruent images and validate the result, without
    /// rendering or writing anything.
    pub fn evaluate(
        &self,
        reference: &RgbaImage,
        candidate: &RgbaImage,
    ) -> Result<(Comparison, ValidationOutcome)> {
        let comparison = self.comparator.compare(reference, candidate)?;
        let outcome = self.validator().validate(&comparison);
        Ok((comparison, outcome))
    }
}

impl fmt::Debug for Snapshots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshots")
            .field("config", &self.config)
            .field("custom_validator", &self.custom_validator.is_some())
            .finish_non_exhaustive()
    }
}
