//! Result validation.
//!
//! Turns a [`Comparison`] into a [`ValidationOutcome`]: the pass/fail decision
//! that makes a snapshot assertion succeed or fail. Validators are pure; they
//! never render or persist diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compare::{Comparison, DifferenceStats};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Verdict of a validator plus the statistics that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub stats: DifferenceStats,
    /// One-line human-readable explanation, used in failure messages.
    pub summary: String,
}

impl ValidationOutcome {
    pub fn new(passed: bool, stats: DifferenceStats, summary: impl Into<String>) -> Self {
        Self {
            passed,
            stats,
            summary: summary.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Decides whether a comparison is acceptable.
pub trait ResultValidator: Send + Sync {
    fn validate(&self, comparison: &Comparison) -> ValidationOutcome;
}

/// Passes iff at most `max_differing_pixels` pixels exceed the comparator's
/// per-pixel distance threshold. `CountValidator(0)` requires equality within
/// the distance/shift tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountValidator(pub u64);

impl ResultValidator for CountValidator {
    fn validate(&self, comparison: &Comparison) -> ValidationOutcome {
        let stats = comparison.stats;
        let passed = stats.differing_pixels <= self.0;
        ValidationOutcome::new(
            passed,
            stats,
            format!(
                "{} of {} pixels differ (allowed: {}, max distance: {})",
                stats.differing_pixels, stats.total_pixels, self.0, stats.max_distance,
            ),
        )
    }
}

/// Passes iff the share of differing pixels is at most `max_fraction`
/// (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdValidator(pub f64);

impl ResultValidator for ThresholdValidator {
    fn validate(&self, comparison: &Comparison) -> ValidationOutcome {
        let stats = comparison.stats;
        let fraction = stats.differing_fraction();
        let passed = fraction <= self.0;
        ValidationOutcome::new(
            passed,
            stats,
            format!(
                "{:.3}% of pixels differ ({} of {}; allowed: {:.3}%)",
                fraction * 100.0,
                stats.differing_pixels,
                stats.total_pixels,
                self.0 * 100.0,
            ),
        )
    }
}

type Predicate = dyn Fn(&Comparison) -> bool + Send + Sync;

/// Delegates the decision to an injected function. Used for custom policies
/// and test doubles.
pub struct PredicateValidator {
    label: String,
    predicate: Box<Predicate>,
}

impl PredicateValidator {
    pub fn new(predicate: impl Fn(&Comparison) -> bool + Send + Sync + 'static) -> Self {
        Self::labeled("custom validator", predicate)
    }

    /// Like [`PredicateValidator::new`] with a label that appears in failure
    /// summaries.
    pub fn labeled(
        label: impl Into<String>,
        predicate: impl Fn(&Comparison) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Always passes.
    pub fn always_pass() -> Self {
        Self::labeled("always pass", |_| true)
    }

    /// Always fails.
    pub fn always_fail() -> Self {
        Self::labeled("always fail", |_| false)
    }
}

impl fmt::Debug for PredicateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl ResultValidator for PredicateValidator {
    fn validate(&self, comparison: &Comparison) -> ValidationOutcome {
        let stats = comparison.stats;
        let passed = (self.predicate)(comparison);
        let verdict = if passed { "accepted" } else { "rejected" };
        ValidationOutcome::new(
            passed,
            stats,
            format!(
                "{} {} the comparison ({} of {} pixels differ)",
                self.label, verdict, stats.differing_pixels, stats.total_pixels,
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Configurable policy
// ---------------------------------------------------------------------------

/// Serializable description of a built-in validator, as found in
/// configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorPolicy {
    /// See [`CountValidator`].
    Count { max_differing_pixels: u64 },
    /// See [`ThresholdValidator`].
    Threshold { max_fraction: f64 },
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        ValidatorPolicy::Count {
            max_differing_pixels: 0,
        }
    }
}

impl ValidatorPolicy {
    /// Instantiate the validator this policy describes.
    pub fn build(&self) -> Box<dyn ResultValidator> {
        match *self {
            ValidatorPolicy::Count {
                max_differing_pixels,
            } => Box::new(CountValidator(max_differing_pixels)),
            ValidatorPolicy::Threshold { max_fraction } => {
                Box::new(ThresholdValidator(max_fraction))
            }
        }
    }

    /// Reject a threshold fraction outside `[0, 1]`.
    pub fn check(&self) -> Result<(), String> {
        match *self {
            ValidatorPolicy::Count { .. } => Ok(()),
            ValidatorPolicy::Threshold { max_fraction } if (0.0..=1.0).contains(&max_fraction) => {
                Ok(())
            }
            ValidatorPolicy::Threshold { max_fraction } => Err(format!(
                "threshold fraction must be within [0.0, 1.0], got {max_fraction}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::compare::{DistanceComparator, ImageComparator};

    /// Comparison of two 10x1 images where the first `n` pixels differ.
    fn comparison_with_differences(n: u32) -> Comparison {
        let reference = RgbaImage::from_pixel(10, 1, Rgba([0, 0, 0, 255]));
        let mut candidate = reference.clone();
        for x in 0..n {
            candidate.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
        }
        DistanceComparator::default()
            .compare(&reference, &candidate)
            .unwrap()
    }

    #[test]
    fn count_validator_passes_at_limit() {
        let cmp = comparison_with_differences(3);
        assert!(CountValidator(3).validate(&cmp).passed);
        assert!(CountValidator(4).validate(&cmp).passed);
        assert!(!CountValidator(2).validate(&cmp).passed);
    }

    #[test]
    fn count_zero_requires_exact_match() {
        assert!(CountValidator(0).validate(&comparison_with_differences(0)).passed);
        let outcome = CountValidator(0).validate(&comparison_with_differences(1));
        assert!(!outcome.passed);
        assert!(outcome.summary.contains("1 of 10 pixels differ"));
        assert!(outcome.summary.contains("allowed: 0"));
    }

    #[test]
    fn threshold_validator_uses_fraction() {
        let cmp = comparison_with_differences(2);
        assert!(ThresholdValidator(0.2).validate(&cmp).passed);
        assert!(!ThresholdValidator(0.1).validate(&cmp).passed);
    }

    #[test]
    fn predicate_validator_overrides_stats() {
        let identical = comparison_with_differences(0);
        let different = comparison_with_differences(10);

        assert!(!PredicateValidator::always_fail().validate(&identical).passed);
        assert!(PredicateValidator::always_pass().validate(&different).passed);

        let custom = PredicateValidator::new(|c| c.stats.differing_pixels % 2 == 0);
        assert!(custom.validate(&different).passed);
        assert!(!custom.validate(&comparison_with_differences(3)).passed);
    }

    #[test]
    fn outcome_carries_stats() {
        let cmp = comparison_with_differences(4);
        let outcome = CountValidator(0).validate(&cmp);
        assert_eq!(outcome.stats, cmp.stats);
    }

    #[test]
    fn policy_serde_tagged() {
        let policy: ValidatorPolicy =
            serde_json::from_str(r#"{"type":"threshold","max_fraction":0.01}"#).unwrap();
        assert_eq!(policy, ValidatorPolicy::Threshold { max_fraction: 0.01 });

        let json = serde_json::to_value(ValidatorPolicy::default()).unwrap();
        assert_eq!(json["type"], "count");
        assert_eq!(json["max_differing_pixels"], 0);
    }

    #[test]
    fn policy_builds_matching_validator() {
        let cmp = comparison_with_differences(1);
        let count = ValidatorPolicy::Count {
            max_differing_pixels: 1,
        };
        assert!(count.build().validate(&cmp).passed);

        let threshold = ValidatorPolicy::Threshold { max_fraction: 0.05 };
        assert!(!threshold.build().validate(&cmp).passed);
    }

    #[test]
    fn policy_check_rejects_out_of_range_fraction() {
        assert!(ValidatorPolicy::Threshold { max_fraction: 1.5 }.check().is_err());
        assert!(ValidatorPolicy::Threshold { max_fraction: 0.5 }.check().is_ok());
        assert!(ValidatorPolicy::default().check().is_ok());
    }
}
