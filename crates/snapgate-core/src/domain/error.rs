//! Failure taxonomy for snapshot assertions.

use std::path::Path;

use crate::compare::CompareError;
use crate::diagnostic::{DiagnosticArtifact, DiagnosticError};
use crate::store::StoreError;
use crate::validate::ValidationOutcome;

use super::dimensions::Dimensions;

/// Prefix of the second line of a failure message that names the diagnostic
/// image. Tooling parses this line; keep it stable.
pub const OUTPUT_WRITTEN_PREFIX: &str = "Output written to: ";

/// Errors produced by a snapshot assertion.
///
/// Failures that produced a diagnostic image render as three lines: a summary,
/// `Output written to: <absolute path>`, and a human-readable detail.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid snapshot name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid snapshot configuration: {0}")]
    InvalidConfig(String),

    #[error("no baseline recorded for snapshot '{name}' (enable record mode to create it)")]
    MissingBaseline { name: String },

    #[error(
        "Snapshot '{name}' has different dimensions than its baseline.\n{}{}\nExpected {expected} but captured {actual}.",
        OUTPUT_WRITTEN_PREFIX,
        .diagnostic.path.display()
    )]
    SizeMismatch {
        name: String,
        expected: Dimensions,
        actual: Dimensions,
        diagnostic: DiagnosticArtifact,
    },

    #[error(
        "Snapshot '{name}' does not match its baseline.\n{}{}\n{}",
        OUTPUT_WRITTEN_PREFIX,
        .diagnostic.path.display(),
        .outcome.summary
    )]
    ValidationFailed {
        name: String,
        outcome: ValidationOutcome,
        diagnostic: DiagnosticArtifact,
    },

    #[error("baseline store error: {0}")]
    Store(#[from] StoreError),

    #[error("diagnostic output error: {0}")]
    Diagnostic(#[from] DiagnosticError),

    #[error("comparison error: {0}")]
    Compare(#[from] CompareError),
}

impl SnapshotError {
    /// The diagnostic artifact written for this failure, if any.
    pub fn diagnostic(&self) -> Option<&DiagnosticArtifact> {
        match self {
            SnapshotError::SizeMismatch { diagnostic, .. }
            | SnapshotError::ValidationFailed { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    /// Absolute path of the diagnostic image written for this failure, if any.
    pub fn diagnostic_path(&self) -> Option<&Path> {
        self.diagnostic().map(|d| d.path.as_path())
    }

    /// Whether this error is a verdict about the images (as opposed to a
    /// configuration or IO problem).
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            SnapshotError::SizeMismatch { .. } | SnapshotError::ValidationFailed { .. }
        )
    }
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::compare::DifferenceStats;
    use crate::diagnostic::DiagnosticKind;

    fn artifact(kind: DiagnosticKind, path: &str) -> DiagnosticArtifact {
        DiagnosticArtifact {
            kind,
            path: PathBuf::from(path),
            dimensions: Dimensions::new(8, 4),
        }
    }

    #[test]
    fn size_mismatch_second_line_is_output_path() {
        let err = SnapshotError::SizeMismatch {
            name: "home".to_string(),
            expected: Dimensions::new(8, 4),
            actual: Dimensions::new(4, 4),
            diagnostic: artifact(DiagnosticKind::SizeMismatch, "/tmp/out/home-sizemismatch.png"),
        };
        let msg = err.to_string();
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Output written to: /tmp/out/home-sizemismatch.png");
        assert!(lines[2].contains("8x4"));
        assert!(lines[2].contains("4x4"));
        assert_eq!(
            err.diagnostic_path(),
            Some(Path::new("/tmp/out/home-sizemismatch.png"))
        );
        assert!(err.is_mismatch());
    }

    #[test]
    fn validation_failure_includes_summary() {
        let stats = DifferenceStats {
            differing_pixels: 12,
            total_pixels: 100,
            max_distance: 0.004,
            peak_distance: 0.5,
            mean_distance: 0.06,
        };
        let err = SnapshotError::ValidationFailed {
            name: "home".to_string(),
            outcome: ValidationOutcome::new(false, stats, "12 pixels differ (allowed 0)"),
            diagnostic: artifact(DiagnosticKind::Mismatch, "/tmp/out/home-diff.png"),
        };
        let msg = err.to_string();
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines[1], "Output written to: /tmp/out/home-diff.png");
        assert_eq!(lines[2], "12 pixels differ (allowed 0)");
    }

    #[test]
    fn missing_baseline_has_no_output_line() {
        let err = SnapshotError::MissingBaseline {
            name: "home".to_string(),
        };
        assert!(!err.to_string().contains(OUTPUT_WRITTEN_PREFIX));
        assert!(err.diagnostic_path().is_none());
        assert!(!err.is_mismatch());
    }
}
