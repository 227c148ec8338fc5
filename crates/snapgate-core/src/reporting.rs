use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::assertion::AssertOutcome;
use crate::compare::DifferenceStats;
use crate::domain::{Dimensions, SnapshotError};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Final state of one snapshot assertion, as persisted in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Recorded,
    Mismatch,
    SizeMismatch,
    MissingBaseline,
    Error,
}

impl Verdict {
    pub fn is_success(self) -> bool {
        matches!(self, Verdict::Passed | Verdict::Recorded)
    }
}

/// Dimensions and content digest of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDigest {
    pub dimensions: Dimensions,
    /// Hex SHA-256 over width, height (big-endian u32) and raw RGBA bytes.
    pub sha256: String,
}

impl ImageDigest {
    pub fn of(image: &RgbaImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_be_bytes());
        hasher.update(image.height().to_be_bytes());
        hasher.update(image.as_raw());
        Self {
            dimensions: Dimensions::of(image),
            sha256: hex::encode(hasher.finalize()),
        }
    }
}

/// Machine-readable record of a snapshot assertion, written for CI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub snapshot: String,
    pub verdict: Verdict,
    pub reference: Option<ImageDigest>,
    pub candidate: ImageDigest,
    pub stats: Option<DifferenceStats>,
    pub detail: Option<String>,
    pub diagnostic: Option<PathBuf>,
}

impl ComparisonReport {
    /// Summarise the result of asserting `candidate` as `snapshot`.
    ///
    /// `reference` is the baseline the candidate was checked against, when
    /// one was available.
    pub fn from_result(
        snapshot: &str,
        reference: Option<&RgbaImage>,
        candidate: &RgbaImage,
        result: &std::result::Result<AssertOutcome, SnapshotError>,
    ) -> Self {
        let (verdict, stats, detail) = match result {
            Ok(AssertOutcome::Passed(stats)) => (Verdict::Passed, Some(*stats), None),
            Ok(AssertOutcome::Recorded { .. }) => (Verdict::Recorded, None, None),
            Err(SnapshotError::ValidationFailed { outcome, .. }) => (
                Verdict::Mismatch,
                Some(outcome.stats),
                Some(outcome.summary.clone()),
            ),
            Err(SnapshotError::SizeMismatch {
                expected, actual, ..
            }) => (
                Verdict::SizeMismatch,
                None,
                Some(format!("expected {expected} but captured {actual}")),
            ),
            Err(err @ SnapshotError::MissingBaseline { .. }) => {
                (Verdict::MissingBaseline, None, Some(err.to_string()))
            }
            Err(err) => (Verdict::Error, None, Some(err.to_string())),
        };

        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            snapshot: snapshot.to_string(),
            verdict,
            reference: reference.map(ImageDigest::of),
            candidate: ImageDigest::of(candidate),
            stats,
            detail,
            diagnostic: result
                .as_ref()
                .err()
                .and_then(|e| e.diagnostic_path())
                .map(Path::to_path_buf),
        }
    }
}

/// Write a report in pretty JSON format.
pub fn write_report_json(path: &Path, report: &ComparisonReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize comparison report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render a markdown summary for PR/check output.
pub fn render_report_md(report: &ComparisonReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Snapshot `{}`\n\n", report.snapshot));
    out.push_str(&format!("- verdict: {}\n", verdict_label(report.verdict)));
    if let Some(reference) = &report.reference {
        out.push_str(&format!(
            "- baseline: {} (`{}`)\n",
            reference.dimensions,
            short_digest(&reference.sha256)
        ));
    }
    out.push_str(&format!(
        "- captured: {} (`{}`)\n",
        report.candidate.dimensions,
        short_digest(&report.candidate.sha256)
    ));

    if let Some(stats) = &report.stats {
        out.push_str("\n## Difference\n");
        out.push_str(&format!(
            "- differing pixels: {} of {} ({:.4}%)\n- max distance: {}\n- peak distance: {:.4}\n- mean distance: {:.6}\n",
            stats.differing_pixels,
            stats.total_pixels,
            stats.differing_fraction() * 100.0,
            stats.max_distance,
            stats.peak_distance,
            stats.mean_distance
        ));
    }

    if let Some(detail) = &report.detail {
        out.push_str(&format!("\n{}\n", detail));
    }
    if let Some(path) = &report.diagnostic {
        out.push_str(&format!("\nDiagnostic: `{}`\n", path.display()));
    }
    out
}

/// Write the markdown summary.
pub fn write_report_md(path: &Path, report: &ComparisonReport) -> Result<()> {
    let md = render_report_md(report);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Passed => "passed",
        Verdict::Recorded => "recorded",
        Verdict::Mismatch => "mismatch",
        Verdict::SizeMismatch => "size mismatch",
        Verdict::MissingBaseline => "missing baseline",
        Verdict::Error => "error",
    }
}

fn short_digest(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
