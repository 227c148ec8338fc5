//! snapgate - snapshot comparison CLI
//!
//! ## Commands
//!
//! - `compare`: Compare two PNG files directly
//! - `verify`: Assert a captured PNG against its recorded baseline

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;
use tracing::{info, Level};

use snapgate_core::{
    decode_png, write_report_json, write_report_md, AssertOutcome, BaselineStore,
    ComparisonReport, FsBaselineStore, MemoryBaselineStore, SnapshotConfig, SnapshotError,
    SnapshotId, Snapshots, ValidatorPolicy, METRICS,
};

#[derive(Parser)]
#[command(name = "snapgate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Snapshot comparison and validation for UI regression tests", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and results
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a candidate PNG against a reference PNG
    Compare {
        /// Reference (expected) image
        reference: PathBuf,

        /// Candidate (captured) image
        candidate: PathBuf,

        /// Name used for the diagnostic file (default: candidate file stem)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        tolerance: ToleranceArgs,

        /// Write a JSON (or `.md`) report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Verify a captured PNG against the baseline recorded under `--name`
    Verify {
        /// Captured image
        captured: PathBuf,

        /// Snapshot name
        #[arg(short, long)]
        name: String,

        /// Baseline directory
        #[arg(long, default_value = "snapshots")]
        baselines: PathBuf,

        /// Record the captured image as the new baseline
        #[arg(long)]
        record: bool,

        #[command(flatten)]
        tolerance: ToleranceArgs,

        /// Write a JSON (or `.md`) report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Tolerance flags shared by `compare` and `verify`. Flags win over
/// `SNAPGATE_*` variables, which win over the config file.
#[derive(Args, Debug, Clone, Default)]
struct ToleranceArgs {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-pixel distance (0.0-1.0) above which a pixel differs
    #[arg(long)]
    max_distance: Option<f32>,

    /// Horizontal shift tolerance in pixels
    #[arg(long)]
    h_shift: Option<u32>,

    /// Vertical shift tolerance in pixels
    #[arg(long)]
    v_shift: Option<u32>,

    /// Number of differing pixels allowed
    #[arg(long, conflicts_with = "max_fraction")]
    max_differing_pixels: Option<u64>,

    /// Share of differing pixels allowed (0.0-1.0)
    #[arg(long)]
    max_fraction: Option<f64>,

    /// Directory for diagnostic images
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl ToleranceArgs {
    fn resolve(&self) -> Result<SnapshotConfig> {
        let base = match &self.config {
            Some(path) => SnapshotConfig::load(path)?,
            None => SnapshotConfig::default(),
        };
        let mut config = base.with_env_overrides()?;

        if let Some(d) = self.max_distance {
            config = config.with_max_distance(d);
        }
        if self.h_shift.is_some() || self.v_shift.is_some() {
            let h = self.h_shift.unwrap_or(config.horizontal_shift);
            let v = self.v_shift.unwrap_or(config.vertical_shift);
            config = config.with_shift(h, v);
        }
        if let Some(n) = self.max_differing_pixels {
            config = config.with_max_differing_pixels(n);
        }
        if let Some(f) = self.max_fraction {
            config = config.with_validator_policy(ValidatorPolicy::Threshold { max_fraction: f });
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    snapgate_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Compare {
            reference,
            candidate,
            name,
            tolerance,
            report,
        } => cmd_compare(
            &reference,
            &candidate,
            name.as_deref(),
            &tolerance,
            report.as_deref(),
            cli.json,
        ),
        Commands::Verify {
            captured,
            name,
            baselines,
            record,
            tolerance,
            report,
        } => cmd_verify(
            &captured,
            &name,
            &baselines,
            record,
            &tolerance,
            report.as_deref(),
            cli.json,
        ),
    };

    METRICS.flush();
    result
}

fn cmd_compare(
    reference_path: &Path,
    candidate_path: &Path,
    name: Option<&str>,
    tolerance: &ToleranceArgs,
    report_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = tolerance.resolve()?;
    let reference = read_png(reference_path)?;
    let candidate = read_png(candidate_path)?;

    let name = match name {
        Some(n) => n.to_string(),
        None => candidate_path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("cannot derive a snapshot name from the candidate path; pass --name")?
            .to_string(),
    };
    let id = SnapshotId::new(&name)?;

    // No baseline lookup: the reference is supplied directly.
    let snapshots = Snapshots::new(Arc::new(MemoryBaselineStore::new()), config)?;
    let result = snapshots
        .verify(&id, &reference, &candidate)
        .map(AssertOutcome::Passed);

    let report = ComparisonReport::from_result(&name, Some(&reference), &candidate, &result);
    finish(report, result, report_path, json)
}

fn cmd_verify(
    captured_path: &Path,
    name: &str,
    baselines: &Path,
    record: bool,
    tolerance: &ToleranceArgs,
    report_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut config = tolerance.resolve()?;
    if record {
        config = config.with_record_mode(true);
    }
    let captured = read_png(captured_path)?;

    let store = Arc::new(
        FsBaselineStore::new(baselines)
            .with_context(|| format!("cannot open baseline directory {:?}", baselines))?,
    );
    // Load the baseline once and verify against it. Recording, bad names and
    // unreadable or absent baselines go through the full assertion, which
    // reports them as such.
    let loaded = match SnapshotId::new(name) {
        Ok(id) if !config.record_mode => match store.load(&id) {
            Ok(Some(baseline)) => Some((id, baseline)),
            _ => None,
        },
        _ => None,
    };

    let snapshots = Snapshots::new(store, config)?;
    let result = match &loaded {
        Some((id, baseline)) => snapshots
            .verify(id, baseline, &captured)
            .map(AssertOutcome::Passed),
        None => snapshots.assert_snapshot(&captured, name),
    };

    let reference = loaded.as_ref().map(|(_, baseline)| baseline);
    let report = ComparisonReport::from_result(name, reference, &captured, &result);
    finish(report, result, report_path, json)
}

/// Print the outcome, write the optional report, and turn a failure into the
/// process error.
fn finish(
    report: ComparisonReport,
    result: std::result::Result<AssertOutcome, SnapshotError>,
    report_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = report_path {
        write_report(path, &report)?;
        info!(path = %path.display(), "report written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match result {
        Ok(AssertOutcome::Passed(stats)) => {
            if !json {
                println!(
                    "✓ {}: {} of {} pixels differ (max distance {})",
                    report.snapshot, stats.differing_pixels, stats.total_pixels, stats.max_distance
                );
            }
            Ok(())
        }
        Ok(AssertOutcome::Recorded { dimensions }) => {
            if !json {
                println!("✓ {}: recorded baseline ({})", report.snapshot, dimensions);
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn write_report(path: &Path, report: &ComparisonReport) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md") => write_report_md(path, report),
        _ => write_report_json(path, report),
    }
}

fn read_png(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    decode_png(&bytes).with_context(|| format!("Invalid PNG in {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use snapgate_core::{write_png_atomic, Verdict};

    fn write(dir: &Path, file: &str, image: &RgbaImage) -> PathBuf {
        let path = dir.join(file);
        write_png_atomic(&path, image).unwrap();
        path
    }

    fn tolerance(output_dir: &Path) -> ToleranceArgs {
        ToleranceArgs {
            output_dir: Some(output_dir.to_path_buf()),
            ..ToleranceArgs::default()
        }
    }

    fn read_report(path: &Path) -> ComparisonReport {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn cli_parses_compare_flags() {
        let cli = Cli::try_parse_from([
            "snapgate",
            "--verbose",
            "compare",
            "a.png",
            "b.png",
            "--max-distance",
            "0.01",
            "--h-shift",
            "1",
            "--max-differing-pixels",
            "5",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Compare { tolerance, .. } => {
                assert_eq!(tolerance.max_distance, Some(0.01));
                assert_eq!(tolerance.h_shift, Some(1));
                assert_eq!(tolerance.v_shift, None);
                assert_eq!(tolerance.max_differing_pixels, Some(5));
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn cli_rejects_conflicting_validators() {
        assert!(Cli::try_parse_from([
            "snapgate",
            "compare",
            "a.png",
            "b.png",
            "--max-differing-pixels",
            "5",
            "--max-fraction",
            "0.1",
        ])
        .is_err());
    }

    #[test]
    fn tolerance_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("snapgate.toml");
        std::fs::write(&config_path, "max_distance = 0.1\nvertical_shift = 2\n").unwrap();

        let args = ToleranceArgs {
            config: Some(config_path),
            h_shift: Some(1),
            max_fraction: Some(0.5),
            ..ToleranceArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.max_distance, 0.1);
        assert_eq!((config.horizontal_shift, config.vertical_shift), (1, 2));
        assert_eq!(
            config.validator,
            ValidatorPolicy::Threshold { max_fraction: 0.5 }
        );
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let args = ToleranceArgs {
            max_distance: Some(4.0),
            ..ToleranceArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn compare_identical_files_passes_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::from_pixel(8, 8, Rgba([40, 80, 120, 255]));
        let a = write(dir.path(), "a.png", &img);
        let b = write(dir.path(), "b.png", &img);
        let report = dir.path().join("report.json");

        cmd_compare(
            &a,
            &b,
            None,
            &tolerance(&dir.path().join("diffs")),
            Some(&report),
            false,
        )
        .unwrap();

        let parsed = read_report(&report);
        assert_eq!(parsed.snapshot, "b");
        assert_eq!(parsed.verdict, Verdict::Passed);
        assert_eq!(
            parsed.reference.map(|r| r.sha256),
            Some(parsed.candidate.sha256)
        );
        assert!(!dir.path().join("diffs").exists());
    }

    #[test]
    fn compare_different_files_fails_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(
            dir.path(),
            "a.png",
            &RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])),
        );
        let b = write(
            dir.path(),
            "b.png",
            &RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])),
        );
        let report = dir.path().join("report.json");

        let err = cmd_compare(
            &a,
            &b,
            Some("home"),
            &tolerance(&dir.path().join("diffs")),
            Some(&report),
            false,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Output written to: "));
        assert!(dir.path().join("diffs").join("home-diff.png").exists());

        let parsed = read_report(&report);
        assert_eq!(parsed.verdict, Verdict::Mismatch);
        assert_eq!(parsed.stats.map(|s| s.differing_pixels), Some(64));
    }

    #[test]
    fn verify_records_then_passes() {
        let dir = tempfile::tempdir().unwrap();
        let baselines = dir.path().join("baselines");
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let captured = write(dir.path(), "captured.png", &img);
        let args = tolerance(&dir.path().join("diffs"));

        cmd_verify(&captured, "home", &baselines, true, &args, None, false).unwrap();
        assert!(baselines.join("home.png").exists());

        let report = dir.path().join("report.md");
        cmd_verify(&captured, "home", &baselines, false, &args, Some(&report), false).unwrap();
        let md = std::fs::read_to_string(&report).unwrap();
        assert!(md.contains("- verdict: passed"));
        assert!(md.contains("- baseline: 4x4"));
    }

    #[test]
    fn verify_without_baseline_fails() {
        let dir = tempfile::tempdir().unwrap();
        let captured = write(dir.path(), "captured.png", &RgbaImage::new(2, 2));
        let err = cmd_verify(
            &captured,
            "home",
            &dir.path().join("baselines"),
            false,
            &tolerance(&dir.path().join("diffs")),
            None,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no baseline recorded"));
    }

    #[test]
    fn verify_mismatch_reports_stored_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let baselines = dir.path().join("baselines");
        let args = tolerance(&dir.path().join("diffs"));
        let recorded = write(
            dir.path(),
            "recorded.png",
            &RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])),
        );
        cmd_verify(&recorded, "home", &baselines, true, &args, None, false).unwrap();

        let captured = write(
            dir.path(),
            "captured.png",
            &RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255])),
        );
        let report = dir.path().join("report.json");
        let err = cmd_verify(&captured, "home", &baselines, false, &args, Some(&report), false)
            .unwrap_err();

        assert!(err.to_string().contains("Output written to: "));
        let parsed = read_report(&report);
        assert_eq!(parsed.verdict, Verdict::Mismatch);
        assert_eq!(
            parsed.reference.map(|r| r.dimensions.to_string()),
            Some("4x4".to_string())
        );
        assert_eq!(parsed.stats.map(|s| s.differing_pixels), Some(16));
    }

    #[test]
    fn verify_with_corrupt_baseline_reports_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let baselines = dir.path().join("baselines");
        std::fs::create_dir_all(&baselines).unwrap();
        std::fs::write(baselines.join("home.png"), b"not a png").unwrap();
        let captured = write(dir.path(), "captured.png", &RgbaImage::new(2, 2));
        let report = dir.path().join("report.json");

        let err = cmd_verify(
            &captured,
            "home",
            &baselines,
            false,
            &tolerance(&dir.path().join("diffs")),
            Some(&report),
            false,
        )
        .unwrap_err();

        assert!(err.to_string().contains("not a readable image"));
        let parsed = read_report(&report);
        assert_eq!(parsed.verdict, Verdict::Error);
        assert!(parsed.reference.is_none());
    }

    #[test]
    fn unreadable_image_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"not a png").unwrap();
        let err = read_png(&bogus).unwrap_err();
        assert!(err.to_string().contains("Invalid PNG"));
    }
}
