//! Snapshot assertion configuration.
//!
//! Plain struct with defaults, loadable from TOML and overridable from the
//! environment:
//!
//! | Variable                         | Field                     |
//! |----------------------------------|---------------------------|
//! | `SNAPGATE_RECORD`                | `record_mode`             |
//! | `SNAPGATE_MAX_DISTANCE`          | `max_distance`            |
//! | `SNAPGATE_H_SHIFT`               | `horizontal_shift`        |
//! | `SNAPGATE_V_SHIFT`               | `vertical_shift`          |
//! | `SNAPGATE_MAX_DIFFERING_PIXELS`  | `validator` (count)       |
//! | `SNAPGATE_OUTPUT_DIR`            | `output_dir`              |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compare::{CompareConfig, DEFAULT_MAX_DISTANCE};
use crate::domain::{Result, SnapshotError};
use crate::validate::ValidatorPolicy;

/// Default directory for diagnostic images, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "snapshot-diffs";

/// Settings for [`crate::Snapshots`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Persist captured images as new baselines instead of verifying them.
    pub record_mode: bool,
    /// Per-pixel distance (0.0–1.0) above which a pixel counts as differing.
    pub max_distance: f32,
    /// Horizontal shift tolerance in pixels.
    pub horizontal_shift: u32,
    /// Vertical shift tolerance in pixels.
    pub vertical_shift: u32,
    /// Built-in pass/fail policy, used unless a custom validator is supplied.
    pub validator: ValidatorPolicy,
    /// Directory diagnostic images are written to.
    pub output_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            record_mode: false,
            max_distance: DEFAULT_MAX_DISTANCE,
            horizontal_shift: 0,
            vertical_shift: 0,
            validator: ValidatorPolicy::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl SnapshotConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| SnapshotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SnapshotError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `SNAPGATE_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup` (an environment stand-in).
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(v) = lookup("SNAPGATE_RECORD") {
            self.record_mode = parse_flag("SNAPGATE_RECORD", &v)?;
        }
        if let Some(v) = lookup("SNAPGATE_MAX_DISTANCE") {
            self.max_distance = parse_value("SNAPGATE_MAX_DISTANCE", &v)?;
        }
        if let Some(v) = lookup("SNAPGATE_H_SHIFT") {
            self.horizontal_shift = parse_value("SNAPGATE_H_SHIFT", &v)?;
        }
        if let Some(v) = lookup("SNAPGATE_V_SHIFT") {
            self.vertical_shift = parse_value("SNAPGATE_V_SHIFT", &v)?;
        }
        if let Some(v) = lookup("SNAPGATE_MAX_DIFFERING_PIXELS") {
            self.validator = ValidatorPolicy::Count {
                max_differing_pixels: parse_value("SNAPGATE_MAX_DIFFERING_PIXELS", &v)?,
            };
        }
        if let Some(v) = lookup("SNAPGATE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        self.compare_config()
            .validate()
            .map_err(|e| SnapshotError::InvalidConfig(e.to_string()))?;
        self.validator.check().map_err(SnapshotError::InvalidConfig)
    }

    /// Comparator settings derived from this config.
    pub fn compare_config(&self) -> CompareConfig {
        CompareConfig {
            max_distance: self.max_distance,
            horizontal_shift: self.horizontal_shift,
            vertical_shift: self.vertical_shift,
        }
    }

    pub fn with_record_mode(mut self, record_mode: bool) -> Self {
        self.record_mode = record_mode;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_shift(mut self, horizontal: u32, vertical: u32) -> Self {
        self.horizontal_shift = horizontal;
        self.vertical_shift = vertical;
        self
    }

    pub fn with_max_differing_pixels(mut self, max_differing_pixels: u64) -> Self {
        self.validator = ValidatorPolicy::Count {
            max_differing_pixels,
        };
        self
    }

    pub fn with_validator_policy(mut self, policy: ValidatorPolicy) -> Self {
        self.validator = policy;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SnapshotError::InvalidConfig(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SnapshotError::InvalidConfig(format!("{key}: {e} (got {value:?})")))
}
