//! Persisting diagnostic images.
//!
//! Diagnostics land at a deterministic path derived from the snapshot id:
//! `<output_dir>/<id>-diff.png` for a pixel mismatch and
//! `<output_dir>/<id>-sizemismatch.png` for a dimension mismatch. Reported
//! paths are always absolute.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{write_png_atomic, CodecError};
use crate::domain::{Dimensions, SnapshotId};

/// Errors from writing a diagnostic image.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("cannot resolve diagnostic output path {path:?}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write diagnostic {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

/// Which failure a diagnostic documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Congruent images that failed validation.
    Mismatch,
    /// Images whose dimensions differ.
    SizeMismatch,
}

impl DiagnosticKind {
    fn file_suffix(self) -> &'static str {
        match self {
            DiagnosticKind::Mismatch => "diff",
            DiagnosticKind::SizeMismatch => "sizemismatch",
        }
    }
}

/// A diagnostic image that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticArtifact {
    pub kind: DiagnosticKind,
    /// Absolute path of the written PNG.
    pub path: PathBuf,
    /// Dimensions of the rendered image.
    pub dimensions: Dimensions,
}

/// Writes diagnostic PNGs under a fixed output directory.
#[derive(Debug, Clone)]
pub struct DiagnosticWriter {
    output_dir: PathBuf,
}

impl DiagnosticWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Absolute path the diagnostic of `kind` for `name` is written to.
    pub fn path_for(
        &self,
        name: &SnapshotId,
        kind: DiagnosticKind,
    ) -> Result<PathBuf, DiagnosticError> {
        let relative = self
            .output_dir
            .join(format!("{}-{}.png", name, kind.file_suffix()));
        std::path::absolute(&relative).map_err(|source| DiagnosticError::Resolve {
            path: relative,
            source,
        })
    }

    /// Write `image` as the diagnostic of `kind` for `name`.
    pub fn write(
        &self,
        name: &SnapshotId,
        kind: DiagnosticKind,
        image: &RgbaImage,
    ) -> Result<DiagnosticArtifact, DiagnosticError> {
        let path = self.path_for(name, kind)?;
        write_png_atomic(&path, image).map_err(|source| DiagnosticError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(DiagnosticArtifact {
            kind,
            path,
            dimensions: Dimensions::of(image),
        })
    }
}
