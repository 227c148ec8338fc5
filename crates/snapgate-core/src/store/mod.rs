//! Baseline storage.
//!
//! The engine only borrows baselines; where they live is up to the
//! [`BaselineStore`] implementation. [`fs::FsBaselineStore`] keeps one PNG per
//! snapshot in a directory, [`memory::MemoryBaselineStore`] keeps them in
//! memory for tests.

pub mod fs;
pub mod memory;

use image::RgbaImage;
use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::SnapshotId;

/// Errors from baseline storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("baseline '{name}' is not a readable image: {source}")]
    Corrupt {
        name: SnapshotId,
        #[source]
        source: CodecError,
    },

    #[error("failed to write baseline '{name}': {source}")]
    Write {
        name: SnapshotId,
        #[source]
        source: CodecError,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Source of recorded baseline images, keyed by snapshot id.
pub trait BaselineStore: Send + Sync {
    /// Load the baseline for `name`; `Ok(None)` when none has been recorded.
    fn load(&self, name: &SnapshotId) -> Result<Option<RgbaImage>>;

    /// Record `image` as the baseline for `name`, replacing any previous one.
    fn save(&self, name: &SnapshotId, image: &RgbaImage) -> Result<()>;
}
