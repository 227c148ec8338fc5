use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::{BaselineStore, Result, StoreError};
use crate::codec::{decode_png, write_png_atomic};
use crate::domain::SnapshotId;

/// Filesystem-backed baseline store.
///
/// Layout: `<root>/<snapshot id>.png`, lossless PNG.
#[derive(Debug, Clone)]
pub struct FsBaselineStore {
    root: PathBuf,
}

impl FsBaselineStore {
    /// Create a store rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the baseline for `name` lives, whether or not it exists yet.
    pub fn baseline_path(&self, name: &SnapshotId) -> PathBuf {
        self.root.join(name.baseline_file_name())
    }
}

impl BaselineStore for FsBaselineStore {
    fn load(&self, name: &SnapshotId) -> Result<Option<RgbaImage>> {
        let path = self.baseline_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let image = decode_png(&bytes).map_err(|source| StoreError::Corrupt {
            name: name.clone(),
            source,
        })?;
        tracing::debug!(snapshot = %name, path = %path.display(), "baseline loaded");
        Ok(Some(image))
    }

    fn save(&self, name: &SnapshotId, image: &RgbaImage) -> Result<()> {
        let path = self.baseline_path(name);
        write_png_atomic(&path, image).map_err(|source| StoreError::Write {
            name: name.clone(),
            source,
        })?;
        tracing::debug!(snapshot = %name, path = %path.display(), "baseline saved");
        Ok(())
    }
}
