use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use image::RgbaImage;

use super::{BaselineStore, Result};
use crate::domain::SnapshotId;

/// In-memory baseline store backed by a `HashMap<id, image>`.
#[derive(Debug, Default)]
pub struct MemoryBaselineStore {
    baselines: Mutex<HashMap<SnapshotId, RgbaImage>>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a baseline, returning the store for chaining.
    pub fn with_baseline(self, name: SnapshotId, image: RgbaImage) -> Self {
        self.lock().insert(name, image);
        self
    }

    /// Number of recorded baselines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SnapshotId, RgbaImage>> {
        self.baselines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load(&self, name: &SnapshotId) -> Result<Option<RgbaImage>> {
        Ok(self.lock().get(name).cloned())
    }

    fn save(&self, name: &SnapshotId, image: &RgbaImage) -> Result<()> {
        self.lock().insert(name.clone(), image.clone());
        Ok(())
    }
}
