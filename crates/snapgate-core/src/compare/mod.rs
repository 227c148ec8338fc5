//! Image comparison.
//!
//! A comparator scores every pixel of a candidate image against a congruent
//! reference image and produces a [`DifferenceMap`] plus aggregate
//! [`DifferenceStats`]. [`DistanceComparator`] tolerates small spatial offsets
//! by searching a shift window around each pixel and keeping the minimum
//! distance, which absorbs anti-aliasing jitter between renders.

pub mod distance;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{congruent, Dimensions};

pub use distance::pixel_distance;

/// Default per-pixel distance above which a pixel counts as differing.
pub const DEFAULT_MAX_DISTANCE: f32 = 0.004;

/// Errors from comparator construction or use.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("images are not congruent: reference {reference}, candidate {candidate}")]
    Incongruent {
        reference: Dimensions,
        candidate: Dimensions,
    },

    #[error("max distance must be within [0.0, 1.0], got {0}")]
    InvalidMaxDistance(f32),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tolerances used by [`DistanceComparator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Normalized distance (0.0–1.0) above which a pixel is "differing".
    pub max_distance: f32,
    /// Pixels of horizontal offset searched in each direction.
    pub horizontal_shift: u32,
    /// Pixels of vertical offset searched in each direction.
    pub vertical_shift: u32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            horizontal_shift: 0,
            vertical_shift: 0,
        }
    }
}

impl CompareConfig {
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_shift(mut self, horizontal: u32, vertical: u32) -> Self {
        self.horizontal_shift = horizontal;
        self.vertical_shift = vertical;
        self
    }

    /// Reject a `max_distance` outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<(), CompareError> {
        if (0.0..=1.0).contains(&self.max_distance) {
            Ok(())
        } else {
            Err(CompareError::InvalidMaxDistance(self.max_distance))
        }
    }
}

// ---------------------------------------------------------------------------
// Difference map and statistics
// ---------------------------------------------------------------------------

/// One distance value per pixel, congruent to the compared images.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceMap {
    width: u32,
    height: u32,
    distances: Vec<f32>,
}

impl DifferenceMap {
    fn new(width: u32, height: u32, distances: Vec<f32>) -> Self {
        debug_assert_eq!(distances.len() as u64, u64::from(width) * u64::from(height));
        Self {
            width,
            height,
            distances,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Distance recorded for `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.distances
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Whether the pixel at `(x, y)` is strictly farther than `max_distance`.
    pub fn exceeds(&self, x: u32, y: u32, max_distance: f32) -> bool {
        self.get(x, y).is_some_and(|d| d > max_distance)
    }

    /// All distances in row-major order.
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Number of pixels strictly farther than `max_distance`.
    pub fn count_exceeding(&self, max_distance: f32) -> u64 {
        self.distances.iter().filter(|&&d| d > max_distance).count() as u64
    }

    /// Aggregate the map under `max_distance`.
    pub fn stats(&self, max_distance: f32) -> DifferenceStats {
        let mut differing = 0u64;
        let mut peak = 0.0f32;
        let mut sum = 0.0f64;
        for &d in &self.distances {
            if d > max_distance {
                differing += 1;
            }
            peak = peak.max(d);
            sum += f64::from(d);
        }
        let total = self.distances.len() as u64;
        let mean = if total == 0 {
            0.0
        } else {
            (sum / total as f64) as f32
        };
        DifferenceStats {
            differing_pixels: differing,
            total_pixels: total,
            max_distance,
            peak_distance: peak,
            mean_distance: mean,
        }
    }
}

/// Aggregate view of a [`DifferenceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferenceStats {
    /// Pixels whose distance is strictly greater than `max_distance`.
    pub differing_pixels: u64,
    pub total_pixels: u64,
    /// Threshold the count was taken under.
    pub max_distance: f32,
    /// Largest per-pixel distance found.
    pub peak_distance: f32,
    pub mean_distance: f32,
}

impl DifferenceStats {
    /// Share of differing pixels, 0.0–1.0. Empty images report `0.0`.
    pub fn differing_fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.differing_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// The output of a comparator: the per-pixel map and its aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub map: DifferenceMap,
    pub stats: DifferenceStats,
}

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

/// Scores a candidate image against a congruent reference.
pub trait ImageComparator: Send + Sync {
    /// Compare `candidate` against `reference`.
    ///
    /// Callers must pass congruent images; implementations return
    /// [`CompareError::Incongruent`] otherwise.
    fn compare(
        &self,
        reference: &RgbaImage,
        candidate: &RgbaImage,
    ) -> Result<Comparison, CompareError>;
}

/// Normalized-Euclidean comparator with a shift-tolerance search window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceComparator {
    config: CompareConfig,
}

impl DistanceComparator {
    pub fn new(config: CompareConfig) -> Result<Self, CompareError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Minimum distance between the candidate pixel at `(x, y)` and any
    /// in-bounds reference pixel inside the shift window.
    fn min_shifted_distance(
        &self,
        reference: &RgbaImage,
        candidate: &RgbaImage,
        x: u32,
        y: u32,
    ) -> f32 {
        let pixel = candidate.get_pixel(x, y);
        let h = i64::from(self.config.horizontal_shift);
        let v = i64::from(self.config.vertical_shift);
        let (width, height) = (i64::from(reference.width()), i64::from(reference.height()));

        let y_range = (i64::from(y) - v).max(0)..=(i64::from(y) + v).min(height - 1);
        let x_range = (i64::from(x) - h).max(0)..=(i64::from(x) + h).min(width - 1);

        let mut best = f32::INFINITY;
        for ry in y_range {
            for rx in x_range.clone() {
                let d = pixel_distance(pixel, reference.get_pixel(rx as u32, ry as u32));
                if d < best {
                    best = d;
                    if best == 0.0 {
                        return 0.0;
                    }
                }
            }
        }
        best
    }
}

impl ImageComparator for DistanceComparator {
    fn compare(
        &self,
        reference: &RgbaImage,
        candidate: &RgbaImage,
    ) -> Result<Comparison, CompareError> {
        if !congruent(reference, candidate) {
            return Err(CompareError::Incongruent {
                reference: Dimensions::of(reference),
                candidate: Dimensions::of(candidate),
            });
        }

        let (width, height) = candidate.dimensions();
        let mut distances = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                distances.push(self.min_shifted_distance(reference, candidate, x, y));
            }
        }

        let map = DifferenceMap::new(width, height, distances);
        let stats = map.stats(self.config.max_distance);
        tracing::debug!(
            width,
            height,
            differing_pixels = stats.differing_pixels,
            peak_distance = stats.peak_distance,
            "images compared"
        );
        Ok(Comparison { map, stats })
    }
}
