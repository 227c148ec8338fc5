//! Per-pixel color distance.

use image::Rgba;

/// Largest possible Euclidean distance between two RGBA8 colors:
/// `sqrt(4 * 255²)`.
const MAX_RGBA_DISTANCE: f32 = 510.0;

/// Normalized Euclidean distance between two RGBA8 pixels.
///
/// Returns `0.0` for identical colors and `1.0` for colors that differ by the
/// full range on every channel (e.g. opaque black vs. transparent white).
pub fn pixel_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f32 {
    if a == b {
        return 0.0;
    }
    let sum: u32 = a
        .0
        .iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = u32::from(x.abs_diff(y));
            d * d
        })
        .sum();
    ((sum as f32).sqrt() / MAX_RGBA_DISTANCE).min(1.0)
}
