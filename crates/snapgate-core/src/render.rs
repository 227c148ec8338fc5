//! Diagnostic image rendering.
//!
//! Two layouts, both deterministic for identical inputs:
//!
//! - **Mismatch overlay** ([`render_mismatch`]): congruent to the compared
//!   images. Pixels over the distance threshold are painted opaque magenta;
//!   every other pixel is the candidate pixel faded toward white, so the
//!   differing regions stand out while the surrounding UI stays readable.
//! - **Size mismatch** ([`render_size_mismatch`]): reference and candidate
//!   side by side on a canvas exactly twice the candidate's width.
//!
//! PNG cannot hold a zero-width or zero-height image, so both canvases are at
//! least one pixel along each axis. Padding is transparent.

use image::{imageops, Rgba, RgbaImage};

use crate::compare::DifferenceMap;

/// Color of differing pixels in the mismatch overlay.
pub const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Fade a pixel toward white, keeping a quarter of its contrast.
fn fade(pixel: &Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, _] = pixel.0;
    let f = |c: u8| 255 - (255 - c) / 4;
    Rgba([f(r), f(g), f(b), 255])
}

/// Overlay of `candidate` with every pixel of `map` above `max_distance`
/// highlighted.
///
/// `reference`, `candidate` and `map` must be congruent; pixels outside the
/// map are treated as matching. Empty inputs yield a transparent canvas of at
/// least 1x1.
pub fn render_mismatch(
    reference: &RgbaImage,
    candidate: &RgbaImage,
    map: &DifferenceMap,
    max_distance: f32,
) -> RgbaImage {
    debug_assert_eq!(reference.dimensions(), candidate.dimensions());
    let (width, height) = candidate.dimensions();
    if width == 0 || height == 0 {
        return RgbaImage::new(width.max(1), height.max(1));
    }
    RgbaImage::from_fn(width, height, |x, y| {
        if map.exceeds(x, y, max_distance) {
            HIGHLIGHT
        } else {
            fade(candidate.get_pixel(x, y))
        }
    })
}

/// Side-by-side composite for images of different sizes.
///
/// The canvas is exactly `2 * candidate.width()` wide and
/// `max(reference.height(), candidate.height())` tall. The reference occupies
/// the left pane (clipped to the pane if it is wider than the candidate), the
/// candidate the right pane. Uncovered area is transparent.
///
/// A zero-width candidate gets 1-pixel panes (canvas width 2), and a canvas
/// with no height is 1 pixel tall.
pub fn render_size_mismatch(reference: &RgbaImage, candidate: &RgbaImage) -> RgbaImage {
    let pane_width = candidate.width().max(1);
    let height = reference.height().max(candidate.height()).max(1);
    let mut canvas = RgbaImage::new(pane_width * 2, height);

    let left_width = reference.width().min(pane_width);
    let left = imageops::crop_imm(reference, 0, 0, left_width, reference.height()).to_image();
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, candidate, i64::from(pane_width), 0);

    canvas
}
