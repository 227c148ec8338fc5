use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Two images are congruent iff their width and height match exactly.
pub fn congruent(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() == b.dimensions()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_width_by_height() {
        assert_eq!(Dimensions::new(1080, 1920).to_string(), "1080x1920");
    }

    #[test]
    fn pixel_count_does_not_overflow_u32() {
        let d = Dimensions::new(u32::MAX, 2);
        assert_eq!(d.pixel_count(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn congruence_requires_both_axes() {
        let a = RgbaImage::new(4, 3);
        assert!(congruent(&a, &RgbaImage::new(4, 3)));
        assert!(!congruent(&a, &RgbaImage::new(3, 4)));
        assert!(!congruent(&a, &RgbaImage::new(4, 4)));
    }
}
