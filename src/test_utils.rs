//! Test utilities for imageops-bilateral
//!
//! This module provides the small fixture images shared by the unit tests.
//! It is only compiled when running tests.

use crate::Image;
use image::{Rgb, Rgba};

/// Creates a test RGB image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Creates a test RGBA image with predefined pixel values for testing.
///
/// Same colors as [`create_test_rgb_image`], with alpha:
/// - (0,0): 255 (opaque)
/// - (1,0): 128 (semi-transparent)
/// - (0,1): 64  (more transparent)
/// - (1,1): 0   (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates a gray RGB image split into two flat halves.
///
/// Columns `x < width / 2` get `left`, the rest get `right`.
pub fn create_step_image(width: u32, height: u32, left: u8, right: u8) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, _| {
        let level = if x < width / 2 { left } else { right };
        Rgb([level; 3])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn create_step_image_splits_at_half_width() {
        let image = create_step_image(6, 2, 10, 240);
        assert_eq!(image.get_pixel(2, 1), &Rgb([10, 10, 10]));
        assert_eq!(image.get_pixel(3, 0), &Rgb([240, 240, 240]));
    }
}
