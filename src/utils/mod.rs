//! Internal utility functions for imageops-bilateral.
//!
//! This module contains the pixel normalization, quantization and
//! validation helpers shared by the grid stages.

use crate::error::BilateralError;
use image::{GenericImageView, Pixel, Primitive, Rgba};
use imageproc::definitions::Clamp;

/// Returns the default normalization divisor of an image's subpixel type.
///
/// This is `65535` for 16-bit images, `255` for 8-bit images and `1.0`
/// for floating-point images.
#[inline]
pub fn default_max_value<I>() -> f32
where
    I: GenericImageView + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    f32::from(<<I::Pixel as Pixel>::Subpixel as Primitive>::DEFAULT_MAX_VALUE)
}

/// Normalizes a subpixel value using a pre-computed max value.
///
/// This is more efficient when processing multiple pixels with the same type.
#[inline]
pub fn normalize_with_max<S>(value: S, max_value: f32) -> f32
where
    S: Primitive,
    f32: From<S>,
{
    f32::from(value) / max_value
}

/// Reads one pixel as normalized RGBA.
///
/// # Arguments
///
/// * `image` - The source image
/// * `x`, `y` - Pixel coordinates, must be in bounds
/// * `max_value` - Normalization divisor
///
/// # Returns
///
/// The four channels divided by `max_value`
#[inline]
pub fn read_normalized_rgba<I>(image: &I, x: u32, y: u32, max_value: f32) -> [f32; 4]
where
    I: GenericImageView + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    let Rgba(channels) = image.get_pixel(x, y).to_rgba();
    channels.map(|c| normalize_with_max(c, max_value))
}

/// Quantizes a value in `[0, 1]` to 8 bits, rounding to nearest and
/// clamping out-of-range values.
#[inline]
pub fn quantize_unit_to_u8(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp((value * 255.0).round())
}

/// Validates that an image has non-zero dimensions.
pub const fn validate_non_empty_image(width: u32, height: u32) -> Result<(), BilateralError> {
    if width == 0 || height == 0 {
        Err(BilateralError::EmptyImage { width, height })
    } else {
        Ok(())
    }
}

/// Validates that a float parameter is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> Result<(), BilateralError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BilateralError::InvalidParameter { name, value })
    }
}
