//! Linear RGB ↔ CIE XYZ projection used by the luminance variant.
//!
//! Fixed sRGB primaries with a D65 white point. The two matrices are
//! inverses of each other up to their printed precision, which keeps the
//! round trip well below one 8-bit quantization step.

/// Converts linear RGB to CIE XYZ (D65).
#[inline]
pub fn linear_rgb_to_xyz([r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
        0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
        0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
    ]
}

/// Converts CIE XYZ (D65) back to linear RGB.
#[inline]
pub fn xyz_to_linear_rgb([x, y, z]: [f32; 3]) -> [f32; 3] {
    [
        3.2404542 * x - 1.5371385 * y - 0.4985314 * z,
        -0.9692660 * x + 1.8760108 * y + 0.0415560 * z,
        0.0556434 * x - 0.2040259 * y + 1.0572252 * z,
    ]
}

/// Relative luminance (the Y component) of a linear RGB triple.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    linear_rgb_to_xyz(rgb)[1]
}
