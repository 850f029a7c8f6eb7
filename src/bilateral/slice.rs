use crate::bilateral::colorspace::{linear_rgb_to_xyz, xyz_to_linear_rgb};
use crate::bilateral::grid::{Cell, Grid, MAX_DIMENSION};
use crate::bilateral::params::{FilterMode, FilterParameters, SamplePoint};
use crate::utils::quantize_unit_to_u8;
use image::Rgba;

/// Multilinear interpolation of the grid at a continuous coordinate.
///
/// Visits the `2^D` corners of the cell containing the point. Corner
/// indices are clamped to `[0, size - 1]`, so an axis collapsed to a
/// single valid index contributes its full weight to that index.
pub fn interpolate(grid: &Grid, point: &SamplePoint) -> Cell {
    let size = grid.size();
    let dimension = grid.dimension();

    let mut lower = [0usize; MAX_DIMENSION];
    let mut upper = [0usize; MAX_DIMENSION];
    let mut alpha = [0f64; MAX_DIMENSION];
    for (axis, &coord) in point.coords().iter().enumerate() {
        let last = size[axis] - 1;
        lower[axis] = (coord.floor().max(0.0) as usize).min(last);
        upper[axis] = (lower[axis] + 1).min(last);
        alpha[axis] = f64::from((coord - lower[axis] as f32).clamp(0.0, 1.0));
    }

    let cells = grid.cells();
    let mut result = Cell::ZERO;
    for corner in 0..1usize << dimension {
        let mut index = 0;
        let mut weight = 1.0;
        for axis in 0..dimension {
            if (corner >> axis) & 1 == 1 {
                index += upper[axis] * grid.stride(axis);
                weight *= alpha[axis];
            } else {
                index += lower[axis] * grid.stride(axis);
                weight *= 1.0 - alpha[axis];
            }
        }
        result = result.add_scaled(weight, cells[index]);
    }
    result
}

/// Produces the filtered 8-bit pixel for source pixel `(x, y)`.
///
/// `rgba` is the normalized source pixel; its alpha is passed through.
pub fn reconstruct(
    grid: &Grid,
    params: &FilterParameters,
    x: u32,
    y: u32,
    rgba: [f32; 4],
) -> Rgba<u8> {
    let [r, g, b, a] = rgba;
    let [r, g, b] = match params.mode {
        FilterMode::Color => reconstruct_color(grid, params, x, y, [r, g, b]),
        FilterMode::Luminance => reconstruct_luminance(grid, params, x, y, [r, g, b]),
    };
    Rgba([
        quantize_unit_to_u8(r),
        quantize_unit_to_u8(g),
        quantize_unit_to_u8(b),
        quantize_unit_to_u8(a),
    ])
}

/// Reads R, G, B straight from a per-channel grid.
///
/// The interpolated sums are divided by the interpolated weight; a grid
/// collapsed to one gray channel replicates it over all three.
fn reconstruct_color(
    grid: &Grid,
    params: &FilterParameters,
    x: u32,
    y: u32,
    rgb: [f32; 3],
) -> [f32; 3] {
    let point = params.sample_point(x, y, &rgb);
    let filtered = interpolate(grid, &point).normalized();
    let last = params.range_channels() - 1;
    [0, 1, 2].map(|channel| filtered[channel.min(last)] as f32)
}

/// Smooths luminance through a normalized one-channel grid and keeps chroma.
///
/// The change in Y is applied to X and Z as well before projecting back,
/// so the pixel gets brighter or darker without shifting hue.
fn reconstruct_luminance(
    grid: &Grid,
    params: &FilterParameters,
    x: u32,
    y: u32,
    rgb: [f32; 3],
) -> [f32; 3] {
    let [cx, cy, cz] = linear_rgb_to_xyz(rgb);
    let point = params.sample_point(x, y, &[cy]);
    let filtered = interpolate(grid, &point).colors[0] as f32;
    let shift = filtered - cy;
    xyz_to_linear_rgb([cx + shift, filtered, cz + shift])
}
