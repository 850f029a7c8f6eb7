use crate::error::BilateralError;
use std::ops::{Add, Mul};

/// Maximum number of range axes a grid can carry (R, G, B).
pub const MAX_RANGE_CHANNELS: usize = 3;

/// Maximum grid dimensionality: two spatial axes plus the range axes.
pub const MAX_DIMENSION: usize = 2 + MAX_RANGE_CHANNELS;

/// Minimum grid dimensionality: two spatial axes and one range axis.
pub const MIN_DIMENSION: usize = 3;

/// Upper bound on the number of cells a grid may allocate.
///
/// Two buffers of this many cells take 8 GiB. Larger shapes are reported
/// as [`BilateralError::GridTooLarge`].
pub const MAX_CELLS: usize = 1 << 27;

/// Accumulator stored at every grid vertex.
///
/// `colors` holds the per-channel sums of the samples splatted into the
/// cell and `weight` the number of contributing samples (the edge-stopping
/// mass). Lanes past the grid's channel count stay at zero, so the
/// arithmetic below never has to know how many channels are in use and
/// never allocates.
///
/// Sums are `f64` so a cell's weight stays an exact sample count past
/// 2^24 samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub colors: [f64; MAX_RANGE_CHANNELS],
    pub weight: f64,
}

impl Cell {
    pub const ZERO: Self = Self {
        colors: [0.0; MAX_RANGE_CHANNELS],
        weight: 0.0,
    };

    /// Adds one sample to the cell.
    #[inline]
    pub fn accumulate(&mut self, sample: &[f32]) {
        for (color, &value) in self.colors.iter_mut().zip(sample) {
            *color += f64::from(value);
        }
        self.weight += 1.0;
    }

    /// Returns `self + alpha * other`.
    #[inline]
    #[must_use]
    pub fn add_scaled(self, alpha: f64, other: Self) -> Self {
        Self {
            colors: [
                alpha.mul_add(other.colors[0], self.colors[0]),
                alpha.mul_add(other.colors[1], self.colors[1]),
                alpha.mul_add(other.colors[2], self.colors[2]),
            ],
            weight: alpha.mul_add(other.weight, self.weight),
        }
    }

    /// Returns the cell scaled by `alpha`.
    #[inline]
    #[must_use]
    pub fn scale(self, alpha: f64) -> Self {
        self * alpha
    }

    /// Divides the color sums by the weight.
    ///
    /// Cells without mass yield zero.
    #[inline]
    #[must_use]
    pub fn normalized(self) -> [f64; MAX_RANGE_CHANNELS] {
        if self.weight == 0.0 {
            return [0.0; MAX_RANGE_CHANNELS];
        }
        let inv = self.weight.recip();
        self.colors.map(|c| c * inv)
    }
}

impl Add for Cell {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            colors: [
                self.colors[0] + rhs.colors[0],
                self.colors[1] + rhs.colors[1],
                self.colors[2] + rhs.colors[2],
            ],
            weight: self.weight + rhs.weight,
        }
    }
}

impl Mul<f64> for Cell {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            colors: self.colors.map(|c| c * rhs),
            weight: self.weight * rhs,
        }
    }
}

/// Number of cells in a grid of the given shape.
///
/// # Errors
///
/// * `BilateralError::GridTooLarge` - the product overflows or exceeds
///   [`MAX_CELLS`]
pub fn cell_count(size: &[usize]) -> Result<usize, BilateralError> {
    let cells = size
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
        .unwrap_or(usize::MAX);
    if cells > MAX_CELLS {
        return Err(BilateralError::GridTooLarge { cells });
    }
    Ok(cells)
}

/// Dense D-dimensional array of [`Cell`]s.
///
/// Axis 0 and 1 are the spatial axes (x, y), the remaining axes are the
/// range axes. The backing storage is a single `Vec`: the spatial axes are
/// addressed directly and the range axes are linearized with
/// multiplicative strides, `z1 + z2 * size[2] + z3 * size[2] * size[3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: Vec<usize>,
    strides: Vec<usize>,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocates a zeroed grid with the given per-axis sizes.
    ///
    /// # Errors
    ///
    /// * `BilateralError::InvalidDimensionality` - fewer than 3 or more than 5 axes
    /// * `BilateralError::GridTooLarge` - the shape needs more than [`MAX_CELLS`] cells
    pub fn new(size: &[usize]) -> Result<Self, BilateralError> {
        let dimension = size.len();
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dimension) {
            return Err(BilateralError::InvalidDimensionality { dimension });
        }

        let len = cell_count(size)?;
        let range_len: usize = size[2..].iter().product();
        let mut strides = vec![0; dimension];
        strides[0] = size[1] * range_len;
        strides[1] = range_len;
        let mut stride = 1;
        for axis in 2..dimension {
            strides[axis] = stride;
            stride *= size[axis];
        }

        Ok(Self {
            size: size.to_vec(),
            strides,
            cells: vec![Cell::ZERO; len],
        })
    }

    /// A zeroed grid with the same shape.
    #[must_use]
    pub fn zeroed_like(&self) -> Self {
        Self {
            size: self.size.clone(),
            strides: self.strides.clone(),
            cells: vec![Cell::ZERO; self.cells.len()],
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    /// Number of range channels carried by every cell.
    #[inline]
    pub fn channels(&self) -> usize {
        self.size.len() - 2
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[inline]
    pub fn stride(&self, axis: usize) -> usize {
        self.strides[axis]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear index of an integer grid coordinate.
    #[inline]
    pub fn index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.size.len());
        coords
            .iter()
            .zip(&self.strides)
            .map(|(coord, stride)| coord * stride)
            .sum()
    }

    #[inline]
    pub fn cell(&self, coords: &[usize]) -> &Cell {
        &self.cells[self.index(coords)]
    }

    #[inline]
    pub fn cell_mut(&mut self, coords: &[usize]) -> &mut Cell {
        let index = self.index(coords);
        &mut self.cells[index]
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Replaces every cell's color sums by their mean, keeping the weight.
    pub fn normalize(&mut self) {
        for cell in &mut self.cells {
            cell.colors = cell.normalized();
        }
    }

    /// Iterates over the linear indices of every interior cell, i.e. cells
    /// whose coordinate is in `1..size - 1` on every axis.
    pub fn interior(&self) -> InteriorIndices<'_> {
        InteriorIndices::new(self)
    }
}

/// Iterator returned by [`Grid::interior`].
///
/// Walks an odometer over the interior coordinates with the stride-1 axis
/// varying fastest. The coordinate buffer is a fixed array, so iteration
/// does not allocate.
pub struct InteriorIndices<'a> {
    grid: &'a Grid,
    coords: [usize; MAX_DIMENSION],
    done: bool,
}

impl<'a> InteriorIndices<'a> {
    fn new(grid: &'a Grid) -> Self {
        let dimension = grid.dimension();
        let mut coords = [0; MAX_DIMENSION];
        coords[..dimension].fill(1);
        Self {
            grid,
            coords,
            done: grid.size.iter().any(|&s| s < 3),
        }
    }

    /// Axes ordered from the fastest to the slowest varying one.
    fn axis_order(dimension: usize) -> impl Iterator<Item = usize> {
        (2..dimension).chain([1, 0])
    }
}

impl Iterator for InteriorIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let dimension = self.grid.dimension();
        let index = self.grid.index(&self.coords[..dimension]);

        self.done = true;
        for axis in Self::axis_order(dimension) {
            if self.coords[axis] + 2 < self.grid.size[axis] {
                self.coords[axis] += 1;
                self.done = false;
                break;
            }
            self.coords[axis] = 1;
        }

        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_unsupported_dimensionality() {
        assert_eq!(
            Grid::new(&[4, 4]),
            Err(BilateralError::InvalidDimensionality { dimension: 2 })
        );
        assert!(Grid::new(&[4, 4, 4, 4, 4, 4]).is_err());
        assert!(Grid::new(&[4, 4, 4]).is_ok());
    }

    #[test]
    fn index_uses_direct_spatial_and_strided_range_addressing() {
        let grid = Grid::new(&[3, 4, 5, 6, 7]).unwrap();
        assert_eq!(grid.len(), 3 * 4 * 5 * 6 * 7);
        assert_eq!(grid.index(&[0, 0, 1, 0, 0]), 1);
        assert_eq!(grid.index(&[0, 0, 0, 1, 0]), 5);
        assert_eq!(grid.index(&[0, 0, 0, 0, 1]), 30);
        assert_eq!(grid.index(&[0, 1, 0, 0, 0]), 210);
        assert_eq!(grid.index(&[1, 0, 0, 0, 0]), 840);
        assert_eq!(grid.index(&[2, 3, 4, 5, 6]), grid.len() - 1);
    }

    #[test]
    fn cell_mut_writes_are_visible_through_cell() {
        let mut grid = Grid::new(&[5, 5, 5]).unwrap();
        grid.cell_mut(&[2, 3, 1]).accumulate(&[0.5]);
        grid.cell_mut(&[2, 3, 1]).accumulate(&[0.25]);

        let cell = grid.cell(&[2, 3, 1]);
        assert_eq!(cell.colors[0], 0.75);
        assert_eq!(cell.weight, 2.0);
        assert_eq!(grid.cell(&[3, 2, 1]), &Cell::ZERO);
    }

    #[test]
    fn cell_arithmetic_matches_tent_stencil() {
        let prev = Cell {
            colors: [1.0, 2.0, 3.0],
            weight: 1.0,
        };
        let curr = Cell {
            colors: [2.0, 2.0, 2.0],
            weight: 2.0,
        };
        let next = Cell {
            colors: [3.0, 2.0, 1.0],
            weight: 3.0,
        };

        let blurred = (prev + next).add_scaled(2.0, curr).scale(0.25);
        assert_eq!(blurred.colors, [2.0, 2.0, 2.0]);
        assert_eq!(blurred.weight, 2.0);
    }

    #[test]
    fn normalized_skips_empty_cells() {
        let empty = Cell::ZERO;
        assert_eq!(empty.normalized(), [0.0; 3]);

        let cell = Cell {
            colors: [1.0, 2.0, 0.0],
            weight: 4.0,
        };
        assert_eq!(cell.normalized(), [0.25, 0.5, 0.0]);
    }

    #[test]
    fn interior_visits_each_inner_cell_once() {
        let grid = Grid::new(&[4, 5, 3, 4]).unwrap();
        let indices: Vec<usize> = grid.interior().collect();
        assert_eq!(indices.len(), 12);

        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), indices.len());

        assert!(indices.contains(&grid.index(&[1, 1, 1, 1])));
        assert!(indices.contains(&grid.index(&[2, 3, 1, 2])));
        assert!(!indices.contains(&grid.index(&[0, 1, 1, 1])));
        assert!(!indices.contains(&grid.index(&[1, 1, 1, 3])));
    }

    #[test]
    fn new_rejects_grids_past_the_cell_limit() {
        assert_eq!(cell_count(&[5, 5, 7]), Ok(175));
        assert_eq!(
            Grid::new(&[1 << 10, 1 << 10, 1 << 10]),
            Err(BilateralError::GridTooLarge { cells: 1 << 30 })
        );
        assert_eq!(
            Grid::new(&[usize::MAX / 2, 5, 5]),
            Err(BilateralError::GridTooLarge { cells: usize::MAX })
        );
    }

    #[test]
    fn weight_keeps_counting_past_f32_precision() {
        let mut cell = Cell::ZERO;
        let samples = (1u32 << 24) + 1;
        for _ in 0..samples {
            cell.accumulate(&[0.5]);
        }
        assert_eq!(cell.weight, f64::from(samples));
        assert_eq!(cell.normalized()[0], 0.5);
    }

    #[test]
    fn interior_is_empty_for_axes_without_inner_cells() {
        let grid = Grid::new(&[2, 5, 5]).unwrap();
        assert_eq!(grid.interior().count(), 0);
    }
}
