use crate::bilateral::grid::{Cell, Grid};

/// Blurs the grid with a separable `(1, 2, 1) / 4` tent filter.
///
/// Axes are processed in order (x, y, then every range axis), `passes`
/// times each. Every pass reads one buffer and writes the other, then the
/// two swap roles, so a pass never observes its own writes. Only interior
/// cells are written; the border cells of both buffers are never splatted
/// into and stay zero, which keeps the ±1 stencil inside the allocation.
pub fn blur(grid: &mut Grid, passes: usize) {
    let mut scratch = grid.zeroed_like();

    for axis in 0..grid.dimension() {
        let stride = grid.stride(axis);
        for pass in 0..passes {
            std::mem::swap(grid, &mut scratch);
            tent_pass(&scratch, grid, stride);
            log::trace!("bilateral grid: axis {axis} pass {pass} done");
        }
    }
}

/// One tent-filter pass along the axis with the given stride.
fn tent_pass(src: &Grid, dst: &mut Grid, stride: usize) {
    let cells = src.cells();
    let out = dst.cells_mut();
    for index in src.interior() {
        let prev = cells[index - stride];
        let curr = cells[index];
        let next = cells[index + stride];
        out[index] = tent(prev, curr, next);
    }
}

#[inline]
fn tent(prev: Cell, curr: Cell, next: Cell) -> Cell {
    (prev + next).add_scaled(2.0, curr).scale(0.25)
}
