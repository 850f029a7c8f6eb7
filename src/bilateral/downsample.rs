use crate::bilateral::grid::Grid;
use crate::bilateral::params::FilterParameters;
use crate::error::BilateralError;
use crate::utils::read_normalized_rgba;
use image::{GenericImageView, Pixel};
use itertools::iproduct;

/// Splats every pixel into its nearest grid cell.
///
/// Each pixel adds its range values to the color sums of one cell and
/// increments that cell's weight. Many pixels share a cell, which is where
/// the grid gets its speed; the sums are order independent up to
/// floating-point rounding.
///
/// # Errors
///
/// * `BilateralError::InvalidDimensionality` - the parameters describe an
///   unsupported grid
pub fn downsample<I>(image: &I, params: &FilterParameters) -> Result<Grid, BilateralError>
where
    I: GenericImageView + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    let mut grid = Grid::new(&params.size)?;
    let channels = params.range_channels();
    let (width, height) = image.dimensions();

    for (y, x) in iproduct!(0..height, 0..width) {
        let [r, g, b, _] = read_normalized_rgba(image, x, y, params.max_value);
        let range = params.mode.project([r, g, b]);
        let point = params.sample_point(x, y, &range);
        let cell = point.nearest_cell(&params.size);
        grid.cell_mut(&cell[..params.dimension()])
            .accumulate(&range[..channels]);
    }

    Ok(grid)
}
