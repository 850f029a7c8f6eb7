use thiserror::Error;

/// Error type for bilateral grid filtering
///
/// This error type covers invalid filter parameters, malformed
/// images and queries issued against a filter in the wrong state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BilateralError {
    /// The source image has no pixels
    ///
    /// The parameter estimator needs at least one pixel to derive
    /// the range extents of the grid.
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A configuration value is outside its valid domain
    ///
    /// Bandwidths and the normalization divisor must be finite and
    /// positive, paddings must exceed the blur stencil radius and at
    /// least one blur pass is required.
    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Name of the offending field
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A grid was requested with an unsupported number of axes
    ///
    /// Grids have two spatial axes and one to three range axes.
    #[error("Grid dimensionality must be between 3 and 5, got {dimension}")]
    InvalidDimensionality { dimension: usize },

    /// The grid needed for these bandwidths is too large to allocate
    ///
    /// Very small bandwidths relative to the image extent multiply into
    /// an enormous number of cells. `cells` saturates at `usize::MAX`.
    #[error("Grid would need {cells} cells, more than can be allocated")]
    GridTooLarge { cells: usize },

    /// A source sample is NaN or infinite
    #[error("Non-finite sample at pixel ({x}, {y})")]
    NonFiniteSample { x: u32, y: u32 },

    /// The filter was queried before `execute` finished
    #[error("Filter has not been executed")]
    NotExecuted,

    /// A point query fell outside the source image
    #[error("Pixel ({x}, {y}) is out of bounds for a {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}
