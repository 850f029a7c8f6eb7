use crate::bilateral::colorspace::luminance;
use crate::bilateral::grid::{cell_count, MAX_DIMENSION, MAX_RANGE_CHANNELS};
use crate::error::BilateralError;
use crate::utils::{
    default_max_value, read_normalized_rgba, validate_non_empty_image, validate_positive,
};
use image::{GenericImageView, Pixel};
use itertools::iproduct;

/// Which quantity the grid's range axes track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// One range axis per color channel; the filtered R, G, B are read
    /// straight from the grid.
    #[default]
    Color,
    /// A single CIE-Y range axis; only luminance is smoothed and the
    /// chroma of the source pixel is kept.
    Luminance,
}

impl FilterMode {
    /// Projects a normalized RGB triple onto the range values tracked in
    /// this mode. Lanes past the mode's channel count are zero.
    #[inline]
    pub fn project(self, rgb: [f32; 3]) -> [f32; MAX_RANGE_CHANNELS] {
        match self {
            Self::Color => rgb,
            Self::Luminance => [luminance(rgb), 0.0, 0.0],
        }
    }
}

/// Range bandwidth selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SigmaRange {
    /// Explicit bandwidth in normalized channel units.
    Fixed(f32),
    /// Derived as `(max - min) * 0.1` over all tracked range channels.
    Auto,
}

/// Per-instance filter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralConfig {
    /// Spatial bandwidth in pixels.
    pub sigma_space: f32,
    pub sigma_range: SigmaRange,
    /// Border cells added on each side of the spatial axes.
    pub space_padding: usize,
    /// Border cells added on each side of the range axes.
    pub range_padding: usize,
    /// Channel normalization divisor; `None` uses the subpixel type's maximum.
    pub normalization: Option<f32>,
    pub mode: FilterMode,
    /// Whether a grayscale image may collapse to a single range axis.
    pub collapse_grayscale: bool,
    /// Tent filter passes per grid axis.
    pub blur_passes: usize,
}

impl BilateralConfig {
    pub const DEFAULT_SIGMA_SPACE: f32 = 16.0;
    pub const AUTO_RANGE_FACTOR: f32 = 0.1;
    pub const DEFAULT_PADDING: usize = 2;
    pub const DEFAULT_BLUR_PASSES: usize = 2;

    /// Padding must exceed the stencil radius of the tent filter.
    const MIN_PADDING: usize = 2;

    pub const fn new(sigma_space: f32, sigma_range: f32) -> Self {
        Self {
            sigma_space,
            sigma_range: SigmaRange::Fixed(sigma_range),
            space_padding: Self::DEFAULT_PADDING,
            range_padding: Self::DEFAULT_PADDING,
            normalization: None,
            mode: FilterMode::Color,
            collapse_grayscale: true,
            blur_passes: Self::DEFAULT_BLUR_PASSES,
        }
    }

    /// Default spatial bandwidth with an automatically derived range bandwidth.
    pub const fn auto() -> Self {
        let mut config = Self::new(Self::DEFAULT_SIGMA_SPACE, 0.0);
        config.sigma_range = SigmaRange::Auto;
        config
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_normalization(mut self, divisor: f32) -> Self {
        self.normalization = Some(divisor);
        self
    }

    #[must_use]
    pub const fn with_padding(mut self, space: usize, range: usize) -> Self {
        self.space_padding = space;
        self.range_padding = range;
        self
    }

    #[must_use]
    pub const fn with_grayscale_collapse(mut self, enabled: bool) -> Self {
        self.collapse_grayscale = enabled;
        self
    }

    #[must_use]
    pub const fn with_blur_passes(mut self, passes: usize) -> Self {
        self.blur_passes = passes;
        self
    }

    /// Checks every field against its valid domain.
    ///
    /// # Errors
    ///
    /// * `BilateralError::InvalidParameter` - naming the first offending field
    pub fn validate(&self) -> Result<(), BilateralError> {
        validate_positive("sigma_space", self.sigma_space)?;
        if let SigmaRange::Fixed(sigma) = self.sigma_range {
            validate_positive("sigma_range", sigma)?;
        }
        if let Some(divisor) = self.normalization {
            validate_positive("normalization", divisor)?;
        }
        if self.space_padding < Self::MIN_PADDING {
            return Err(BilateralError::InvalidParameter {
                name: "space_padding",
                value: self.space_padding as f32,
            });
        }
        if self.range_padding < Self::MIN_PADDING {
            return Err(BilateralError::InvalidParameter {
                name: "range_padding",
                value: self.range_padding as f32,
            });
        }
        if self.blur_passes == 0 {
            return Err(BilateralError::InvalidParameter {
                name: "blur_passes",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for BilateralConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Continuous grid coordinate of one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    coords: [f32; MAX_DIMENSION],
    dimension: usize,
}

impl SamplePoint {
    #[inline]
    pub fn coords(&self) -> &[f32] {
        &self.coords[..self.dimension]
    }

    /// Rounds every axis to the nearest cell, clamped to the grid.
    #[inline]
    pub fn nearest_cell(&self, size: &[usize]) -> [usize; MAX_DIMENSION] {
        let mut cell = [0; MAX_DIMENSION];
        for (axis, (&coord, &len)) in self.coords().iter().zip(size).enumerate() {
            cell[axis] = ((coord + 0.5).floor().max(0.0) as usize).min(len - 1);
        }
        cell
    }
}

/// Parameters estimated from the source image, fixed for the lifetime
/// of one filter execution.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParameters {
    pub sigma_space: f32,
    /// Range bandwidth; zero when auto-derived from an image without range
    /// extent.
    pub sigma_range: f32,
    /// Per range channel minimum.
    pub min: Vec<f32>,
    /// Per range channel maximum.
    pub max: Vec<f32>,
    /// Grid size per axis.
    pub size: Vec<usize>,
    pub space_padding: usize,
    pub range_padding: usize,
    pub mode: FilterMode,
    /// Set when a color image was collapsed to one range axis.
    pub grayscale: bool,
    /// Divisor used to normalize source channels.
    pub max_value: f32,
}

impl FilterParameters {
    /// Scans every pixel once and derives the grid geometry.
    ///
    /// # Errors
    ///
    /// * `BilateralError::EmptyImage` - the image has no pixels
    /// * `BilateralError::InvalidParameter` - the configuration is invalid
    /// * `BilateralError::NonFiniteSample` - a pixel projects to NaN or infinity
    /// * `BilateralError::GridTooLarge` - the bandwidths need too many cells
    pub fn estimate<I>(image: &I, config: &BilateralConfig) -> Result<Self, BilateralError>
    where
        I: GenericImageView + ?Sized,
        f32: From<<I::Pixel as Pixel>::Subpixel>,
    {
        config.validate()?;
        let (width, height) = image.dimensions();
        validate_non_empty_image(width, height)?;

        let max_value = config
            .normalization
            .unwrap_or_else(default_max_value::<I>);

        let mut min = [f32::INFINITY; MAX_RANGE_CHANNELS];
        let mut max = [f32::NEG_INFINITY; MAX_RANGE_CHANNELS];
        let mut gray = true;

        for (y, x) in iproduct!(0..height, 0..width) {
            let [r, g, b, _] = read_normalized_rgba(image, x, y, max_value);
            if gray && (r != g || g != b) {
                gray = false;
            }
            let values = config.mode.project([r, g, b]);
            if !values.iter().all(|value| value.is_finite()) {
                return Err(BilateralError::NonFiniteSample { x, y });
            }
            for channel in 0..MAX_RANGE_CHANNELS {
                min[channel] = min[channel].min(values[channel]);
                max[channel] = max[channel].max(values[channel]);
            }
        }

        let grayscale = config.mode == FilterMode::Color && gray && config.collapse_grayscale;
        let channels = match config.mode {
            FilterMode::Color if !grayscale => MAX_RANGE_CHANNELS,
            _ => 1,
        };
        let min = min[..channels].to_vec();
        let max = max[..channels].to_vec();

        let sigma_range = match config.sigma_range {
            SigmaRange::Fixed(sigma) => sigma,
            SigmaRange::Auto => {
                let lowest = min.iter().copied().fold(f32::INFINITY, f32::min);
                let highest = max.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                (highest - lowest) * BilateralConfig::AUTO_RANGE_FACTOR
            }
        };

        let space_axis = |extent: u32| {
            axis_len((extent - 1) as f32 / config.sigma_space, config.space_padding)
        };
        let mut size = vec![space_axis(width)?, space_axis(height)?];
        for (lo, hi) in min.iter().zip(&max) {
            let steps = if sigma_range > 0.0 {
                (hi - lo) / sigma_range
            } else {
                0.0
            };
            size.push(axis_len(steps, config.range_padding)?);
        }
        cell_count(&size)?;

        log::debug!(
            "bilateral grid: sigma_space={} sigma_range={} min={:?} max={:?} size={:?} grayscale={}",
            config.sigma_space,
            sigma_range,
            min,
            max,
            size,
            grayscale
        );

        Ok(Self {
            sigma_space: config.sigma_space,
            sigma_range,
            min,
            max,
            size,
            space_padding: config.space_padding,
            range_padding: config.range_padding,
            mode: config.mode,
            grayscale,
            max_value,
        })
    }

    /// Total number of grid axes.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    /// Number of range axes.
    #[inline]
    pub fn range_channels(&self) -> usize {
        self.size.len() - 2
    }

    /// Continuous grid coordinate along a spatial axis.
    #[inline]
    pub fn space_coordinate(&self, position: u32) -> f32 {
        position as f32 / self.sigma_space + self.space_padding as f32
    }

    /// Continuous grid coordinate along a range axis.
    ///
    /// A zero bandwidth only arises for an image without range extent; the
    /// axis then degenerates to its single padded cell.
    #[inline]
    pub fn range_coordinate(&self, channel: usize, value: f32) -> f32 {
        let offset = if self.sigma_range > 0.0 {
            (value - self.min[channel]) / self.sigma_range
        } else {
            0.0
        };
        offset + self.range_padding as f32
    }

    /// Maps a pixel position and its range values into grid space.
    #[inline]
    pub fn sample_point(&self, x: u32, y: u32, range: &[f32]) -> SamplePoint {
        let mut coords = [0.0; MAX_DIMENSION];
        coords[0] = self.space_coordinate(x);
        coords[1] = self.space_coordinate(y);
        for (channel, &value) in range.iter().take(self.range_channels()).enumerate() {
            coords[2 + channel] = self.range_coordinate(channel, value);
        }
        SamplePoint {
            coords,
            dimension: self.dimension(),
        }
    }
}

/// Cells along one axis: the truncated step count, the origin cell and
/// padding on both sides.
fn axis_len(steps: f32, padding: usize) -> Result<usize, BilateralError> {
    // float to int casts saturate, so a huge or infinite step count lands on
    // usize::MAX and fails the checked adds below
    (steps as usize)
        .checked_add(1)
        .and_then(|len| len.checked_add(padding.checked_mul(2)?))
        .ok_or(BilateralError::GridTooLarge { cells: usize::MAX })
}
