use crate::bilateral::blur::blur;
use crate::bilateral::downsample::downsample;
use crate::bilateral::grid::Grid;
use crate::bilateral::params::{BilateralConfig, FilterMode, FilterParameters};
use crate::bilateral::slice::reconstruct;
use crate::error::BilateralError;
use crate::utils::{default_max_value, normalize_with_max, validate_non_empty_image};
use crate::Image;
use image::{ColorType, GenericImageView, ImageBuffer, Pixel, Rgba};
use std::sync::OnceLock;
use std::time::Instant;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Bilateral grid filter over a borrowed source image.
///
/// A non-linear, edge-preserving and noise-reducing smoothing filter: the
/// value of each pixel is replaced by a weighted average of nearby pixels
/// with similar values. The average is computed on a downsampled grid
/// spanning space and range, which makes the cost independent of the
/// kernel size.
///
/// The filter moves through `estimate → downsample → blur → (normalize)`
/// exactly once, on the first call to [`execute`](Self::execute). The
/// pipeline is guarded by a [`OnceLock`], so concurrent first calls still
/// run it a single time. Point queries and [`result_image`](Self::result_image)
/// are only valid afterwards and are side-effect free.
///
/// # Examples
///
/// ```no_run
/// use imageops_bilateral::{FastBilateral, Image};
/// use image::Rgb;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let image: Image<Rgb<u8>> = Image::new(64, 64);
/// let filter = FastBilateral::auto(&image)?;
/// filter.execute()?;
/// let pixel = filter.at_pixel(10, 10)?;
/// let smoothed = filter.result_image()?;
/// # Ok(())
/// # }
/// ```
pub struct FastBilateral<'a, I: ?Sized> {
    image: &'a I,
    config: BilateralConfig,
    state: OnceLock<Result<FinalizedGrid, BilateralError>>,
}

/// Estimated parameters together with the blurred grid.
#[derive(Debug)]
struct FinalizedGrid {
    params: FilterParameters,
    grid: Grid,
}

impl<'a, I> FastBilateral<'a, I>
where
    I: GenericImageView + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    /// Creates a per-channel filter with explicit bandwidths.
    ///
    /// # Errors
    ///
    /// * `BilateralError::EmptyImage` - the image has no pixels
    /// * `BilateralError::InvalidParameter` - a bandwidth is not finite and positive
    pub fn new(image: &'a I, sigma_space: f32, sigma_range: f32) -> Result<Self, BilateralError> {
        Self::with_config(image, BilateralConfig::new(sigma_space, sigma_range))
    }

    /// Creates a per-channel filter with the default spatial bandwidth and a
    /// range bandwidth derived from the image.
    pub fn auto(image: &'a I) -> Result<Self, BilateralError> {
        Self::with_config(image, BilateralConfig::auto())
    }

    /// Creates a luminance filter with explicit bandwidths.
    pub fn luminance(
        image: &'a I,
        sigma_space: f32,
        sigma_range: f32,
    ) -> Result<Self, BilateralError> {
        Self::with_config(
            image,
            BilateralConfig::new(sigma_space, sigma_range).with_mode(FilterMode::Luminance),
        )
    }

    /// Creates a luminance filter with automatic bandwidths.
    pub fn luminance_auto(image: &'a I) -> Result<Self, BilateralError> {
        Self::with_config(
            image,
            BilateralConfig::auto().with_mode(FilterMode::Luminance),
        )
    }

    /// Creates a filter from a full configuration.
    ///
    /// # Errors
    ///
    /// * `BilateralError::EmptyImage` - the image has no pixels
    /// * `BilateralError::InvalidParameter` - the configuration is invalid
    pub fn with_config(image: &'a I, config: BilateralConfig) -> Result<Self, BilateralError> {
        config.validate()?;
        let (width, height) = image.dimensions();
        validate_non_empty_image(width, height)?;

        Ok(Self {
            image,
            config,
            state: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &BilateralConfig {
        &self.config
    }

    pub fn source(&self) -> &'a I {
        self.image
    }

    /// Runs the filter pipeline. Only the first call does any work.
    ///
    /// # Errors
    ///
    /// Returns the error of the pipeline run, if any. The same error is
    /// returned by every later call.
    pub fn execute(&self) -> Result<(), BilateralError> {
        self.state
            .get_or_init(|| self.run_pipeline())
            .as_ref()
            .map(|_| ())
            .map_err(Clone::clone)
    }

    fn run_pipeline(&self) -> Result<FinalizedGrid, BilateralError> {
        let start = Instant::now();

        let params = FilterParameters::estimate(self.image, &self.config)?;
        let estimated = start.elapsed();

        let mut grid = downsample(self.image, &params)?;
        let downsampled = start.elapsed();

        blur(&mut grid, self.config.blur_passes);
        if params.mode == FilterMode::Luminance {
            grid.normalize();
        }

        log::debug!(
            "bilateral grid: {} cells, estimate {:?}, downsample {:?}, blur {:?}",
            grid.len(),
            estimated,
            downsampled - estimated,
            start.elapsed() - downsampled
        );

        Ok(FinalizedGrid { params, grid })
    }

    fn ready(&self) -> Result<&FinalizedGrid, BilateralError> {
        match self.state.get() {
            Some(Ok(finalized)) => Ok(finalized),
            Some(Err(err)) => Err(err.clone()),
            None => Err(BilateralError::NotExecuted),
        }
    }

    /// Whether `execute` has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.ready().is_ok()
    }

    /// The estimated parameters, once executed.
    pub fn parameters(&self) -> Option<&FilterParameters> {
        self.ready().ok().map(|finalized| &finalized.params)
    }

    /// The blurred grid, once executed.
    pub fn grid(&self) -> Option<&Grid> {
        self.ready().ok().map(|finalized| &finalized.grid)
    }

    /// Color type of the filtered output, always 8-bit RGBA.
    pub const fn color_model(&self) -> ColorType {
        ColorType::Rgba8
    }

    /// Dimensions of the source (and output) image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bounds of the source image as `(x, y, width, height)`.
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        let (width, height) = self.dimensions();
        (0, 0, width, height)
    }

    /// Computes one filtered pixel.
    ///
    /// # Errors
    ///
    /// * `BilateralError::NotExecuted` - `execute` has not run yet
    /// * `BilateralError::OutOfBounds` - `(x, y)` lies outside the source
    pub fn at_pixel(&self, x: u32, y: u32) -> Result<Rgba<u8>, BilateralError> {
        let finalized = self.ready()?;
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return Err(BilateralError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(self.filtered_pixel(finalized, x, y))
    }

    fn filtered_pixel(&self, finalized: &FinalizedGrid, x: u32, y: u32) -> Rgba<u8> {
        let Rgba([r, g, b, a]) = self.image.get_pixel(x, y).to_rgba();
        let max_value = finalized.params.max_value;
        // alpha is not a range quantity and always uses the subpixel maximum
        let rgba = [
            normalize_with_max(r, max_value),
            normalize_with_max(g, max_value),
            normalize_with_max(b, max_value),
            normalize_with_max(a, default_max_value::<I>()),
        ];
        reconstruct(&finalized.grid, &finalized.params, x, y, rgba)
    }

    fn fill_row(&self, finalized: &FinalizedGrid, y: u32, row: &mut [u8]) {
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            pixel.copy_from_slice(&self.filtered_pixel(finalized, x as u32, y).0);
        }
    }

    fn new_output(&self) -> Image<Rgba<u8>> {
        let (width, height) = self.dimensions();
        ImageBuffer::new(width, height)
    }
}

#[cfg(not(feature = "rayon"))]
impl<I> FastBilateral<'_, I>
where
    I: GenericImageView + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    /// Materializes the whole filtered image.
    ///
    /// # Errors
    ///
    /// * `BilateralError::NotExecuted` - `execute` has not run yet
    pub fn result_image(&self) -> Result<Image<Rgba<u8>>, BilateralError> {
        let finalized = self.ready()?;
        let mut output = self.new_output();
        let row_len = output.width() as usize * 4;

        output
            .chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| self.fill_row(finalized, y as u32, row));

        Ok(output)
    }
}

#[cfg(feature = "rayon")]
impl<I> FastBilateral<'_, I>
where
    I: GenericImageView + Sync + ?Sized,
    f32: From<<I::Pixel as Pixel>::Subpixel>,
{
    /// Materializes the whole filtered image, one row per rayon task.
    ///
    /// # Errors
    ///
    /// * `BilateralError::NotExecuted` - `execute` has not run yet
    pub fn result_image(&self) -> Result<Image<Rgba<u8>>, BilateralError> {
        let finalized = self.ready()?;
        let mut output = self.new_output();
        let row_len = output.width() as usize * 4;

        output
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| self.fill_row(finalized, y as u32, row));

        Ok(output)
    }
}
