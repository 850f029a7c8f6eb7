use crate::bilateral::filter::FastBilateral;
use crate::bilateral::params::{BilateralConfig, FilterMode};
use crate::error::BilateralError;
use crate::Image;
use image::{Pixel, Rgba};

/// Trait providing one-shot bilateral grid smoothing on owned images.
///
/// Each method builds a [`FastBilateral`], executes it and materializes the
/// whole result. Use [`FastBilateral`] directly to query single pixels or
/// inspect the estimated parameters.
///
/// # Examples
///
/// ```no_run
/// use imageops_bilateral::{BilateralGridExt, Image};
/// use image::Rgb;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let image: Image<Rgb<u8>> = Image::new(32, 32);
/// let smoothed = image.bilateral_grid(8.0, 0.1)?;
/// let auto = image.bilateral_grid_auto()?;
/// # Ok(())
/// # }
/// ```
pub trait BilateralGridExt {
    /// The filtered image type
    type Output;

    /// The error type
    type Error;

    /// Smooths every color channel with explicit bandwidths.
    ///
    /// # Arguments
    ///
    /// * `sigma_space` - Spatial bandwidth in pixels
    /// * `sigma_range` - Range bandwidth in normalized channel units
    fn bilateral_grid(
        &self,
        sigma_space: f32,
        sigma_range: f32,
    ) -> Result<Self::Output, Self::Error> {
        self.bilateral_grid_with_config(BilateralConfig::new(sigma_space, sigma_range))
    }

    /// Smooths every color channel with automatic bandwidths.
    fn bilateral_grid_auto(&self) -> Result<Self::Output, Self::Error> {
        self.bilateral_grid_with_config(BilateralConfig::auto())
    }

    /// Smooths luminance only, keeping the chroma of each pixel.
    fn bilateral_grid_luminance(
        &self,
        sigma_space: f32,
        sigma_range: f32,
    ) -> Result<Self::Output, Self::Error> {
        self.bilateral_grid_with_config(
            BilateralConfig::new(sigma_space, sigma_range).with_mode(FilterMode::Luminance),
        )
    }

    /// Smooths the image with a full configuration.
    ///
    /// # Errors
    ///
    /// * `BilateralError::EmptyImage` - the image has no pixels
    /// * `BilateralError::InvalidParameter` - the configuration is invalid
    fn bilateral_grid_with_config(
        &self,
        config: BilateralConfig,
    ) -> Result<Self::Output, Self::Error>;
}

impl<P> BilateralGridExt for Image<P>
where
    P: Pixel,
    Image<P>: Sync,
    f32: From<P::Subpixel>,
{
    type Output = Image<Rgba<u8>>;
    type Error = BilateralError;

    fn bilateral_grid_with_config(
        &self,
        config: BilateralConfig,
    ) -> Result<Self::Output, Self::Error> {
        let filter = FastBilateral::with_config(self, config)?;
        filter.execute()?;
        filter.result_image()
    }
}
