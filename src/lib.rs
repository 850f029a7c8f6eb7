mod bilateral;
mod error;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use bilateral::ext::BilateralGridExt;
pub use bilateral::filter::FastBilateral;
pub use bilateral::grid::{Cell, Grid, InteriorIndices};
pub use bilateral::params::{
    BilateralConfig, FilterMode, FilterParameters, SamplePoint, SigmaRange,
};
pub use error::BilateralError;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
