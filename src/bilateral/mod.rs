pub mod blur;
pub mod colorspace;
pub mod downsample;
pub mod ext;
pub mod filter;
pub mod grid;
pub mod params;
pub mod slice;
