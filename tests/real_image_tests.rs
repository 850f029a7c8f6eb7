//! Tests with real image files
//!
//! These tests write generated scenes as PNG, decode them again and run the
//! filter on the decoded data, the way an application would.

use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Get the directory for files written by these tests
#[allow(dead_code)]
fn resources_dir() -> PathBuf {
    Path::new(env!("CARGO_TARGET_TMPDIR")).join("resources")
}

/// Create a noisy portrait-like scene and save it as PNG
///
/// A bright disc (the subject) on a darker background, both with a
/// deterministic dither so there is something to smooth.
#[allow(dead_code)]
fn create_and_save_test_rgb_image(filename: &str, width: u32, height: u32) -> PathBuf {
    let mut image: RgbImage = ImageBuffer::new(width, height);

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let max_radius = (width.min(height) as f32) / 2.0;

    for y in 0..height {
        for x in 0..width {
            let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
            let dither = ((x * 7 + y * 13) % 11) as u8;

            let pixel = if distance < max_radius * 0.5 {
                Rgb([215 + dither, 175 + dither, 145 + dither])
            } else {
                Rgb([40 + dither, 60 + dither, 90 + dither])
            };
            image.put_pixel(x, y, pixel);
        }
    }

    let path = resources_dir().join(filename);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create resources directory");
    image.save(&path).expect("Failed to save test image");
    path
}

/// Create a test RGBA image with transparency and save it as PNG
#[allow(dead_code)]
fn create_and_save_test_rgba_image(filename: &str, width: u32, height: u32) -> PathBuf {
    let image: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
        let alpha = ((x + y) * 255 / (width + height - 2).max(1)) as u8;
        Rgba([120, 80, 200, alpha])
    });

    let path = resources_dir().join(filename);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create resources directory");
    image.save(&path).expect("Failed to save test RGBA image");
    path
}

#[cfg(feature = "test")]
#[test]
fn test_load_and_filter_rgb_image() {
    use imageops_bilateral::BilateralGridExt;

    let image_path = create_and_save_test_rgb_image("portrait.png", 96, 64);
    let loaded = image::open(&image_path).expect("Failed to load test image");
    let rgb = loaded.to_rgb8();

    let smoothed = rgb.bilateral_grid(6.0, 0.1).expect("Filtering should succeed");
    assert_eq!(smoothed.dimensions(), (96, 64));

    // the dither is smoothed out inside each region, while the subject and
    // the background stay far apart
    let subject = smoothed.get_pixel(48, 32);
    let background = smoothed.get_pixel(2, 2);
    assert!((215..=225).contains(&subject[0]), "subject {subject:?}");
    assert!((40..=50).contains(&background[0]), "background {background:?}");
}

#[cfg(feature = "test")]
#[test]
fn test_filter_decoded_dynamic_image_directly() {
    use imageops_bilateral::{BilateralGridExt, FastBilateral};

    let image_path = create_and_save_test_rgb_image("portrait_dynamic.png", 48, 48);
    let loaded = image::open(&image_path).expect("Failed to load test image");

    let filter = FastBilateral::auto(&loaded).expect("Valid image");
    filter.execute().expect("Execution should succeed");
    let from_dynamic = filter.result_image().expect("Executed filter");

    let from_buffer = loaded.to_rgb8().bilateral_grid_auto().expect("Valid image");
    assert_eq!(from_dynamic, from_buffer);
}

#[cfg(feature = "test")]
#[test]
fn test_save_and_reload_filtered_rgba_image() {
    use imageops_bilateral::BilateralGridExt;

    let image_path = create_and_save_test_rgba_image("gradient_alpha.png", 40, 30);
    let loaded = image::open(&image_path).expect("Failed to load RGBA image");
    let rgba = loaded.to_rgba8();

    let smoothed = rgba
        .bilateral_grid_luminance(4.0, 0.1)
        .expect("Filtering should succeed");
    for (input, output) in rgba.pixels().zip(smoothed.pixels()) {
        assert_eq!(input[3], output[3]);
    }

    let output_path = resources_dir().join("gradient_alpha_smoothed.png");
    smoothed.save(&output_path).expect("Failed to save result");
    let reloaded = image::open(&output_path)
        .expect("Failed to reload result")
        .to_rgba8();
    assert_eq!(reloaded, smoothed);
}
