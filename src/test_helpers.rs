//! Shared test utilities for the fitcanvas test suite.
//!
//! Writes small synthetic image files so tests never depend on checked-in
//! fixtures, plus pixel lookups that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! create_test_jpeg(&path, 800, 600);
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Fixture writers
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a solid-color JPEG. Flat colors survive lossy encoding almost exactly.
pub fn create_solid_jpeg(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Write a green PNG whose every pixel has the given alpha.
pub fn create_test_png(path: &Path, width: u32, height: u32, alpha: u8) {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 200, 0, alpha]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a TIFF: readable header, but not an editable format.
pub fn create_test_tiff(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
    img.save_with_format(path, image::ImageFormat::Tiff).unwrap();
}

// =========================================================================
// Pixel lookups
// =========================================================================

/// Decode any file and return the RGBA value at `(x, y)`.
pub fn pixel_at(path: &Path, x: u32, y: u32) -> [u8; 4] {
    let img = image::open(path)
        .unwrap_or_else(|e| panic!("cannot decode {}: {e}", path.display()))
        .to_rgba8();
    assert!(
        x < img.width() && y < img.height(),
        "pixel ({x}, {y}) outside {}x{} image {}",
        img.width(),
        img.height(),
        path.display()
    );
    img.get_pixel(x, y).0
}

/// Assert two colors match within `tolerance` per channel (lossy codecs).
pub fn assert_color_near(actual: [u8; 4], expected: [u8; 4], tolerance: u8) {
    let close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= tolerance);
    assert!(
        close,
        "color {actual:?} not within {tolerance} of {expected:?}"
    );
}
