//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`Image`](super::image::Image) entity (which decides which canvas to
//! build and which file to write) and the [`backend`](super::backend) (which
//! does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 80). Clamped on construction.
//! - [`PngCompression`]: PNG compression level (0–9, default 8). Clamped on construction.
//! - [`OutputSettings`]: The pair of the above, carried by every `Image`.
//! - [`Encoding`]: Format-resolved encode request handed to the backend.
//! - [`ResizeMode`]: Which of the three resize strategies to run.

use super::image::ImageError;
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy (JPEG) encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Deflate effort for PNG encoding (0 = fastest, 9 = smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngCompression(pub u8);

impl PngCompression {
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for PngCompression {
    fn default() -> Self {
        Self(8)
    }
}

/// Encode settings inherited by every image derived from a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSettings {
    pub png_compression: PngCompression,
    pub jpeg_quality: Quality,
}

/// A concrete encode request: the format plus its single tuning knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Png { compression: PngCompression },
    Jpeg { quality: Quality },
}

/// Resize strategy selected by [`Image::resize_to`](super::image::Image::resize_to).
/// Defaults to [`ResizeMode::Fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Aspect-fit inside the requested box; one axis may come out short.
    #[default]
    Fit,
    /// Fill the box exactly by cropping the overflowing axis around the center.
    Crop,
    /// Aspect-fit, then pad to the exact box with the format's background.
    Fill,
}

impl FromStr for ResizeMode {
    type Err = ImageError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "resize" | "fit" => Ok(Self::Fit),
            "resizeCrop" | "resize_crop" | "crop" => Ok(Self::Crop),
            "resize_fill" | "fill" => Ok(Self::Fill),
            other => Err(ImageError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Fit => "fit",
            Self::Crop => "crop",
            Self::Fill => "fill",
        };
        f.write_str(tag)
    }
}
