//! Supported file formats and the canvas policy each one implies.
//!
//! The compositor never branches on the format directly; it asks the format
//! whether it can store alpha and what an empty canvas should look like.

use super::params::{Encoding, OutputSettings};
use std::fmt;

/// An RGBA color with 8 bits per channel. `a = 0` is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// File formats the engine can open, edit and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Alpha-capable.
    Png,
    /// Opaque.
    Jpeg,
}

impl ImageFormat {
    /// Whether canvases of this format keep an alpha channel.
    pub fn supports_alpha(self) -> bool {
        matches!(self, Self::Png)
    }

    /// Color of canvas area not covered by image content (letterbox bars).
    pub fn default_background(self) -> Color {
        match self {
            Self::Png => Color::TRANSPARENT,
            Self::Jpeg => Color::WHITE,
        }
    }

    /// Resolve the encode request for this format from the output settings.
    pub fn encoding(self, settings: &OutputSettings) -> Encoding {
        match self {
            Self::Png => Encoding::Png {
                compression: settings.png_compression,
            },
            Self::Jpeg => Encoding::Jpeg {
                quality: settings.jpeg_quality,
            },
        }
    }

    /// Match a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Jpeg => f.write_str("JPEG"),
        }
    }
}
