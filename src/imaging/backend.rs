//! Pixel backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the platform image library as seen by the
//! engine: header introspection, decode, encode, canvas allocation, fill,
//! alpha mode and the resampling copy. Everything above it (placement math,
//! canvas policy, image lifecycle) is backend-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Unit tests use the recording `MockBackend` in this module's tests.

use super::calculations::CopyParams;
use super::format::{Color, ImageFormat};
use super::params::Encoding;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read image header of {path}: {reason}")]
    HeaderRead { path: String, reason: String },
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
}

/// Width and height of an image or canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What a file header says about the image, without decoding pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// `None` when the header is readable but the format cannot be edited.
    pub format: Option<ImageFormat>,
    /// Human-readable name of the detected format (e.g. `"Png"`, `"Tiff"`).
    pub format_name: String,
    pub dimensions: Dimensions,
}

/// Trait for pixel backends.
///
/// Buffers are owned values: dropping one releases its pixels. The trait is
/// `Sync` and buffers are `Send` so independent images can be processed on
/// different threads with one shared backend.
pub trait ImageBackend: Sync {
    type Buffer: Send;

    /// Read format and dimensions from the file header.
    fn read_header(&self, path: &Path) -> Result<Header, BackendError>;

    /// Decode the full pixel buffer.
    fn decode(&self, path: &Path, format: ImageFormat) -> Result<Self::Buffer, BackendError>;

    /// Encode a buffer and write it to `path`.
    fn encode(
        &self,
        buffer: &Self::Buffer,
        path: &Path,
        encoding: Encoding,
    ) -> Result<(), BackendError>;

    /// Allocate a blank canvas.
    fn allocate_canvas(&self, dimensions: Dimensions) -> Self::Buffer;

    /// Paint every pixel of the buffer with `color`.
    fn fill(&self, buffer: &mut Self::Buffer, color: Color);

    /// With `preserve_alpha`, writes replace destination pixels (alpha
    /// included) instead of blending over them.
    fn set_alpha_mode(&self, buffer: &mut Self::Buffer, preserve_alpha: bool);

    /// Copy (and scale) a source rectangle into the destination, clipping
    /// anything that falls outside the destination.
    fn resampled_copy(&self, dst: &mut Self::Buffer, src: &Self::Buffer, params: &CopyParams);

    /// Actual size of a buffer.
    fn dimensions(&self, buffer: &Self::Buffer) -> Dimensions;
}
