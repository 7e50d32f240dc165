//! The [`Image`] entity: one raster file plus its decoded and edited pixels.
//!
//! ## Lifecycle
//!
//! ```text
//! Image::new(path)     header read, no pixels          PixelState::Unopened
//!   ├─ open / any op   source decoded once, reused     PixelState::Decoded
//!   ├─ resize*         returns a NEW Image             PixelState::Edited
//!   ├─ save            writes edited ?? source, returns a NEW Image
//!   └─ close / drop    both buffers released           PixelState::Unopened
//! ```
//!
//! `width`/`height` always describe the file on disk. An edited image keeps
//! the dimensions of the file it came from; its real canvas size is
//! [`Image::pixel_dimensions`].
//!
//! Buffers are owned by the `Image`, so they are released on every exit path
//! when it goes out of scope. Operations that decode take `&mut self`; one
//! instance can never be used from two threads at once.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{self, GeometryError};
use super::compositor::{self, Background};
use super::format::ImageFormat;
use super::params::{OutputSettings, ResizeMode};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Cannot read image header: {0}")]
    HeaderRead(#[source] BackendError),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Unknown resize mode: {0}")]
    UnknownMode(String),
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(#[from] GeometryError),
    #[error("Not a directory: {}", .0.display())]
    InvalidDirectory(PathBuf),
    #[error("Directory is not writable: {}", .0.display())]
    NotWritable(PathBuf),
    #[error("Image was not written to disk: {}", .0.display())]
    WriteVerificationFailed(PathBuf),
    #[error("Decode failed: {0}")]
    Decode(#[source] BackendError),
    #[error("Encode failed: {0}")]
    Encode(#[source] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Which pixels an [`Image`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelState {
    Unopened,
    Decoded,
    Edited,
}

impl fmt::Display for PixelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unopened => f.write_str("unopened"),
            Self::Decoded => f.write_str("decoded"),
            Self::Edited => f.write_str("edited"),
        }
    }
}

/// One raster asset, on disk only or with pixel data attached.
pub struct Image<'a, B: ImageBackend> {
    backend: &'a B,
    path: PathBuf,
    name: String,
    format: Option<ImageFormat>,
    format_name: String,
    dimensions: Dimensions,
    output: OutputSettings,
    source: Option<B::Buffer>,
    edited: Option<B::Buffer>,
}

impl<'a, B: ImageBackend> Image<'a, B> {
    /// Read the header of `path`. No pixels are decoded.
    pub fn new(backend: &'a B, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let header = backend.read_header(path).map_err(ImageError::HeaderRead)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            backend,
            path: path.to_path_buf(),
            name,
            format: header.format,
            format_name: header.format_name,
            dimensions: header.dimensions,
            output: OutputSettings::default(),
            source: None,
            edited: None,
        })
    }

    /// Use `settings` when this image (or anything derived from it) is saved.
    pub fn with_output_settings(mut self, settings: OutputSettings) -> Self {
        self.output = settings;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the file type is readable but not editable.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// Width of the file on disk.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height of the file on disk.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn output_settings(&self) -> OutputSettings {
        self.output
    }

    pub fn state(&self) -> PixelState {
        if self.edited.is_some() {
            PixelState::Edited
        } else if self.source.is_some() {
            PixelState::Decoded
        } else {
            PixelState::Unopened
        }
    }

    /// Size of the pixels that `save` would write, if any are loaded.
    pub fn pixel_dimensions(&self) -> Option<Dimensions> {
        self.edited
            .as_ref()
            .or(self.source.as_ref())
            .map(|buffer| self.backend.dimensions(buffer))
    }

    /// The edited buffer, if this image is the result of a resize.
    pub fn edited_buffer(&self) -> Option<&B::Buffer> {
        self.edited.as_ref()
    }

    /// The decoded source buffer, if open.
    pub fn source_buffer(&self) -> Option<&B::Buffer> {
        self.source.as_ref()
    }

    fn editable_format(&self) -> Result<ImageFormat> {
        self.format
            .ok_or_else(|| ImageError::UnsupportedFormat(self.format_name.clone()))
    }

    /// Decode the source pixels from disk, replacing any previous decode.
    pub fn open(&mut self) -> Result<()> {
        let format = self.editable_format()?;
        debug!(path = %self.path.display(), %format, "Decoding image");
        let buffer = self
            .backend
            .decode(&self.path, format)
            .map_err(ImageError::Decode)?;
        self.source = Some(buffer);
        Ok(())
    }

    /// Decode the source pixels unless they already are.
    pub fn ensure_open(&mut self) -> Result<()> {
        if self.source.is_none() {
            self.open()?;
        }
        Ok(())
    }

    /// Release both buffers. Closing an unopened image does nothing.
    pub fn close(&mut self) {
        self.source = None;
        self.edited = None;
    }

    fn decoded_source(&mut self) -> Result<&B::Buffer> {
        self.ensure_open()?;
        self.source
            .as_ref()
            .ok_or_else(|| ImageError::UnsupportedFormat(self.format_name.clone()))
    }

    /// The buffer `save` and `place_over` operate on: edited, else source.
    fn current_buffer_mut(&mut self) -> Result<&mut B::Buffer> {
        if self.edited.is_none() {
            self.ensure_open()?;
        }
        let format_name = &self.format_name;
        self.edited
            .as_mut()
            .or(self.source.as_mut())
            .ok_or_else(|| ImageError::UnsupportedFormat(format_name.clone()))
    }

    fn derive(&self, edited: B::Buffer) -> Image<'a, B> {
        Image {
            backend: self.backend,
            path: self.path.clone(),
            name: self.name.clone(),
            format: self.format,
            format_name: self.format_name.clone(),
            dimensions: self.dimensions,
            output: self.output,
            source: None,
            edited: Some(edited),
        }
    }

    fn apply(
        &mut self,
        placement: calculations::Placement,
        background: Background,
    ) -> Result<Image<'a, B>> {
        let format = self.editable_format()?;
        let backend = self.backend;
        let source = self.decoded_source()?;
        let canvas = compositor::compose(backend, source, format, &placement, background);
        Ok(self.derive(canvas))
    }

    /// Aspect-fit resize into the box; an unset axis is unconstrained.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> Result<Image<'a, B>> {
        let placement = calculations::plan_fit(self.dimensions, width, height)?;
        self.apply(placement, Background::Untouched)
    }

    /// Resize to exactly `width × height`, cropping the overflow around the center.
    pub fn resize_and_crop(&mut self, width: u32, height: u32) -> Result<Image<'a, B>> {
        let target = Dimensions { width, height };
        let placement = calculations::plan_crop(self.dimensions, target)?;
        self.apply(placement, Background::Untouched)
    }

    /// Resize to exactly `width × height`, letterboxing with the format's background.
    pub fn resize_and_fill(&mut self, width: u32, height: u32) -> Result<Image<'a, B>> {
        let target = Dimensions { width, height };
        let placement = calculations::plan_fill(self.dimensions, target)?;
        self.apply(placement, Background::Padded)
    }

    /// Dispatch to one of the resize operations. `Crop` and `Fill` need both axes.
    pub fn resize_to(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        mode: ResizeMode,
    ) -> Result<Image<'a, B>> {
        match mode {
            ResizeMode::Fit => self.resize(width, height),
            ResizeMode::Crop | ResizeMode::Fill => {
                let (Some(w), Some(h)) = (width, height) else {
                    return Err(GeometryError::Unbounded.into());
                };
                if mode == ResizeMode::Crop {
                    self.resize_and_crop(w, h)
                } else {
                    self.resize_and_fill(w, h)
                }
            }
        }
    }

    /// Write the edited pixels (or, if there are none, the source pixels) to
    /// `dir/name` and return the image read back from that file.
    ///
    /// `name` defaults to the current name; when given it also renames this
    /// image.
    pub fn save(&mut self, dir: impl AsRef<Path>, name: Option<&str>) -> Result<Image<'a, B>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ImageError::InvalidDirectory(dir.to_path_buf()));
        }
        if !is_writable(dir) {
            return Err(ImageError::NotWritable(dir.to_path_buf()));
        }

        let format = self.editable_format()?;
        let target = dir.join(name.unwrap_or(&self.name));
        let encoding = format.encoding(&self.output);
        let (backend, output) = (self.backend, self.output);

        let buffer = self.current_buffer_mut()?;
        debug!(
            path = %target.display(),
            width = backend.dimensions(buffer).width,
            height = backend.dimensions(buffer).height,
            "Saving image"
        );
        write_verified(backend, buffer, &target, encoding)?;

        if let Some(name) = name {
            self.name = name.to_string();
        }
        Ok(Image::new(backend, &target)?.with_output_settings(output))
    }

    /// Draw this image unscaled onto `background` at `(x, y)`, write the result
    /// over the background's own file and return the image read back from it.
    ///
    /// Pixels falling outside the background are clipped. The background's
    /// pixels are modified in place and its format decides the encoding.
    pub fn place_over(
        &mut self,
        background: &mut Image<'a, B>,
        x: i64,
        y: i64,
    ) -> Result<Image<'a, B>> {
        let bg_format = background.editable_format()?;
        let encoding = bg_format.encoding(&background.output);
        let (backend, output) = (self.backend, background.output);
        let target = background.path.clone();

        if self.edited.is_none() {
            self.ensure_open()?;
        }
        let foreground = self
            .edited
            .as_ref()
            .or(self.source.as_ref())
            .ok_or_else(|| ImageError::UnsupportedFormat(self.format_name.clone()))?;
        let params = calculations::plan_overlay(backend.dimensions(foreground), x, y);

        let canvas = background.current_buffer_mut()?;
        debug!(
            foreground = %self.path.display(),
            background = %target.display(),
            x,
            y,
            "Placing image over background"
        );
        compositor::copy(backend, canvas, foreground, &params);
        write_verified(backend, canvas, &target, encoding)?;

        Ok(Image::new(backend, &target)?.with_output_settings(output))
    }
}

/// Whether the current user can create files in `dir`. A directory with no
/// write bits at all is refused outright; otherwise a scratch file is created
/// and dropped.
fn is_writable(dir: &Path) -> bool {
    let readonly = std::fs::metadata(dir)
        .map(|m| m.permissions().readonly())
        .unwrap_or(true);
    !readonly
        && tempfile::Builder::new()
            .prefix(".fitcanvas-")
            .tempfile_in(dir)
            .is_ok()
}

fn write_verified<B: ImageBackend>(
    backend: &B,
    buffer: &B::Buffer,
    target: &Path,
    encoding: super::params::Encoding,
) -> Result<()> {
    backend
        .encode(buffer, target, encoding)
        .map_err(ImageError::Encode)?;
    if !target.exists() {
        return Err(ImageError::WriteVerificationFailed(target.to_path_buf()));
    }
    Ok(())
}

impl<B: ImageBackend> fmt::Debug for Image<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("format", &self.format_name)
            .field("dimensions", &self.dimensions)
            .field("state", &self.state())
            .finish()
    }
}
