//! # fitcanvas
//!
//! Image geometry and compositing for PNG and JPEG files: aspect-fit resizing,
//! crop-to-fill, pad-to-fill (letterboxing) and unscaled overlay at a pixel
//! offset.
//!
//! # Architecture: Plan, Then Paint
//!
//! Every operation is split in two:
//!
//! ```text
//! 1. Plan    source size + target box  →  Placement   (pure integer math)
//! 2. Paint   Placement + backend       →  new pixels  (allocate, fill, copy)
//! ```
//!
//! The planning half lives in [`imaging::calculations`] and never touches
//! pixels, so every size, offset and crop rectangle is unit tested without
//! decoding a single file. The painting half goes through the
//! [`imaging::ImageBackend`] trait, which tests replace with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The [`imaging::Image`] entity, placement math, format policy, and the pure-Rust backend |
//! | [`batch`] | Parallel resize of a whole directory tree with per-file progress events |
//! | [`config`] | `fitcanvas.toml` loading, validation, and merging over stock defaults |
//! | [`output`] | CLI output formatting: pure `format_*` functions plus `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Derived Images Are New Values
//!
//! `resize`, `resize_and_crop` and `resize_and_fill` never mutate the image
//! they are called on. Each returns a fresh [`imaging::Image`] holding only the
//! edited pixels, so one decoded source can feed several outputs:
//!
//! ```no_run
//! use fitcanvas::imaging::{Image, RustBackend};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RustBackend::new();
//! let mut photo = Image::new(&backend, "photo.jpg")?;
//! photo.resize(Some(400), None)?.save("out", Some("small.jpg"))?;
//! photo.resize_and_crop(200, 200)?.save("out", Some("square.jpg"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Format Decides Transparency
//!
//! PNG output keeps an alpha channel and letterboxes with transparent pixels.
//! JPEG has no alpha, so its letterbox is white. This is a property of
//! [`imaging::ImageFormat`], not a per-call option.
//!
//! ## Exact Integer Geometry
//!
//! Scale factors are compared by cross-multiplication rather than as floats,
//! so a box with exactly the source aspect ratio always takes the same branch.
//! Fitted sides truncate toward zero and never drop below one pixel.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding all use the [`image`] crate. No system
//! libraries, no subprocesses. The resample filter is configurable and
//! defaults to Lanczos3.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
