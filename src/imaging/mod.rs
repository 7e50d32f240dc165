//! Image geometry and compositing in pure Rust.
//!
//! | Operation | Where |
//! |---|---|
//! | **Aspect-fit** | [`calculations::plan_fit`] → [`Image::resize`] |
//! | **Crop-to-fill** | [`calculations::plan_crop`] → [`Image::resize_and_crop`] |
//! | **Pad-to-fill** | [`calculations::plan_fill`] → [`Image::resize_and_fill`] |
//! | **Overlay** | [`calculations::plan_overlay`] → [`Image::place_over`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement math (unit testable)
//! - **Format / Parameters**: Format capabilities and encode settings
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compositor**: Canvas allocation and alpha/fill policy
//! - **Image**: The entity tying it together, with its buffer lifecycle

pub mod backend;
pub mod calculations;
pub mod compositor;
pub mod format;
pub mod image;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Header, ImageBackend};
pub use calculations::{
    CopyParams, GeometryError, Placement, calculate_crop_rect, calculate_fit_dimensions,
};
pub use format::{Color, ImageFormat};
pub use self::image::{Image, ImageError, PixelState};
pub use params::{Encoding, OutputSettings, PngCompression, Quality, ResizeMode};
pub use rust_backend::{Raster, RustBackend};
