//! Canvas composition: turns a [`Placement`] into pixels.
//!
//! The compositor allocates the destination canvas, applies the format's
//! alpha and background policy, and hands the copy to the backend. It never
//! decides geometry; that is [`calculations`](super::calculations)' job.

use super::backend::ImageBackend;
use super::calculations::{CopyParams, Placement};
use super::format::ImageFormat;
use tracing::{debug, trace};

/// How the area of the canvas not covered by the copy is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Left as allocated; the copy covers the whole canvas.
    Untouched,
    /// Painted with the format's default background first.
    Padded,
}

/// Allocate a canvas for `placement` and resample `source` onto it.
pub fn compose<B: ImageBackend>(
    backend: &B,
    source: &B::Buffer,
    format: ImageFormat,
    placement: &Placement,
    background: Background,
) -> B::Buffer {
    debug!(
        width = placement.canvas.width,
        height = placement.canvas.height,
        %format,
        ?background,
        "Composing canvas"
    );

    let mut canvas = backend.allocate_canvas(placement.canvas);
    if format.supports_alpha() {
        // Resampled pixels must overwrite transparency, not blend with it
        backend.set_alpha_mode(&mut canvas, true);
    }
    if background == Background::Padded {
        backend.fill(&mut canvas, format.default_background());
    }
    copy(backend, &mut canvas, source, &placement.copy);
    canvas
}

/// Copy `source` into an existing buffer, as configured by the destination's
/// own alpha mode.
pub fn copy<B: ImageBackend>(
    backend: &B,
    destination: &mut B::Buffer,
    source: &B::Buffer,
    params: &CopyParams,
) {
    trace!(
        dst_x = params.dst_x,
        dst_y = params.dst_y,
        src_x = params.src_x,
        src_y = params.src_y,
        dst_width = params.dst_width,
        dst_height = params.dst_height,
        src_width = params.src_width,
        src_height = params.src_height,
        "resampled_copy"
    );
    backend.resampled_copy(destination, source, params);
}
