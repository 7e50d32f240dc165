//! Pure placement math for the resize and overlay operations.
//!
//! All functions here are pure and testable without any I/O or images. Each
//! one turns source and target dimensions into a [`Placement`]: the canvas to
//! allocate plus the [`CopyParams`] for the resampling copy.

use super::backend::Dimensions;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("at least one of width or height must be given")]
    Unbounded,
    #[error("dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("fitted size {width}x{height} exceeds the u32 pixel range")]
    TooLarge { width: u64, height: u64 },
}

/// Arguments to the resampling copy primitive.
///
/// Reads the `src_width × src_height` rectangle at `(src_x, src_y)` of the
/// source and writes it, scaled, to the `dst_width × dst_height` rectangle at
/// `(dst_x, dst_y)` of the destination. Destination offsets are signed: parts
/// of the rectangle outside the destination are clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyParams {
    pub dst_x: i64,
    pub dst_y: i64,
    pub src_x: u32,
    pub src_y: u32,
    pub dst_width: u32,
    pub dst_height: u32,
    pub src_width: u32,
    pub src_height: u32,
}

impl CopyParams {
    /// Whether the copy changes scale.
    pub fn is_resampling(&self) -> bool {
        self.dst_width != self.src_width || self.dst_height != self.src_height
    }
}

/// A canvas size plus where the source lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub canvas: Dimensions,
    pub copy: CopyParams,
}

fn check_nonzero(width: u32, height: u32) -> Result<(), GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::ZeroDimension { width, height });
    }
    Ok(())
}

fn to_dimensions(width: u64, height: u64) -> Result<Dimensions, GeometryError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok(Dimensions { width, height }),
        _ => Err(GeometryError::TooLarge { width, height }),
    }
}

/// Largest size with the source aspect ratio that fits the requested box.
///
/// An unset axis imposes no constraint. The axis whose scale factor is
/// smaller binds; the other side is truncated to whole pixels. Scale factors
/// are compared by cross-multiplication so ties are exact.
///
/// # Examples
/// ```
/// # use fitcanvas::imaging::{Dimensions, calculate_fit_dimensions};
/// let source = Dimensions { width: 800, height: 600 };
/// let fit = calculate_fit_dimensions(source, Some(400), None).unwrap();
/// assert_eq!((fit.width, fit.height), (400, 300));
/// ```
pub fn calculate_fit_dimensions(
    source: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Dimensions, GeometryError> {
    check_nonzero(source.width, source.height)?;
    if let Some(0) = width {
        return Err(GeometryError::ZeroDimension {
            width: 0,
            height: height.unwrap_or(0),
        });
    }
    if let Some(0) = height {
        return Err(GeometryError::ZeroDimension {
            width: width.unwrap_or(0),
            height: 0,
        });
    }

    let (ow, oh) = (source.width as u64, source.height as u64);
    let width_bound = |nw: u64| to_dimensions(nw, (oh * nw / ow).max(1));
    let height_bound = |nh: u64| to_dimensions((ow * nh / oh).max(1), nh);

    match (width, height) {
        (None, None) => Err(GeometryError::Unbounded),
        (Some(nw), None) => width_bound(nw as u64),
        (None, Some(nh)) => height_bound(nh as u64),
        (Some(nw), Some(nh)) => {
            let (nw, nh) = (nw as u64, nh as u64);
            // nw/ow vs nh/oh
            let width_scaled = nw * oh;
            let height_scaled = nh * ow;
            if width_scaled < height_scaled {
                width_bound(nw)
            } else if width_scaled > height_scaled {
                height_bound(nh)
            } else {
                Ok(Dimensions {
                    width: nw as u32,
                    height: nh as u32,
                })
            }
        }
    }
}

/// Aspect-fit resize: the canvas is the fitted size and the whole source is
/// resampled onto it.
pub fn plan_fit(
    source: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Placement, GeometryError> {
    let fit = calculate_fit_dimensions(source, width, height)?;
    Ok(Placement {
        canvas: fit,
        copy: CopyParams {
            dst_x: 0,
            dst_y: 0,
            src_x: 0,
            src_y: 0,
            dst_width: fit.width,
            dst_height: fit.height,
            src_width: source.width,
            src_height: source.height,
        },
    })
}

/// Centered source rectangle with the target's aspect ratio.
///
/// Returns `(x, y, width, height)` within the source. The axis with the
/// smaller scale factor keeps its full extent; the other one is cropped
/// evenly on both sides.
pub fn calculate_crop_rect(
    source: Dimensions,
    target: Dimensions,
) -> Result<(u32, u32, u32, u32), GeometryError> {
    check_nonzero(source.width, source.height)?;
    check_nonzero(target.width, target.height)?;

    let (ow, oh) = (source.width as f64, source.height as f64);
    let (nw, nh) = (target.width as f64, target.height as f64);

    let ratio_x = nw / ow;
    let ratio_y = nh / oh;

    if ratio_x < ratio_y {
        let exact = nw / ratio_y;
        let cropped = (exact.round() as u32).clamp(1, source.width);
        let start = (((ow - exact) / 2.0).round() as u32).min(source.width - cropped);
        Ok((start, 0, cropped, source.height))
    } else {
        let exact = nh / ratio_x;
        let cropped = (exact.round() as u32).clamp(1, source.height);
        let start = (((oh - exact) / 2.0).round() as u32).min(source.height - cropped);
        Ok((0, start, source.width, cropped))
    }
}

/// Crop-to-fill resize: the canvas is exactly the target and a centered crop
/// of the source is resampled over all of it.
pub fn plan_crop(source: Dimensions, target: Dimensions) -> Result<Placement, GeometryError> {
    let (src_x, src_y, src_width, src_height) = calculate_crop_rect(source, target)?;
    Ok(Placement {
        canvas: target,
        copy: CopyParams {
            dst_x: 0,
            dst_y: 0,
            src_x,
            src_y,
            dst_width: target.width,
            dst_height: target.height,
            src_width,
            src_height,
        },
    })
}

/// Pad-to-fill resize: the canvas is exactly the target, the fitted source
/// sits centered on it and the remaining border gets the background color.
pub fn plan_fill(source: Dimensions, target: Dimensions) -> Result<Placement, GeometryError> {
    check_nonzero(target.width, target.height)?;
    let fit = calculate_fit_dimensions(source, Some(target.width), Some(target.height))?;

    Ok(Placement {
        canvas: target,
        copy: CopyParams {
            dst_x: ((target.width - fit.width) / 2) as i64,
            dst_y: ((target.height - fit.height) / 2) as i64,
            src_x: 0,
            src_y: 0,
            dst_width: fit.width,
            dst_height: fit.height,
            src_width: source.width,
            src_height: source.height,
        },
    })
}

/// Unscaled copy of a whole foreground at a signed offset.
pub fn plan_overlay(foreground: Dimensions, x: i64, y: i64) -> CopyParams {
    CopyParams {
        dst_x: x,
        dst_y: y,
        src_x: 0,
        src_y: 0,
        dst_width: foreground.width,
        dst_height: foreground.height,
        src_width: foreground.width,
        src_height: foreground.height,
    }
}
