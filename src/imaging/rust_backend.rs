//! Pure Rust pixel backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Header | `ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG) | `ImageReader::decode`, kept as RGBA8 |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Resample | `image::imageops::resize`, Lanczos3 by default |
//! | Copy | `imageops::replace` (alpha preserved) / source-over blend (blended) |
//!
//! Every buffer is RGBA8 regardless of file format; the format only matters
//! at encode time and through the compositor's alpha policy.

use super::backend::{BackendError, Dimensions, Header, ImageBackend};
use super::calculations::CopyParams;
use super::format::{Color, ImageFormat};
use super::params::{Encoding, PngCompression};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageReader, Rgb, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Decoded RGBA pixels plus the alpha mode writes into them use.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: RgbaImage,
    blending: bool,
}

impl Raster {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether copies into this raster blend over existing pixels.
    pub fn is_blending(&self) -> bool {
        self.blending
    }
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    filter: FilterType,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Use a different resampling filter for scaled copies.
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    }
}

/// Map a 0–9 deflate level onto the encoder's presets.
fn compression_type(compression: PngCompression) -> CompressionType {
    match compression.level() {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Source-over compositing of one straight-alpha pixel onto another.
///
/// `a_out = a_s + a_d * (1 - a_s)`, with colour weighted by each side's
/// contribution and rounded to nearest. An opaque destination stays opaque.
fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    // Both weights are scaled by 255
    let src_weight = sa * 255;
    let dst_weight = da * (255 - sa);
    let total = src_weight + dst_weight;
    if total == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let sum = src[c] as u32 * src_weight + dst[c] as u32 * dst_weight;
        out[c] = ((sum + total / 2) / total) as u8;
    }
    out[3] = ((total + 127) / 255) as u8;
    Rgba(out)
}

/// Blend `top` over `bottom` at a signed offset, skipping pixels outside `bottom`.
fn blend_over(bottom: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (bw, bh) = (bottom.width() as i64, bottom.height() as i64);
    for (tx, ty, src) in top.enumerate_pixels() {
        let (bx, by) = (x + tx as i64, y + ty as i64);
        if bx < 0 || by < 0 || bx >= bw || by >= bh {
            continue;
        }
        let dst = bottom.get_pixel_mut(bx as u32, by as u32);
        *dst = blend_pixel(*dst, *src);
    }
}

fn encode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

impl ImageBackend for RustBackend {
    type Buffer = Raster;

    fn read_header(&self, path: &Path) -> Result<Header, BackendError> {
        let header_error = |reason: String| BackendError::HeaderRead {
            path: path.display().to_string(),
            reason,
        };
        let reader = ImageReader::open(path)
            .map_err(|e| header_error(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| header_error(e.to_string()))?;
        let detected = reader
            .format()
            .ok_or_else(|| header_error("unrecognized file type".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| header_error(e.to_string()))?;

        let format = match detected {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            _ => None,
        };
        Ok(Header {
            format,
            format_name: format!("{detected:?}"),
            dimensions: Dimensions { width, height },
        })
    }

    fn decode(&self, path: &Path, format: ImageFormat) -> Result<Raster, BackendError> {
        let mut reader = ImageReader::open(path)?;
        reader.set_format(to_image_format(format));
        let img = reader.decode().map_err(|e| BackendError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Raster {
            pixels: img.to_rgba8(),
            blending: true,
        })
    }

    fn encode(&self, buffer: &Raster, path: &Path, encoding: Encoding) -> Result<(), BackendError> {
        let (width, height) = buffer.pixels.dimensions();
        let mut bytes = Cursor::new(Vec::new());

        let written = match encoding {
            Encoding::Png { compression } => PngEncoder::new_with_quality(
                &mut bytes,
                compression_type(compression),
                image::codecs::png::FilterType::Adaptive,
            )
            .write_image(
                buffer.pixels.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            Encoding::Jpeg { quality } => {
                let rgb: image::ImageBuffer<Rgb<u8>, Vec<u8>> = buffer.pixels.convert();
                JpegEncoder::new_with_quality(&mut bytes, quality.value()).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
        };
        written.map_err(|e| encode_error(path, e))?;

        std::fs::write(path, bytes.into_inner())?;
        Ok(())
    }

    fn allocate_canvas(&self, dimensions: Dimensions) -> Raster {
        Raster {
            pixels: RgbaImage::new(dimensions.width, dimensions.height),
            blending: true,
        }
    }

    fn fill(&self, buffer: &mut Raster, color: Color) {
        let pixel = image::Rgba(color.to_array());
        for p in buffer.pixels.pixels_mut() {
            *p = pixel;
        }
    }

    fn set_alpha_mode(&self, buffer: &mut Raster, preserve_alpha: bool) {
        buffer.blending = !preserve_alpha;
    }

    fn resampled_copy(&self, dst: &mut Raster, src: &Raster, params: &CopyParams) {
        let region = imageops::crop_imm(
            &src.pixels,
            params.src_x,
            params.src_y,
            params.src_width,
            params.src_height,
        )
        .to_image();
        let patch = if params.is_resampling() {
            imageops::resize(&region, params.dst_width, params.dst_height, self.filter)
        } else {
            region
        };

        // Both clip to the destination bounds
        if dst.blending {
            blend_over(&mut dst.pixels, &patch, params.dst_x, params.dst_y);
        } else {
            imageops::replace(&mut dst.pixels, &patch, params.dst_x, params.dst_y);
        }
    }

    fn dimensions(&self, buffer: &Raster) -> Dimensions {
        let (width, height) = buffer.pixels.dimensions();
        Dimensions { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::{plan_fill, plan_overlay};
    use crate::imaging::params::Quality;
    use crate::test_helpers::*;

    #[test]
    fn read_header_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let header = RustBackend::new().read_header(&path).unwrap();
        assert_eq!(header.format, Some(ImageFormat::Jpeg));
        assert_eq!(header.dimensions, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn read_header_detects_content_not_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("actually-png.jpg");
        create_test_png(&path, 30, 20, 255);

        let header = RustBackend::new().read_header(&path).unwrap();
        assert_eq!(header.format, Some(ImageFormat::Png));
    }

    #[test]
    fn read_header_reports_unsupported_format_by_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("scan.tiff");
        create_test_tiff(&path, 16, 8);

        let header = RustBackend::new().read_header(&path).unwrap();
        assert_eq!(header.format, None);
        assert_eq!(header.format_name, "Tiff");
        assert_eq!(header.dimensions, Dimensions { width: 16, height: 8 });
    }

    #[test]
    fn read_header_nonexistent_file_errors() {
        let result = RustBackend::new().read_header(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::HeaderRead { .. })));
    }

    #[test]
    fn read_header_garbage_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        assert!(RustBackend::new().read_header(&path).is_err());
    }

    #[test]
    fn decode_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n-truncated").unwrap();

        let result = RustBackend::new().decode(&path, ImageFormat::Png);
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn decode_keeps_png_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("translucent.png");
        create_test_png(&path, 4, 4, 64);

        let raster = RustBackend::new().decode(&path, ImageFormat::Png).unwrap();
        assert_eq!(raster.pixels().get_pixel(1, 1)[3], 64);
        assert!(raster.is_blending());
    }

    #[test]
    fn fill_paints_every_pixel() {
        let backend = RustBackend::new();
        let mut canvas = backend.allocate_canvas(Dimensions { width: 3, height: 2 });
        backend.fill(&mut canvas, Color::WHITE);
        assert!(canvas.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn copy_without_blending_overwrites_alpha() {
        let backend = RustBackend::new();
        let mut dst = backend.allocate_canvas(Dimensions { width: 4, height: 4 });
        backend.fill(&mut dst, Color::WHITE);
        backend.set_alpha_mode(&mut dst, true);
        let src = backend.allocate_canvas(Dimensions { width: 2, height: 2 });

        backend.resampled_copy(
            &mut dst,
            &src,
            &plan_overlay(Dimensions { width: 2, height: 2 }, 1, 1),
        );

        assert_eq!(dst.pixels().get_pixel(1, 1).0, [0, 0, 0, 0]);
        assert_eq!(dst.pixels().get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn copy_with_blending_keeps_destination_under_transparency() {
        let backend = RustBackend::new();
        let mut dst = backend.allocate_canvas(Dimensions { width: 4, height: 4 });
        backend.fill(&mut dst, Color::WHITE);
        let src = backend.allocate_canvas(Dimensions { width: 2, height: 2 });

        backend.resampled_copy(
            &mut dst,
            &src,
            &plan_overlay(Dimensions { width: 2, height: 2 }, 1, 1),
        );

        assert_eq!(dst.pixels().get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn blend_half_alpha_over_opaque_stays_opaque() {
        let out = blend_pixel(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(out.0, [128, 128, 128, 255]);

        for alpha in [1, 64, 127, 128, 200, 254] {
            let out = blend_pixel(Rgba([10, 20, 30, 255]), Rgba([200, 100, 0, alpha]));
            assert_eq!(out[3], 255, "source alpha {alpha}");
        }
    }

    #[test]
    fn blend_over_transparent_keeps_source() {
        let src = Rgba([40, 80, 120, 90]);
        assert_eq!(blend_pixel(Rgba([0, 0, 0, 0]), src), src);
        assert_eq!(
            blend_pixel(Rgba([0, 0, 0, 0]), Rgba([9, 9, 9, 0])).0,
            [0, 0, 0, 0]
        );
    }

    #[test]
    fn blend_two_translucent_layers() {
        // 0.5 + 0.5 * 0.5 = 0.75 alpha, colour weighted 2:1 toward the top
        let out = blend_pixel(Rgba([0, 0, 0, 128]), Rgba([255, 255, 255, 128]));
        assert_eq!(out[3], 192);
        assert!(out[0].abs_diff(170) <= 1, "{out:?}");
    }

    #[test]
    fn translucent_overlay_onto_decoded_jpeg_round_trips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bg_path = tmp.path().join("bg.jpg");
        let out_path = tmp.path().join("out.png");
        create_solid_jpeg(&bg_path, 16, 16, [0, 0, 200]);

        let backend = RustBackend::new();
        let mut bg = backend.decode(&bg_path, ImageFormat::Jpeg).unwrap();
        let mut veil = backend.allocate_canvas(Dimensions { width: 8, height: 8 });
        backend.fill(&mut veil, Color::rgba(255, 255, 255, 128));
        backend.resampled_copy(
            &mut bg,
            &veil,
            &plan_overlay(Dimensions { width: 8, height: 8 }, 4, 4),
        );
        backend
            .encode(
                &bg,
                &out_path,
                Encoding::Png {
                    compression: PngCompression::default(),
                },
            )
            .unwrap();

        assert_color_near(pixel_at(&out_path, 8, 8), [128, 128, 228, 255], 4);
        assert_color_near(pixel_at(&out_path, 1, 1), [0, 0, 200, 255], 4);
    }

    #[test]
    fn copy_clips_out_of_bounds() {
        let backend = RustBackend::new();
        let mut dst = backend.allocate_canvas(Dimensions { width: 8, height: 6 });
        let mut src = backend.allocate_canvas(Dimensions { width: 4, height: 4 });
        backend.fill(&mut src, Color::rgba(255, 0, 0, 255));

        backend.resampled_copy(
            &mut dst,
            &src,
            &plan_overlay(Dimensions { width: 4, height: 4 }, 6, 5),
        );
        backend.resampled_copy(
            &mut dst,
            &src,
            &plan_overlay(Dimensions { width: 4, height: 4 }, -3, -3),
        );

        assert_eq!(dst.pixels().get_pixel(7, 5).0, [255, 0, 0, 255]);
        assert_eq!(dst.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(dst.pixels().get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn scaled_copy_lands_at_offset() {
        let backend = RustBackend::new();
        let mut src = backend.allocate_canvas(Dimensions { width: 80, height: 60 });
        backend.fill(&mut src, Color::rgba(0, 0, 255, 255));
        let placement = plan_fill(
            Dimensions { width: 80, height: 60 },
            Dimensions { width: 40, height: 40 },
        )
        .unwrap();
        let mut canvas = backend.allocate_canvas(placement.canvas);
        backend.set_alpha_mode(&mut canvas, true);
        backend.fill(&mut canvas, Color::TRANSPARENT);

        backend.resampled_copy(&mut canvas, &src, &placement.copy);

        // content is 40x30 at (0, 5)
        assert_eq!(canvas.pixels().get_pixel(20, 2).0[3], 0);
        let inside = canvas.pixels().get_pixel(20, 20).0;
        assert!(inside[2] > 250 && inside[3] > 250, "{inside:?}");
        assert_eq!(canvas.pixels().get_pixel(20, 37).0[3], 0);
    }

    #[test]
    fn encode_jpeg_then_read_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        let canvas = backend.allocate_canvas(Dimensions { width: 40, height: 30 });

        backend
            .encode(
                &canvas,
                &path,
                Encoding::Jpeg {
                    quality: Quality::new(80),
                },
            )
            .unwrap();

        let header = backend.read_header(&path).unwrap();
        assert_eq!(header.format, Some(ImageFormat::Jpeg));
        assert_eq!(header.dimensions, Dimensions { width: 40, height: 30 });
    }

    #[test]
    fn encode_png_preserves_transparency() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let backend = RustBackend::new();
        let canvas = backend.allocate_canvas(Dimensions { width: 5, height: 5 });

        backend
            .encode(
                &canvas,
                &path,
                Encoding::Png {
                    compression: PngCompression::default(),
                },
            )
            .unwrap();

        let decoded = backend.decode(&path, ImageFormat::Png).unwrap();
        assert_eq!(decoded.pixels().get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn encode_into_missing_directory_errors() {
        let backend = RustBackend::new();
        let canvas = backend.allocate_canvas(Dimensions { width: 2, height: 2 });
        let result = backend.encode(
            &canvas,
            Path::new("/nonexistent/dir/out.png"),
            Encoding::Png {
                compression: PngCompression::default(),
            },
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn compression_levels_map_to_presets() {
        assert!(matches!(
            compression_type(PngCompression(0)),
            CompressionType::Fast
        ));
        assert!(matches!(
            compression_type(PngCompression(5)),
            CompressionType::Default
        ));
        assert!(matches!(
            compression_type(PngCompression(8)),
            CompressionType::Best
        ));
    }
}
