use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::config::is_valid_quality;
use crate::encode::format::ExportFormat;
use crate::foundation::error::{MockupError, MockupResult};
use crate::render::surface::RenderedSurface;

/// JPEG quality applied when none is given.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.95;

/// Map a `(0, 1]` quality to the encoder's 1..=100 scale.
///
/// `None` and out-of-range values use [`DEFAULT_JPEG_QUALITY`].
pub fn resolve_jpeg_quality(quality: Option<f32>) -> u8 {
    let q = match quality {
        Some(q) if is_valid_quality(q) => q,
        Some(q) => {
            tracing::warn!(quality = q, "jpeg quality out of range, using default");
            DEFAULT_JPEG_QUALITY
        }
        None => DEFAULT_JPEG_QUALITY,
    };
    (q * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Serialize `surface` in `format`.
///
/// PNG keeps alpha. JPEG drops it after compositing over black, which for premultiplied pixels is
/// the color channels as stored.
#[tracing::instrument(skip(surface), fields(width = surface.width, height = surface.height))]
pub fn encode_surface(
    surface: &RenderedSurface,
    format: ExportFormat,
    quality: Option<f32>,
) -> MockupResult<Vec<u8>> {
    let size = surface.size();
    if size.is_empty() {
        return Err(MockupError::encoding("surface has zero area"));
    }
    if surface.data.len() != size.rgba8_len() {
        return Err(MockupError::encoding(format!(
            "surface buffer length {} does not match {}x{}",
            surface.data.len(),
            size.width,
            size.height
        )));
    }

    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            let img = surface.to_rgba_image()?;
            PngEncoder::new(&mut out)
                .write_image(
                    img.as_raw(),
                    size.width,
                    size.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| MockupError::encoding(format!("png: {e}")))?;
        }
        ExportFormat::Jpeg => {
            let q = resolve_jpeg_quality(quality);
            let rgb: Vec<u8> = surface
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, q)
                .write_image(&rgb, size.width, size.height, ExtendedColorType::Rgb8)
                .map_err(|e| MockupError::encoding(format!("jpeg: {e}")))?;
        }
    }

    if out.is_empty() {
        return Err(MockupError::encoding("encoder produced no output"));
    }
    tracing::debug!(bytes = out.len(), ?format, "surface encoded");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
