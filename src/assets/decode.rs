use anyhow::Context;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{MockupError, MockupResult};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MockupResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(MockupError::validation("decoded image has zero area"));
    }
    Ok(RasterImage::from_straight_image(rgba))
}

/// Decode bytes supplied as a user image.
///
/// Anything that is not a recognizable, decodable, non-empty raster is rejected with
/// [`MockupError::InvalidSourceImage`] so it never reaches the compositor.
pub fn decode_source_image(bytes: &[u8]) -> MockupResult<RasterImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| MockupError::invalid_source(format!("unrecognized image format: {e}")))?;
    let dyn_img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| MockupError::invalid_source(format!("decode {format:?}: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(MockupError::invalid_source("image has zero area"));
    }
    tracing::debug!(
        width = rgba.width(),
        height = rgba.height(),
        ?format,
        "decoded source image"
    );
    Ok(RasterImage::from_straight_image(rgba))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
