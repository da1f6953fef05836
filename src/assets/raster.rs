use std::sync::Arc;

use image::imageops::FilterType;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{MockupError, MockupResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster in premultiplied RGBA8 form.
///
/// Cloning is cheap: pixel storage is shared. Rasters are never mutated after construction, so a
/// user image can be handed to any number of renders concurrently.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pixels: Arc<image::RgbaImage>,
}

impl RasterImage {
    /// Build from straight-alpha RGBA8 bytes (row-major, tightly packed).
    pub fn from_straight_rgba8(width: u32, height: u32, data: Vec<u8>) -> MockupResult<Self> {
        let size = PixelSize::new(width, height);
        if size.is_empty() {
            return Err(MockupError::validation("raster must have non-zero area"));
        }
        if data.len() != size.rgba8_len() {
            return Err(MockupError::validation(format!(
                "raster data length {} does not match {width}x{height} rgba8",
                data.len()
            )));
        }
        let img = image::RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| MockupError::validation("raster buffer rejected by image crate"))?;
        Ok(Self::from_straight_image(img))
    }

    /// Premultiply a straight-alpha `image` buffer and wrap it.
    pub fn from_straight_image(mut img: image::RgbaImage) -> Self {
        premultiply_rgba8_in_place(&mut img);
        Self {
            pixels: Arc::new(img),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Native pixel dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width(), self.height())
    }

    /// Resample to `size`. Premultiplied data is filtered as is.
    pub(crate) fn resized(&self, size: PixelSize, filter: FilterType) -> Self {
        let img = image::imageops::resize(&*self.pixels, size.width, size.height, filter);
        Self {
            pixels: Arc::new(img),
        }
    }

    /// Premultiplied pixel buffer.
    pub fn premultiplied(&self) -> &image::RgbaImage {
        &self.pixels
    }
}
