use image::imageops::FilterType;
use rayon::prelude::*;

use crate::assets::raster::RasterImage;
use crate::foundation::core::{Rect, pixel_bounds};
use crate::foundation::error::{MockupError, MockupResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::surface::RenderedSurface;

pub(crate) type PremulRgba8 = [u8; 4];

// Pixels per parallel work item for full-surface blends.
const BLEND_CHUNK_PX: usize = 4096;

pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = src[i].saturating_add(dc);
    }
    out
}

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> MockupResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MockupError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    dst.par_chunks_mut(BLEND_CHUNK_PX * 4)
        .zip(src.par_chunks(BLEND_CHUNK_PX * 4))
        .for_each(|(d, s)| blend_span(d, s));
    Ok(())
}

fn blend_span(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}

/// Resample `image` into `dest` and composite it over `surface`.
///
/// Edges of `dest` are snapped toward its center, so no pixel outside `dest` is touched.
pub(crate) fn draw_raster(
    surface: &mut RenderedSurface,
    image: &RasterImage,
    dest: Rect,
    filter: FilterType,
) {
    let snapped = dest.abs().trunc();
    let (w, h) = (snapped.width() as u32, snapped.height() as u32);
    if w == 0 || h == 0 {
        return;
    }
    let Some(visible) = pixel_bounds(snapped, surface.size()) else {
        return;
    };

    let src = image.premultiplied();
    let resized;
    let scaled = if src.dimensions() == (w, h) {
        src
    } else {
        resized = image::imageops::resize(src, w, h, filter);
        &resized
    };

    // Offset of the visible region inside the resampled image.
    let off_x = (f64::from(visible.x) - snapped.x0) as usize;
    let off_y = (f64::from(visible.y) - snapped.y0) as usize;
    let stride = surface.width as usize * 4;
    let src_stride = w as usize * 4;
    let span = visible.width as usize * 4;
    let x_byte = visible.x as usize * 4;
    let src_raw: &[u8] = scaled.as_raw();

    surface
        .data
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(visible.y as usize)
        .take(visible.height as usize)
        .for_each(|(y, row)| {
            let sy = y - visible.y as usize + off_y;
            let s0 = sy * src_stride + off_x * 4;
            blend_span(&mut row[x_byte..x_byte + span], &src_raw[s0..s0 + span]);
        });
}

/// Composite `overlay` over the whole surface, resampling it when sizes differ.
pub(crate) fn draw_overlay(
    surface: &mut RenderedSurface,
    overlay: &RasterImage,
    filter: FilterType,
) -> MockupResult<()> {
    let src = overlay.premultiplied();
    if src.dimensions() == (surface.width, surface.height) {
        return over_in_place(&mut surface.data, src.as_raw());
    }
    let resized = image::imageops::resize(src, surface.width, surface.height, filter);
    over_in_place(&mut surface.data, resized.as_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
