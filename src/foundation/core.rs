use crate::foundation::error::{MockupError, MockupResult};

pub use kurbo::Rect;

/// Integer pixel dimensions of a surface or raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a size value.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either axis is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Reject scale factors that are not finite and strictly positive.
pub fn validate_scale(scale: f64) -> MockupResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MockupError::validation(format!(
            "output scale must be finite and > 0, got {scale}"
        )));
    }
    Ok(())
}

/// Scale a native pixel dimension, rounding half up.
///
/// `363.5` becomes `364`, `746.1` becomes `746`. A result of zero is an error since no surface
/// can be allocated for it.
pub fn scaled_dimension(dim: u32, scale: f64) -> MockupResult<u32> {
    validate_scale(scale)?;
    let v = (f64::from(dim) * scale + 0.5).floor();
    if v < 1.0 {
        return Err(MockupError::validation(format!(
            "dimension {dim} at scale {scale} rounds to zero pixels"
        )));
    }
    if v > f64::from(u32::MAX) {
        return Err(MockupError::validation(format!(
            "dimension {dim} at scale {scale} overflows u32"
        )));
    }
    Ok(v as u32)
}

/// Scale every coordinate of `rect` by `scale` without rounding.
pub fn scale_rect(rect: Rect, scale: f64) -> Rect {
    Rect::new(
        rect.x0 * scale,
        rect.y0 * scale,
        rect.x1 * scale,
        rect.y1 * scale,
    )
}

/// Integer pixel span covered by a rectangle on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelBounds {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Snap `rect` to whole pixels by rounding each edge toward the center, then clip to the
/// surface. Returns `None` when nothing is left to draw.
pub(crate) fn pixel_bounds(rect: Rect, surface: PixelSize) -> Option<PixelBounds> {
    let r = rect.abs().trunc();
    let x0 = r.x0.max(0.0);
    let y0 = r.y0.max(0.0);
    let x1 = r.x1.min(f64::from(surface.width));
    let y1 = r.y1.min(f64::from(surface.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelBounds {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
