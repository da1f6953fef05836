use crate::foundation::core::Rect;

/// How the user image is mapped into the screen cutout.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Fill the cutout exactly, ignoring the image's aspect ratio.
    Stretch,
    /// Largest aspect-preserving size that fits, centered on both axes.
    #[default]
    AspectFit,
}

/// Compute where a `source_width`×`source_height` image lands inside `screen`.
///
/// Callers must pass a non-empty source and a screen rectangle with positive width and height.
pub fn compute_dest_rect(source_width: u32, source_height: u32, screen: Rect, mode: FitMode) -> Rect {
    match mode {
        FitMode::Stretch => screen,
        FitMode::AspectFit => {
            let source_aspect = f64::from(source_width) / f64::from(source_height);
            let (sw, sh) = (screen.width(), screen.height());
            let screen_aspect = sw / sh;

            if source_aspect > screen_aspect {
                let h = sw / source_aspect;
                Rect::from_origin_size((screen.x0, screen.y0 + (sh - h) / 2.0), (sw, h))
            } else {
                let w = sh * source_aspect;
                Rect::from_origin_size((screen.x0 + (sw - w) / 2.0, screen.y0), (w, sh))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
