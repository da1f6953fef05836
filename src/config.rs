use std::time::Duration;

use crate::foundation::core::validate_scale;
use crate::foundation::error::{MockupError, MockupResult};

/// Resampling filter used when scaling the user image and the frame overlay.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Nearest neighbour; fastest, blocky.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with window 3; sharpest, slowest.
    Lanczos3,
}

impl From<ResampleFilter> for image::imageops::FilterType {
    fn from(f: ResampleFilter) -> Self {
        match f {
            ResampleFilter::Nearest => Self::Nearest,
            ResampleFilter::Triangle => Self::Triangle,
            ResampleFilter::CatmullRom => Self::CatmullRom,
            ResampleFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Studio-wide options: output scales, debounce window, export defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioOpts {
    /// Multiplier applied to device geometry for preview renders.
    pub preview_scale: f64,
    /// Multiplier applied to device geometry for export renders.
    pub export_scale: f64,
    /// Quiescence delay before a preview render runs.
    pub debounce_ms: u64,
    /// JPEG quality used when an export does not specify one, in `(0, 1]`.
    pub jpeg_quality: f32,
    /// Filter for preview renders.
    pub preview_filter: ResampleFilter,
    /// Filter for export renders.
    pub export_filter: ResampleFilter,
}

impl Default for StudioOpts {
    fn default() -> Self {
        Self {
            preview_scale: 0.3,
            export_scale: 1.0,
            debounce_ms: 100,
            jpeg_quality: 0.95,
            preview_filter: ResampleFilter::Triangle,
            export_filter: ResampleFilter::CatmullRom,
        }
    }
}

impl StudioOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> MockupResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| MockupError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject non-positive scales and out-of-range JPEG quality.
    pub fn validate(&self) -> MockupResult<()> {
        validate_scale(self.preview_scale)?;
        validate_scale(self.export_scale)?;
        if !is_valid_quality(self.jpeg_quality) {
            return Err(MockupError::validation(format!(
                "jpeg_quality must be in (0, 1], got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub(crate) fn is_valid_quality(q: f32) -> bool {
    q.is_finite() && q > 0.0 && q <= 1.0
}

#[cfg(test)]
#[path = "../tests/unit/config/opts.rs"]
mod tests;
