use std::time::{SystemTime, UNIX_EPOCH};

use crate::encode::format::ExportFormat;

/// An encoded export ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Format of `bytes`.
    pub format: ExportFormat,
    /// Suggested download name, `mockup-<device>-<millis>.<ext>`.
    pub file_name: String,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

/// Suggested file name for an export of `device_id` taken at `timestamp_millis`.
pub fn export_file_name(device_id: &str, timestamp_millis: u128, format: ExportFormat) -> String {
    format!(
        "mockup-{device_id}-{timestamp_millis}.{}",
        format.extension()
    )
}

/// Milliseconds since the Unix epoch; zero if the clock is before it.
pub(crate) fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
