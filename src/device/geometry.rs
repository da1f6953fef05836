use crate::assets::loader::normalize_rel_path;
use crate::foundation::core::{PixelSize, Rect};
use crate::foundation::error::{MockupError, MockupResult};

/// Frame geometry for one device, in the frame image's native pixel space.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceGeometry {
    /// Registry key, also used in export file names.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Overlay image reference, relative to the overlay loader root.
    pub overlay: String,
    /// Frame width in pixels.
    pub frame_width: u32,
    /// Frame height in pixels.
    pub frame_height: u32,
    /// Left edge of the screen cutout.
    pub screen_x: u32,
    /// Top edge of the screen cutout.
    pub screen_y: u32,
    /// Width of the screen cutout.
    pub screen_width: u32,
    /// Height of the screen cutout.
    pub screen_height: u32,
}

impl DeviceGeometry {
    /// Native frame dimensions.
    pub fn frame_size(&self) -> PixelSize {
        PixelSize::new(self.frame_width, self.frame_height)
    }

    /// Screen cutout in native frame coordinates.
    pub fn screen_rect(&self) -> Rect {
        Rect::from_origin_size(
            (f64::from(self.screen_x), f64::from(self.screen_y)),
            (f64::from(self.screen_width), f64::from(self.screen_height)),
        )
    }

    /// Check identifiers, sizes and cutout containment, and normalize the overlay reference.
    pub fn validate(mut self) -> MockupResult<Self> {
        if self.id.trim().is_empty() {
            return Err(MockupError::validation("device id must be non-empty"));
        }
        if self.frame_size().is_empty() {
            return Err(MockupError::validation(format!(
                "device {}: frame must have non-zero area",
                self.id
            )));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(MockupError::validation(format!(
                "device {}: screen cutout must have non-zero area",
                self.id
            )));
        }
        let right = u64::from(self.screen_x) + u64::from(self.screen_width);
        let bottom = u64::from(self.screen_y) + u64::from(self.screen_height);
        if right > u64::from(self.frame_width) || bottom > u64::from(self.frame_height) {
            return Err(MockupError::validation(format!(
                "device {}: screen cutout {}x{}+{}+{} exceeds frame {}x{}",
                self.id,
                self.screen_width,
                self.screen_height,
                self.screen_x,
                self.screen_y,
                self.frame_width,
                self.frame_height
            )));
        }
        self.overlay = normalize_rel_path(&self.overlay)?;
        Ok(self)
    }
}
