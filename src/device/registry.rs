use std::collections::BTreeMap;

use crate::device::geometry::DeviceGeometry;
use crate::foundation::error::{MockupError, MockupResult};

/// Read-only mapping from device id to frame geometry.
///
/// Adding a device is a data change: append a record to [`builtin_devices`] or load one from
/// JSON.
#[derive(Clone, Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, DeviceGeometry>,
}

/// Frames shipped with the crate.
pub fn builtin_devices() -> Vec<DeviceGeometry> {
    vec![
        DeviceGeometry {
            id: "iphone".to_string(),
            name: "iPhone".to_string(),
            overlay: "frames/iphone.png".to_string(),
            frame_width: 1212,
            frame_height: 2487,
            screen_x: 48,
            screen_y: 40,
            screen_width: 1116,
            screen_height: 2407,
        },
        DeviceGeometry {
            id: "laptop".to_string(),
            name: "Laptop".to_string(),
            overlay: "frames/laptop.png".to_string(),
            frame_width: 4548,
            frame_height: 2931,
            screen_x: 968,
            screen_y: 627,
            screen_width: 2612,
            screen_height: 1677,
        },
    ]
}

impl DeviceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in devices.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        for device in builtin_devices() {
            if let Err(e) = reg.insert(device) {
                tracing::error!(error = %e, "invalid built-in device");
            }
        }
        reg
    }

    /// Parse a JSON array of device records.
    pub fn from_json_str(s: &str) -> MockupResult<Self> {
        let devices: Vec<DeviceGeometry> =
            serde_json::from_str(s).map_err(|e| MockupError::serde(e.to_string()))?;
        let mut reg = Self::new();
        for device in devices {
            reg.insert(device)?;
        }
        Ok(reg)
    }

    /// Validate and add a device. Duplicate ids are rejected.
    pub fn insert(&mut self, device: DeviceGeometry) -> MockupResult<()> {
        let device = device.validate()?;
        if self.devices.contains_key(&device.id) {
            return Err(MockupError::validation(format!(
                "duplicate device id: {}",
                device.id
            )));
        }
        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    /// Look up a device by id.
    pub fn get(&self, id: &str) -> MockupResult<&DeviceGeometry> {
        self.devices
            .get(id)
            .ok_or_else(|| MockupError::unknown_device(id))
    }

    /// Return `true` when `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// Device ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Devices in id order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceGeometry> {
        self.devices.values()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Return `true` when no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/registry.rs"]
mod tests;
