use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::core::PixelSize;
use crate::foundation::error::{MockupError, MockupResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// A completed render as premultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RenderedSurface {
    /// Allocate a fully transparent surface.
    pub fn new_transparent(size: PixelSize) -> MockupResult<Self> {
        if size.is_empty() {
            return Err(MockupError::validation("surface must have non-zero area"));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            data: vec![0u8; size.rgba8_len()],
        })
    }

    /// Surface dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy for display or encoding.
    pub fn to_rgba_image(&self) -> MockupResult<image::RgbaImage> {
        let mut raw = self.data.clone();
        unpremultiply_rgba8_in_place(&mut raw);
        image::RgbaImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
            MockupError::validation(format!(
                "surface buffer does not match {}x{}",
                self.width, self.height
            ))
        })
    }
}

/// Identity of one render against a [`SurfaceSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTicket(u64);

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    surface: Option<Arc<RenderedSurface>>,
}

/// Holder for the live surface of one render target (preview or export).
///
/// Every render takes a ticket before it starts drawing. Only the holder of the newest ticket may
/// commit; anything older is discarded, so the slot always shows a complete surface from the most
/// recent request that finished.
#[derive(Debug)]
pub struct SurfaceSlot {
    name: &'static str,
    state: Mutex<SlotState>,
}

impl SurfaceSlot {
    /// Create an empty slot; `name` only appears in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(SlotState::default()),
        }
    }

    /// Slot label.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start a new render, retiring every outstanding ticket.
    pub fn begin(&self) -> RenderTicket {
        let mut st = self.lock();
        st.generation = st.generation.wrapping_add(1);
        RenderTicket(st.generation)
    }

    /// Retire outstanding tickets without starting a render.
    pub fn invalidate(&self) {
        let mut st = self.lock();
        st.generation = st.generation.wrapping_add(1);
    }

    /// Return `true` while `ticket` is the newest ticket.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.lock().generation == ticket.0
    }

    /// Publish `surface` if `ticket` is still current.
    pub fn commit(
        &self,
        ticket: RenderTicket,
        surface: RenderedSurface,
    ) -> Option<Arc<RenderedSurface>> {
        let mut st = self.lock();
        if st.generation != ticket.0 {
            tracing::debug!(slot = self.name, "discarding superseded render");
            return None;
        }
        let surface = Arc::new(surface);
        st.surface = Some(Arc::clone(&surface));
        Some(surface)
    }

    /// Last committed surface.
    pub fn current(&self) -> Option<Arc<RenderedSurface>> {
        self.lock().surface.clone()
    }

    /// Drop the committed surface and retire outstanding tickets.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.generation = st.generation.wrapping_add(1);
        st.surface = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
