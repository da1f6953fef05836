use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::assets::loader::OverlayLoader;
use crate::assets::raster::RasterImage;
use crate::config::ResampleFilter;
use crate::device::geometry::DeviceGeometry;
use crate::foundation::core::PixelSize;
use crate::foundation::error::MockupResult;

type Slot = Arc<OnceCell<Arc<RasterImage>>>;
type ScaledKey = (String, PixelSize, ResampleFilter);

/// Frame overlays keyed by device id, kept for the lifetime of the cache.
///
/// Concurrent requests for the same device share a single in-flight load. Failed loads are not
/// remembered: the next request for that device tries again.
///
/// Resampled copies are kept per device, output size and filter, so repeated renders at one
/// scale resample the frame once.
pub struct OverlayCache<L> {
    loader: L,
    entries: Mutex<HashMap<String, Slot>>,
    scaled: Mutex<HashMap<ScaledKey, Arc<RasterImage>>>,
    loads: AtomicU64,
    resamples: AtomicU64,
}

impl<L: OverlayLoader> OverlayCache<L> {
    /// Wrap `loader` with an empty cache.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
            scaled: Mutex::new(HashMap::new()),
            loads: AtomicU64::new(0),
            resamples: AtomicU64::new(0),
        }
    }

    /// Borrow the underlying loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Number of loader invocations issued through this cache.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of overlay resamples performed.
    pub fn resample_count(&self) -> u64 {
        self.resamples.load(Ordering::SeqCst)
    }

    /// Return `true` when the overlay for `device_id` is resident.
    pub fn is_cached(&self, device_id: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(device_id)
            .is_some_and(|slot| slot.initialized())
    }

    fn slot_for(&self, device_id: &str) -> Slot {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(device_id.to_string()).or_default())
    }

    /// Return the overlay for `device`, loading it on first use.
    pub async fn get_or_load(&self, device: &DeviceGeometry) -> MockupResult<Arc<RasterImage>> {
        let slot = self.slot_for(&device.id);
        if let Some(img) = slot.get() {
            tracing::debug!(device = %device.id, "overlay cache hit");
            return Ok(Arc::clone(img));
        }

        let img = slot
            .get_or_try_init(|| async {
                tracing::debug!(device = %device.id, overlay = %device.overlay, "overlay cache miss");
                self.loads.fetch_add(1, Ordering::SeqCst);
                self.loader.load(&device.overlay).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(img))
    }

    /// Return the overlay for `device` at `size`, resampling with `filter` on first use.
    pub async fn get_scaled(
        &self,
        device: &DeviceGeometry,
        size: PixelSize,
        filter: ResampleFilter,
    ) -> MockupResult<Arc<RasterImage>> {
        let native = self.get_or_load(device).await?;
        if native.size() == size {
            return Ok(native);
        }

        let key = (device.id.clone(), size, filter);
        if let Some(hit) = self.lock_scaled().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let resized = native.resized(size, filter.into());
        self.resamples.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            device = %device.id,
            width = size.width,
            height = size.height,
            "overlay resampled"
        );
        let mut scaled = self.lock_scaled();
        Ok(Arc::clone(
            scaled.entry(key).or_insert_with(|| Arc::new(resized)),
        ))
    }

    fn lock_scaled(&self) -> std::sync::MutexGuard<'_, HashMap<ScaledKey, Arc<RasterImage>>> {
        self.scaled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
