use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::assets::loader::OverlayLoader;
use crate::assets::raster::RasterImage;
use crate::config::{StudioOpts, is_valid_quality};
use crate::device::registry::DeviceRegistry;
use crate::encode::artifact::{ExportArtifact, export_file_name, now_millis};
use crate::encode::encoder::encode_surface;
use crate::encode::format::ExportFormat;
use crate::foundation::error::{MockupError, MockupResult};
use crate::render::compositor::{Compositor, RenderOutcome, RenderRequest};
use crate::render::fit::FitMode;
use crate::render::surface::{RenderedSurface, SurfaceSlot};

/// Current user selections driving both render paths.
#[derive(Clone, Debug)]
pub struct MockupInputs {
    /// User image, if one is loaded.
    pub source: Option<RasterImage>,
    /// Selected device id.
    pub device_id: String,
    /// Selected fit mode.
    pub fit_mode: FitMode,
}

/// Outcome of a debounced preview render.
#[derive(Debug)]
pub enum PreviewEvent {
    /// The preview surface was replaced.
    Ready {
        /// Device the preview was rendered for.
        device_id: String,
        /// The new preview surface.
        surface: Arc<RenderedSurface>,
    },
    /// The render failed; the previous preview is still shown.
    Failed {
        /// Device the preview was rendered for.
        device_id: String,
        /// Why the render failed.
        error: MockupError,
    },
}

#[derive(Debug, Default)]
struct PendingPreview {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

struct Shared<L> {
    compositor: Compositor<L>,
    registry: DeviceRegistry,
    opts: StudioOpts,
    inputs: Mutex<MockupInputs>,
    pending: Mutex<PendingPreview>,
    preview: SurfaceSlot,
    export: SurfaceSlot,
    events: mpsc::UnboundedSender<PreviewEvent>,
}

/// Drives preview and export renders from input changes.
///
/// Every input change restarts the debounce window; only the render for the latest inputs ever
/// runs. Exports run immediately against the inputs at call time. Preview and export write to
/// separate surfaces and never wait on each other.
///
/// Input setters spawn Tokio tasks and must be called from within a runtime.
pub struct RenderScheduler<L> {
    shared: Arc<Shared<L>>,
}

impl<L> Shared<L> {
    fn lock_inputs(&self) -> MutexGuard<'_, MockupInputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingPreview> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_pending(&self) {
        let mut pending = self.lock_pending();
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
        pending.epoch = pending.epoch.wrapping_add(1);
        self.preview.invalidate();
    }

    fn request_for(&self, scale: f64, inputs: &MockupInputs) -> Option<RenderRequest> {
        let source = inputs.source.clone()?;
        let device = self.registry.get(&inputs.device_id).ok()?.clone();
        Some(RenderRequest::new(source, device, inputs.fit_mode, scale))
    }
}

impl<L: OverlayLoader> Shared<L> {
    async fn run_preview(&self, epoch: u64, request: RenderRequest) {
        let ticket = {
            let pending = self.lock_pending();
            if pending.epoch != epoch {
                tracing::debug!(epoch, "stale preview skipped");
                return;
            }
            self.preview.begin()
        };

        let result = self
            .compositor
            .render_with_ticket(&request, &self.preview, ticket)
            .await;

        // Held through the send: reschedules bump the epoch under this lock.
        let mut pending = self.lock_pending();
        let stale = pending.epoch != epoch;
        if !stale {
            pending.handle = None;
        }

        let device_id = request.device.id;
        let event = match result {
            Ok(RenderOutcome::Committed(surface)) => PreviewEvent::Ready { device_id, surface },
            Ok(RenderOutcome::Superseded) => return,
            Err(error) if stale => {
                tracing::debug!(device = %device_id, %error, "stale preview failure dropped");
                return;
            }
            Err(error) => {
                tracing::warn!(device = %device_id, %error, "preview render failed");
                PreviewEvent::Failed { device_id, error }
            }
        };
        if self.events.send(event).is_err() {
            tracing::debug!("preview listener dropped");
        }
        drop(pending);
    }
}

impl<L: OverlayLoader> RenderScheduler<L> {
    /// Create a scheduler and the receiver its preview events are delivered on.
    ///
    /// The first device in `registry` (by id) is selected initially.
    pub fn new(
        compositor: Compositor<L>,
        registry: DeviceRegistry,
        opts: StudioOpts,
    ) -> MockupResult<(Self, mpsc::UnboundedReceiver<PreviewEvent>)> {
        opts.validate()?;
        let device_id = registry
            .ids()
            .next()
            .ok_or_else(|| MockupError::validation("device registry is empty"))?
            .to_string();
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            compositor,
            registry,
            opts,
            inputs: Mutex::new(MockupInputs {
                source: None,
                device_id,
                fit_mode: FitMode::default(),
            }),
            pending: Mutex::new(PendingPreview::default()),
            preview: SurfaceSlot::new("preview"),
            export: SurfaceSlot::new("export"),
            events,
        };
        Ok((
            Self {
                shared: Arc::new(shared),
            },
            rx,
        ))
    }

    /// Replace or clear the user image.
    ///
    /// Clearing cancels any pending preview and empties the preview surface.
    pub fn set_source(&self, source: Option<RasterImage>) {
        let cleared = source.is_none();
        self.shared.lock_inputs().source = source;
        if cleared {
            self.shared.cancel_pending();
            self.shared.preview.clear();
            return;
        }
        self.schedule_preview();
    }

    /// Select a device by id.
    pub fn set_device(&self, device_id: &str) -> MockupResult<()> {
        self.shared.registry.get(device_id)?;
        self.shared.lock_inputs().device_id = device_id.to_string();
        self.schedule_preview();
        Ok(())
    }

    /// Select the fit mode.
    pub fn set_fit_mode(&self, mode: FitMode) {
        self.shared.lock_inputs().fit_mode = mode;
        self.schedule_preview();
    }

    /// Restart the debounce window for a preview of the current inputs.
    ///
    /// Any pending preview is cancelled first and can no longer start rendering. Does nothing
    /// beyond the cancellation when no user image is loaded.
    pub fn schedule_preview(&self) {
        // Held until the new task is registered so concurrent setters schedule in input order.
        let inputs = self.shared.lock_inputs();
        let Some(request) = self
            .shared
            .request_for(self.shared.opts.preview_scale, &inputs)
        else {
            self.shared.cancel_pending();
            return;
        };
        let request = request.with_filter(self.shared.opts.preview_filter);

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.opts.debounce();
        let mut pending = self.shared.lock_pending();
        if let Some(handle) = pending.handle.take() {
            handle.abort();
            tracing::debug!("debounce restarted");
        }
        pending.epoch = pending.epoch.wrapping_add(1);
        let epoch = pending.epoch;
        self.shared.preview.invalidate();

        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.run_preview(epoch, request).await;
        }));
        drop(inputs);
    }

    /// Cancel a pending preview without touching the current preview surface.
    pub fn cancel_preview(&self) {
        self.shared.cancel_pending();
    }

    /// Return `true` while a preview is waiting out its debounce window or rendering.
    pub fn is_preview_pending(&self) -> bool {
        self.shared.lock_pending().handle.is_some()
    }

    /// Last successfully rendered preview.
    pub fn preview_surface(&self) -> Option<Arc<RenderedSurface>> {
        self.shared.preview.current()
    }

    /// Last successfully rendered export surface.
    pub fn export_surface(&self) -> Option<Arc<RenderedSurface>> {
        self.shared.export.current()
    }

    /// Snapshot of the current inputs.
    pub fn inputs(&self) -> MockupInputs {
        self.shared.lock_inputs().clone()
    }

    /// Options in effect.
    pub fn opts(&self) -> &StudioOpts {
        &self.shared.opts
    }

    /// Devices available for selection.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.shared.registry
    }

    /// Compositor shared by both paths.
    pub fn compositor(&self) -> &Compositor<L> {
        &self.shared.compositor
    }

    /// Render the current inputs at export scale and encode them.
    ///
    /// Bypasses the debounce window. Fails without producing bytes if no image is loaded, the
    /// render fails, a newer export overtakes this one, or encoding fails.
    #[tracing::instrument(skip(self))]
    pub async fn export(
        &self,
        format: ExportFormat,
        quality: Option<f32>,
    ) -> MockupResult<ExportArtifact> {
        let request = {
            let inputs = self.shared.lock_inputs();
            self.shared
                .request_for(self.shared.opts.export_scale, &inputs)
        }
        .ok_or_else(|| MockupError::validation("no source image to export"))?
        .with_filter(self.shared.opts.export_filter);

        let surface = match self
            .shared
            .compositor
            .render(&request, &self.shared.export)
            .await?
        {
            RenderOutcome::Committed(surface) => surface,
            RenderOutcome::Superseded => return Err(MockupError::Superseded),
        };

        let quality = match quality {
            Some(q) if !is_valid_quality(q) => {
                tracing::warn!(quality = q, "jpeg quality out of range, using configured default");
                Some(self.shared.opts.jpeg_quality)
            }
            Some(q) => Some(q),
            None => Some(self.shared.opts.jpeg_quality),
        };
        let (width, height) = (surface.width, surface.height);
        let bytes =
            tokio::task::spawn_blocking(move || encode_surface(&surface, format, quality))
                .await
                .map_err(|e| MockupError::encoding(format!("encode task failed: {e}")))??;

        let file_name = export_file_name(&request.device.id, now_millis(), format);
        tracing::info!(file = %file_name, bytes = bytes.len(), "export ready");
        Ok(ExportArtifact {
            bytes,
            format,
            file_name,
            width,
            height,
        })
    }
}

impl<L> Drop for RenderScheduler<L> {
    fn drop(&mut self) {
        let mut pending = self.shared.lock_pending();
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
