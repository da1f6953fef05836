use std::sync::Arc;

use crate::assets::cache::OverlayCache;
use crate::assets::loader::OverlayLoader;
use crate::assets::raster::RasterImage;
use crate::config::ResampleFilter;
use crate::device::geometry::DeviceGeometry;
use crate::foundation::core::{PixelSize, Rect, scale_rect, scaled_dimension};
use crate::foundation::error::MockupResult;
use crate::render::composite::{draw_overlay, draw_raster};
use crate::render::fit::{FitMode, compute_dest_rect};
use crate::render::surface::{RenderTicket, RenderedSurface, SurfaceSlot};

/// Inputs for one render.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// User image drawn into the screen cutout.
    pub source: RasterImage,
    /// Target device frame.
    pub device: DeviceGeometry,
    /// Placement rule inside the cutout.
    pub fit_mode: FitMode,
    /// Uniform multiplier applied to the device geometry.
    pub output_scale: f64,
    /// Resampling filter for the user image and the overlay.
    pub filter: ResampleFilter,
}

impl RenderRequest {
    /// Build a request with the default resampling filter.
    pub fn new(
        source: RasterImage,
        device: DeviceGeometry,
        fit_mode: FitMode,
        output_scale: f64,
    ) -> Self {
        Self {
            source,
            device,
            fit_mode,
            output_scale,
            filter: ResampleFilter::default(),
        }
    }

    /// Override the resampling filter.
    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Placement computed for a request, in output-surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderLayout {
    /// Output surface dimensions (frame × scale, rounded half up).
    pub surface: PixelSize,
    /// Screen cutout scaled by the output scale.
    pub screen_rect: Rect,
    /// Where the user image is drawn.
    pub dest_rect: Rect,
}

/// Compute surface size and image placement for `request`.
pub fn layout(request: &RenderRequest) -> MockupResult<RenderLayout> {
    let scale = request.output_scale;
    let frame = request.device.frame_size();
    let surface = PixelSize::new(
        scaled_dimension(frame.width, scale)?,
        scaled_dimension(frame.height, scale)?,
    );
    let screen_rect = scale_rect(request.device.screen_rect(), scale);
    let dest_rect = compute_dest_rect(
        request.source.width(),
        request.source.height(),
        screen_rect,
        request.fit_mode,
    );
    Ok(RenderLayout {
        surface,
        screen_rect,
        dest_rect,
    })
}

/// Result of a render that did not fail.
#[derive(Clone, Debug)]
pub enum RenderOutcome {
    /// The surface was published to the target slot.
    Committed(Arc<RenderedSurface>),
    /// A newer request for the same slot started first; nothing was published.
    Superseded,
}

impl RenderOutcome {
    /// Published surface, if any.
    pub fn surface(&self) -> Option<&Arc<RenderedSurface>> {
        match self {
            Self::Committed(s) => Some(s),
            Self::Superseded => None,
        }
    }

    /// Return `true` for [`RenderOutcome::Superseded`].
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Draws the user image and then the device frame into an output surface.
pub struct Compositor<L> {
    overlays: OverlayCache<L>,
}

impl<L: OverlayLoader> Compositor<L> {
    /// Compositor loading frame overlays through `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            overlays: OverlayCache::new(loader),
        }
    }

    /// Overlay cache shared by every render.
    pub fn overlays(&self) -> &OverlayCache<L> {
        &self.overlays
    }

    /// Render `request` into `slot`.
    pub async fn render(
        &self,
        request: &RenderRequest,
        slot: &SurfaceSlot,
    ) -> MockupResult<RenderOutcome> {
        let ticket = slot.begin();
        self.render_with_ticket(request, slot, ticket).await
    }

    /// Render with a ticket obtained earlier from `slot`.
    ///
    /// On error the slot keeps whatever it showed before; the partial surface is dropped.
    #[tracing::instrument(
        skip_all,
        fields(
            slot = slot.name(),
            device = %request.device.id,
            scale = request.output_scale,
            fit = ?request.fit_mode,
        )
    )]
    pub async fn render_with_ticket(
        &self,
        request: &RenderRequest,
        slot: &SurfaceSlot,
        ticket: RenderTicket,
    ) -> MockupResult<RenderOutcome> {
        let layout = layout(request)?;
        let filter = request.filter.into();

        let mut surface = RenderedSurface::new_transparent(layout.surface)?;
        draw_raster(&mut surface, &request.source, layout.dest_rect, filter);

        let overlay = self
            .overlays
            .get_scaled(&request.device, layout.surface, request.filter)
            .await?;
        if !slot.is_current(ticket) {
            tracing::debug!("superseded while loading overlay");
            return Ok(RenderOutcome::Superseded);
        }

        draw_overlay(&mut surface, &overlay, filter)?;
        Ok(match slot.commit(ticket, surface) {
            Some(s) => {
                tracing::debug!(
                    width = layout.surface.width,
                    height = layout.surface.height,
                    "render committed"
                );
                RenderOutcome::Committed(s)
            }
            None => RenderOutcome::Superseded,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
