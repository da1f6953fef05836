//! Device-frame mockup compositing.
//!
//! A user image is placed into a device's screen cutout, the device frame is drawn on top, and the
//! result is rendered at two independent resolutions that share one algorithm:
//!
//! - a debounced, low-resolution preview driven by input changes
//! - an immediate, full-resolution export encoded to PNG or JPEG
//!
//! Start from a [`DeviceRegistry`], wrap an [`OverlayLoader`] in a [`Compositor`], and drive it
//! through a [`RenderScheduler`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Rasters, decoding, and frame overlay loading.
pub mod assets;
/// Studio options.
pub mod config;
/// Device geometry registry.
pub mod device;
pub mod encode;
mod foundation;
/// Fit calculation, compositing, and render scheduling.
pub mod render;

pub use crate::assets::cache::OverlayCache;
pub use crate::assets::decode::{decode_image, decode_source_image};
pub use crate::assets::loader::{FsOverlayLoader, MemoryOverlayLoader, OverlayLoader};
pub use crate::assets::raster::RasterImage;
pub use crate::config::{ResampleFilter, StudioOpts};
pub use crate::device::geometry::DeviceGeometry;
pub use crate::device::registry::{DeviceRegistry, builtin_devices};
pub use crate::encode::artifact::{ExportArtifact, export_file_name};
pub use crate::encode::encoder::{DEFAULT_JPEG_QUALITY, encode_surface, resolve_jpeg_quality};
pub use crate::encode::format::ExportFormat;
pub use crate::foundation::core::{PixelSize, Rect, scale_rect, scaled_dimension};
pub use crate::foundation::error::{MockupError, MockupResult};
pub use crate::render::compositor::{
    Compositor, RenderLayout, RenderOutcome, RenderRequest, layout,
};
pub use crate::render::fit::{FitMode, compute_dest_rect};
pub use crate::render::scheduler::{MockupInputs, PreviewEvent, RenderScheduler};
pub use crate::render::surface::{RenderTicket, RenderedSurface, SurfaceSlot};
