/// Premultiplied source-over compositing and raster placement.
pub(crate) mod composite;
/// One full render: user image, then frame overlay.
pub mod compositor;
/// Destination rectangle computation.
pub mod fit;
/// Preview/export trigger paths.
pub mod scheduler;
/// Output surfaces and last-request-wins slots.
pub mod surface;
