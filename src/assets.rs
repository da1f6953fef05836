/// Process-lifetime frame overlay cache.
pub mod cache;
/// Raster decoding for user images and overlays.
pub mod decode;
/// Overlay loaders (filesystem and in-memory).
pub mod loader;
/// Premultiplied RGBA8 raster type.
pub mod raster;
