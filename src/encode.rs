//! Export encoding.
//!
//! Rendered surfaces are serialized to PNG or JPEG and packaged with a suggested file name.

/// Encoded export plus delivery metadata.
pub mod artifact;
/// Surface to PNG/JPEG bytes.
pub mod encoder;
/// Export formats.
pub mod format;
