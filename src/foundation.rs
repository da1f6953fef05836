/// Geometry helpers and the output-dimension rounding rule.
pub mod core;
/// Crate error taxonomy.
pub mod error;
/// Fixed-point helpers for premultiplied RGBA8 math.
pub(crate) mod math;
