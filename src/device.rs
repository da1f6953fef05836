/// Device frame geometry records.
pub mod geometry;
/// Immutable device lookup table.
pub mod registry;
