/// Convenience result type used across the crate.
pub type MockupResult<T> = Result<T, MockupError>;

/// Top-level error taxonomy for rendering and export.
#[derive(thiserror::Error, Debug)]
pub enum MockupError {
    /// Invalid options, geometry, or caller state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Device identifier missing from the registry.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// Bytes handed in as a user image are not a decodable raster.
    #[error("invalid source image: {0}")]
    InvalidSourceImage(String),

    /// A device frame overlay could not be loaded or decoded.
    #[error("image load error ({reference}): {message}")]
    ImageLoad {
        /// Overlay reference that failed.
        reference: String,
        /// Human-readable cause.
        message: String,
    },

    /// Serializing a rendered surface failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A newer request for the same surface started before this one committed.
    #[error("render superseded by a newer request")]
    Superseded,

    /// Errors when serializing or deserializing configuration data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MockupError {
    /// Build a [`MockupError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MockupError::UnknownDevice`] value.
    pub fn unknown_device(id: impl Into<String>) -> Self {
        Self::UnknownDevice(id.into())
    }

    /// Build a [`MockupError::InvalidSourceImage`] value.
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSourceImage(msg.into())
    }

    /// Build a [`MockupError::ImageLoad`] value.
    pub fn image_load(reference: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ImageLoad {
            reference: reference.into(),
            message: msg.into(),
        }
    }

    /// Build a [`MockupError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`MockupError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
