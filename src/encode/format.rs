/// Image format for exports.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ExportFormat {
    /// Lossless; quality is ignored.
    #[default]
    #[serde(rename = "png")]
    Png,
    /// Lossy; transparent pixels are flattened onto black.
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}
