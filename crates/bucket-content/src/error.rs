//! Error types for bucket-content

/// Result type for bucket-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding handle contents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content of {path}: {message}")]
    ParseError {
        format: String,
        path: String,
        message: String,
    },

    #[error("Failed to serialize {format} content for {path}: {message}")]
    SerializeError {
        format: String,
        path: String,
        message: String,
    },

    #[error("Unrecognized image format: {path}")]
    UnknownImageFormat { path: String },

    #[error(transparent)]
    Fs(#[from] bucket_fs::Error),

    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),
}

impl Error {
    pub fn parse(
        format: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ParseError {
            format: format.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn serialize(
        format: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SerializeError {
            format: format.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}
