//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while turning a frame into overlay geometry.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Frame decode failed: {0}")]
    Decode(String),

    #[error("Unsupported rotation: {0} degrees")]
    InvalidRotation(i32),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Image encode failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a decode failure error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an encode failure error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}

impl From<facecam_models::RotationError> for MediaError {
    fn from(e: facecam_models::RotationError) -> Self {
        Self::InvalidRotation(e.0)
    }
}

impl From<image::ImageError> for MediaError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => Self::Io(io),
            image::ImageError::Decoding(d) => Self::Decode(d.to_string()),
            other => Self::Encode(other.to_string()),
        }
    }
}
