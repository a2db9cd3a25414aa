//! Face detector abstraction.
//!
//! [`FaceDetector`] is the seam between the pipeline and a concrete detection
//! backend. Backends are selected at runtime with [`DetectorKind`] and compiled
//! in with cargo features:
//!
//! - `opencv`: [`crate::yunet::YuNetDetector`] (landmark based)
//! - `rustface`: [`crate::rustface_backend::RustfaceDetector`] (box based)

use crate::error::{MediaError, MediaResult};
use crate::upright::UprightImage;
use facecam_models::FaceRecord;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// A bounded-count face detector.
#[cfg_attr(test, mockall::automock)]
pub trait FaceDetector: Send {
    /// Detect up to `max_faces` faces, in detector order.
    ///
    /// An image without faces yields an empty vector.
    fn detect(&mut self, image: &UprightImage, max_faces: usize) -> MediaResult<Vec<FaceRecord>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build a face record from two eye landmarks.
///
/// The midpoint is the mean of the eyes and the eye distance their Euclidean
/// distance.
pub fn face_from_eyes(right_eye: (f32, f32), left_eye: (f32, f32), confidence: f32) -> FaceRecord {
    let mid_x = (right_eye.0 + left_eye.0) / 2.0;
    let mid_y = (right_eye.1 + left_eye.1) / 2.0;
    let dx = left_eye.0 - right_eye.0;
    let dy = left_eye.1 - right_eye.1;
    FaceRecord::new(mid_x, mid_y, (dx * dx + dy * dy).sqrt(), confidence)
}

/// Build a face record from a bounding box without landmarks.
///
/// The eye line sits at 40% of the box height and the eye distance is half
/// the box width, so the overlay square spans the detected box horizontally.
pub fn face_from_box(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> FaceRecord {
    FaceRecord::new(x + width / 2.0, y + height * 0.4, width / 2.0, confidence)
}

/// Available detection backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetectorKind {
    /// OpenCV FaceDetectorYN (`opencv` feature)
    #[default]
    YuNet,
    /// SeetaFace cascade (`rustface` feature)
    Rustface,
}

impl DetectorKind {
    /// Returns the backend name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::YuNet => "yunet",
            DetectorKind::Rustface => "rustface",
        }
    }

    /// True when the backend was compiled into this build.
    pub fn is_available(&self) -> bool {
        match self {
            DetectorKind::YuNet => cfg!(feature = "opencv"),
            DetectorKind::Rustface => cfg!(feature = "rustface"),
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = DetectorKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yunet" | "opencv" => Ok(DetectorKind::YuNet),
            "rustface" | "seeta" => Ok(DetectorKind::Rustface),
            _ => Err(DetectorKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown detector: {0}")]
pub struct DetectorKindParseError(String);

/// Create a detector backend from a model file.
pub fn create_detector(kind: DetectorKind, model_path: &Path) -> MediaResult<Box<dyn FaceDetector>> {
    if !model_path.exists() {
        return Err(MediaError::model_not_found(model_path));
    }

    match kind {
        #[cfg(feature = "opencv")]
        DetectorKind::YuNet => Ok(Box::new(crate::yunet::YuNetDetector::new(model_path)?)),
        #[cfg(feature = "rustface")]
        DetectorKind::Rustface => Ok(Box::new(
            crate::rustface_backend::RustfaceDetector::new(model_path)?,
        )),
        #[allow(unreachable_patterns)]
        other => Err(MediaError::detection_failed(format!(
            "{} backend not compiled in (enable the matching cargo feature)",
            other
        ))),
    }
}
