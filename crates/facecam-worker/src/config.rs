//! Facecam configuration.

use std::path::PathBuf;
use std::time::Duration;

use facecam_media::{DetectorKind, DrawMode, DEFAULT_MAX_FACES, DEFAULT_MIN_EYE_DISTANCE};
use facecam_models::Rotation;

use crate::error::{WorkerError, WorkerResult};

/// Pipeline and overlay configuration.
#[derive(Debug, Clone)]
pub struct FacecamConfig {
    /// Faces reported per frame
    pub max_faces: usize,
    /// Preview view width in pixels
    pub view_width: u32,
    /// Preview view height in pixels
    pub view_height: u32,
    /// Mirror the overlay horizontally (front camera)
    pub mirror: bool,
    /// Overlay decoration style
    pub draw_mode: DrawMode,
    /// Smallest rounded eye distance that produces a thumbnail
    pub min_eye_distance: u32,
    /// Where the face thumbnail is written; `None` disables persistence
    pub thumbnail_path: Option<PathBuf>,
    /// Minimum time between thumbnail writes
    pub thumbnail_interval: Duration,
    /// Detection backend
    pub detector: DetectorKind,
    /// Model file for the detection backend
    pub model_path: PathBuf,
    /// Directory of stills for the replay harness
    pub replay_dir: PathBuf,
    /// Rotation applied to every replayed still
    pub replay_rotation: Rotation,
    /// Install the Prometheus recorder
    pub metrics_enabled: bool,
}

impl Default for FacecamConfig {
    fn default() -> Self {
        Self {
            max_faces: DEFAULT_MAX_FACES,
            view_width: 1080,
            view_height: 1920,
            mirror: true, // front camera
            draw_mode: DrawMode::Brackets,
            min_eye_distance: DEFAULT_MIN_EYE_DISTANCE,
            thumbnail_path: Some(PathBuf::from("downloads/face.png")),
            thumbnail_interval: Duration::ZERO,
            detector: DetectorKind::YuNet,
            model_path: PathBuf::from("models/face_detection_yunet_2023mar.onnx"),
            replay_dir: PathBuf::from("frames"),
            replay_rotation: Rotation::Deg0,
            metrics_enabled: false,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl FacecamConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_faces: std::env::var("FACECAM_MAX_FACES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_faces),
            view_width: std::env::var("FACECAM_VIEW_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.view_width),
            view_height: std::env::var("FACECAM_VIEW_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.view_height),
            mirror: std::env::var("FACECAM_MIRROR")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.mirror),
            draw_mode: std::env::var("FACECAM_DRAW_MODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.draw_mode),
            min_eye_distance: std::env::var("FACECAM_MIN_EYE_DISTANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_eye_distance),
            thumbnail_path: match std::env::var("FACECAM_THUMBNAIL_PATH") {
                Ok(s) if s.trim().is_empty() => None,
                Ok(s) => Some(PathBuf::from(s)),
                Err(_) => defaults.thumbnail_path,
            },
            thumbnail_interval: Duration::from_millis(
                std::env::var("FACECAM_THUMBNAIL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            ),
            detector: std::env::var("FACECAM_DETECTOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.detector),
            model_path: std::env::var("FACECAM_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            replay_dir: std::env::var("FACECAM_REPLAY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.replay_dir),
            replay_rotation: std::env::var("FACECAM_REPLAY_ROTATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.replay_rotation),
            metrics_enabled: std::env::var("FACECAM_METRICS")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.view_width == 0 || self.view_height == 0 {
            return Err(WorkerError::config(format!(
                "view size must be non-zero, got {}x{}",
                self.view_width, self.view_height
            )));
        }
        if self.max_faces == 0 {
            return Err(WorkerError::config("max_faces must be at least 1"));
        }
        Ok(())
    }

    /// (width, height) of the preview view.
    pub fn view_size(&self) -> (u32, u32) {
        (self.view_width, self.view_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FacecamConfig::default();
        assert_eq!(config.max_faces, 3);
        assert_eq!(config.min_eye_distance, 40);
        assert!(config.mirror);
        assert_eq!(config.draw_mode, DrawMode::Brackets);
        assert_eq!(config.thumbnail_interval, Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_view() {
        let config = FacecamConfig {
            view_width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(WorkerError::Config(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
