//! Frame-to-overlay geometry for live camera previews.
//!
//! This crate provides:
//! - Frame decoding and rotation into upright RGB565 images
//! - A pluggable face detector seam with YuNet and SeetaFace backends
//! - Detector-space to view-space mapping with optional mirroring
//! - Thumbnail crop planning and persistence
//! - The overlay redraw state machine and bracket renderer
//!
//! # Architecture
//!
//! ```text
//! Frame ─▶ FrameConverter ─▶ UprightImage ─▶ FaceDetectorAdapter ─▶ [FaceRecord]
//!                                                                      │
//!                      ┌───────────────────────────────────────────────┤
//!                      ▼                                               ▼
//!              CoordinateMapper ─▶ OverlayState ─▶ OverlayRenderer   CropPlanner ─▶ ThumbnailWriter
//! ```

pub mod crop_planner;
pub mod detection_adapter;
pub mod detector;
pub mod error;
pub mod frame_converter;
pub mod mapping;
pub mod metrics;
pub mod overlay;
pub mod thumbnail;
pub mod upright;

#[cfg(feature = "rustface")]
pub mod rustface_backend;
#[cfg(feature = "opencv")]
pub mod yunet;

pub use crop_planner::{CropPlanner, DEFAULT_MIN_EYE_DISTANCE};
pub use detection_adapter::{FaceDetectorAdapter, DEFAULT_MAX_FACES};
pub use detector::{create_detector, DetectorKind, FaceDetector};
pub use error::{MediaError, MediaResult};
pub use frame_converter::FrameConverter;
pub use mapping::{CoordinateMapper, ScaleFactors};
pub use overlay::{
    DrawMode, DrawSurface, ImageCanvas, OverlayPhase, OverlayRenderer, OverlaySnapshot,
    OverlayState,
};
pub use thumbnail::{ThumbnailOutcome, ThumbnailWriter};
pub use upright::UprightImage;
