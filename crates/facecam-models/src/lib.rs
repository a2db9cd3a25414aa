//! Shared data models for the facecam pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Captured frames and their pixel/rotation metadata
//! - Detector-space face records
//! - View-space rectangles and image-space crop regions

pub mod face;
pub mod frame;
pub mod rect;

// Re-export common types
pub use face::FaceRecord;
pub use frame::{Frame, PixelFormat, Rotation, RotationError};
pub use rect::{CropRegion, ViewRect};
