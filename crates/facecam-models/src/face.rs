//! Detector-space face records.

use serde::{Deserialize, Serialize};

/// A face found by the detector, in upright-image pixel coordinates.
///
/// The detector reports the point midway between the eyes and the distance
/// between them; everything downstream (overlay size, crop size) is scaled
/// from the eye distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    /// X coordinate of the point between the eyes
    pub mid_x: f32,
    /// Y coordinate of the point between the eyes
    pub mid_y: f32,
    /// Distance between the eyes in pixels (>= 0)
    pub eyes_distance: f32,
    /// Detector confidence score
    pub confidence: f32,
}

impl FaceRecord {
    /// Create a new face record.
    pub fn new(mid_x: f32, mid_y: f32, eyes_distance: f32, confidence: f32) -> Self {
        Self {
            mid_x,
            mid_y,
            eyes_distance,
            confidence,
        }
    }

    /// Midpoint between the eyes.
    #[inline]
    pub fn midpoint(&self) -> (f32, f32) {
        (self.mid_x, self.mid_y)
    }

    /// True when every geometric field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.mid_x.is_finite() && self.mid_y.is_finite() && self.eyes_distance.is_finite()
    }
}
