//! Bounded-count detection over upright images.
//!
//! The adapter owns a backend and enforces the output contract the rest of
//! the pipeline relies on:
//! - at most `max_faces` records, in detector order
//! - no records with non-finite geometry
//! - eye distance never negative
//!
//! Zero faces is an empty vector, never an error.

use crate::detector::FaceDetector;
use crate::error::MediaResult;
use crate::upright::UprightImage;
use facecam_models::FaceRecord;
use tracing::{debug, trace};

/// Default number of faces reported per frame.
pub const DEFAULT_MAX_FACES: usize = 3;

pub struct FaceDetectorAdapter {
    detector: Box<dyn FaceDetector>,
    max_faces: usize,
}

impl FaceDetectorAdapter {
    pub fn new(detector: Box<dyn FaceDetector>, max_faces: usize) -> Self {
        Self { detector, max_faces }
    }

    /// Maximum faces reported per frame.
    pub fn max_faces(&self) -> usize {
        self.max_faces
    }

    /// Backend name.
    pub fn backend(&self) -> &'static str {
        self.detector.name()
    }

    /// Detect faces in an upright image.
    pub fn detect(&mut self, image: &UprightImage) -> MediaResult<Vec<FaceRecord>> {
        if self.max_faces == 0 {
            return Ok(Vec::new());
        }

        let raw = self.detector.detect(image, self.max_faces)?;
        let raw_count = raw.len();

        let faces: Vec<FaceRecord> = raw
            .into_iter()
            .filter(|face| {
                let ok = face.is_finite();
                if !ok {
                    trace!(?face, "Discarding non-finite face record");
                }
                ok
            })
            .take(self.max_faces)
            .map(|mut face| {
                face.eyes_distance = face.eyes_distance.max(0.0);
                face
            })
            .collect();

        debug!(
            backend = self.detector.name(),
            raw = raw_count,
            kept = faces.len(),
            "Detection complete"
        );
        Ok(faces)
    }
}
