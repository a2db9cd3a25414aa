//! SeetaFace cascade detector via the `rustface` crate.

use crate::detector::{face_from_box, FaceDetector};
use crate::error::{MediaError, MediaResult};
use crate::upright::UprightImage;
use facecam_models::FaceRecord;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Face detector backed by `rustface`.
///
/// The model is loaded once; a cascade is built from it per frame since the
/// cascade itself is not `Send`.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file (`seeta_fd_frontal_v1.0.bin`).
    pub fn new(model_path: &Path) -> MediaResult<Self> {
        let file = File::open(model_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MediaError::model_not_found(model_path),
            _ => MediaError::Io(e),
        })?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| MediaError::detection_failed(format!("Invalid SeetaFace model: {}", e)))?;

        info!(model = %model_path.display(), "SeetaFace detector initialized");
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&mut self, image: &UprightImage, max_faces: usize) -> MediaResult<Vec<FaceRecord>> {
        if max_faces == 0 {
            return Ok(Vec::new());
        }

        let gray = image.to_luma8();
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), gray.width(), gray.height()));
        debug!("SeetaFace detected {} faces", faces.len());

        Ok(faces
            .iter()
            .take(max_faces)
            .map(|face| {
                let bbox = face.bbox();
                face_from_box(
                    bbox.x() as f32,
                    bbox.y() as f32,
                    bbox.width() as f32,
                    bbox.height() as f32,
                    face.score() as f32,
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "rustface"
    }
}
