//! OpenCV YuNet face detector.
//!
//! YuNet is a lightweight CNN face detector exposed through OpenCV's
//! `FaceDetectorYN`. Each output row carries a box, five landmarks and a
//! score; only the eye landmarks and the score are used here.
//!
//! # Requirements
//! - OpenCV 4.5+ with the DNN module (2023mar models need 4.8+)

use crate::detector::{face_from_eyes, FaceDetector};
use crate::error::{MediaError, MediaResult};
use crate::upright::UprightImage;
use facecam_models::FaceRecord;
use opencv::core::{Mat, Ptr, Size};
use opencv::objdetect::FaceDetectorYN;
use opencv::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Score threshold for face detection.
const SCORE_THRESHOLD: f32 = 0.5;

/// NMS threshold for face detection
const NMS_THRESHOLD: f32 = 0.3;

/// Candidates kept before NMS
const TOP_K: i32 = 50;

/// Columns per output row:
/// [x, y, w, h, x_re, y_re, x_le, y_le, x_n, y_n, x_mr, y_mr, x_ml, y_ml, score]
const ROW_COLS: i32 = 15;

/// YuNet face detector using OpenCV.
pub struct YuNetDetector {
    detector: Ptr<FaceDetectorYN>,
    input_size: (i32, i32),
}

impl YuNetDetector {
    /// Load a YuNet ONNX model.
    pub fn new(model_path: &Path) -> MediaResult<Self> {
        use opencv::dnn::{DNN_BACKEND_DEFAULT, DNN_TARGET_CPU};

        let model = model_path.to_string_lossy().to_string();
        if !model_path.exists() {
            return Err(MediaError::model_not_found(model_path));
        }

        // Input size is replaced per frame in `detect`.
        let detector = FaceDetectorYN::create(
            &model,
            "",
            Size::new(320, 320),
            SCORE_THRESHOLD,
            NMS_THRESHOLD,
            TOP_K,
            DNN_BACKEND_DEFAULT,
            DNN_TARGET_CPU,
        )
        .map_err(|e| MediaError::detection_failed(format!("Failed to create YuNet detector: {}", e)))?;

        info!(model = %model, "YuNet detector initialized");

        Ok(Self {
            detector,
            input_size: (320, 320),
        })
    }

    fn to_bgr_mat(image: &UprightImage) -> MediaResult<Mat> {
        let rgb = image.to_rgb8();
        let flat = Mat::from_slice(rgb.as_raw())
            .map_err(|e| MediaError::detection_failed(format!("Mat from buffer: {}", e)))?;
        let shaped = flat
            .reshape(3, image.height() as i32)
            .map_err(|e| MediaError::detection_failed(format!("Mat reshape: {}", e)))?;

        let mut bgr = Mat::default();
        opencv::imgproc::cvt_color_def(&shaped, &mut bgr, opencv::imgproc::COLOR_RGB2BGR)
            .map_err(|e| MediaError::detection_failed(format!("Color convert: {}", e)))?;
        Ok(bgr)
    }

    /// Parse the YuNet output matrix into face records.
    fn parse_rows(faces: &Mat, max_faces: usize) -> Vec<FaceRecord> {
        let rows = faces.rows();
        if rows <= 0 {
            return Vec::new();
        }
        if faces.cols() < ROW_COLS {
            warn!("YuNet output has unexpected format: {} columns (expected {})", faces.cols(), ROW_COLS);
            return Vec::new();
        }

        let at = |row: i32, col: i32| faces.at_2d::<f32>(row, col).map(|v| *v).ok();

        let mut results = Vec::with_capacity((rows as usize).min(max_faces));
        for i in 0..rows {
            if results.len() >= max_faces {
                break;
            }
            let (Some(rx), Some(ry), Some(lx), Some(ly), Some(score)) =
                (at(i, 4), at(i, 5), at(i, 6), at(i, 7), at(i, 14))
            else {
                continue;
            };
            results.push(face_from_eyes((rx, ry), (lx, ly), score));
        }
        results
    }
}

impl FaceDetector for YuNetDetector {
    fn detect(&mut self, image: &UprightImage, max_faces: usize) -> MediaResult<Vec<FaceRecord>> {
        let (width, height) = (image.width() as i32, image.height() as i32);
        if width <= 0 || height <= 0 || max_faces == 0 {
            return Ok(Vec::new());
        }

        let bgr = Self::to_bgr_mat(image)?;
        if self.input_size != (width, height) {
            self.detector
                .set_input_size(Size::new(width, height))
                .map_err(|e| MediaError::detection_failed(format!("Set input size: {}", e)))?;
            self.input_size = (width, height);
        }

        let mut faces = Mat::default();
        self.detector
            .detect(&bgr, &mut faces)
            .map_err(|e| MediaError::detection_failed(format!("YuNet detection failed: {}", e)))?;

        let results = Self::parse_rows(&faces, max_faces);
        debug!("YuNet detected {} faces (from {} candidates)", results.len(), faces.rows());
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "yunet"
    }
}
