//! Per-frame processing.
//!
//! One call to [`FramePipeline::process`] runs the whole chain for a frame:
//! convert, detect, publish the overlay update, and persist a thumbnail of
//! the first face when it is large enough.

use std::time::Instant;

use facecam_media::{
    metrics, CropPlanner, FaceDetector, FaceDetectorAdapter, FrameConverter, ScaleFactors,
    ThumbnailOutcome, ThumbnailWriter,
};
use facecam_models::{CropRegion, FaceRecord, Frame};
use tracing::{debug, info};

use crate::config::FacecamConfig;
use crate::error::WorkerResult;
use crate::overlay_view::OverlayHandle;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub seq: u64,
    /// Upright image (width, height)
    pub image_size: (u32, u32),
    pub faces: Vec<FaceRecord>,
    pub crop: Option<CropRegion>,
    /// `None` when no crop was planned or persistence is disabled
    pub thumbnail: Option<ThumbnailOutcome>,
}

/// Converter, detector, crop planner and thumbnail writer for one stream.
pub struct FramePipeline {
    converter: FrameConverter,
    detector: FaceDetectorAdapter,
    planner: CropPlanner,
    thumbnails: Option<ThumbnailWriter>,
    view_size: (u32, u32),
    overlay: OverlayHandle,
}

impl FramePipeline {
    pub fn new(
        detector: FaceDetectorAdapter,
        planner: CropPlanner,
        view_size: (u32, u32),
        overlay: OverlayHandle,
    ) -> Self {
        Self {
            converter: FrameConverter::new(),
            detector,
            planner,
            thumbnails: None,
            view_size,
            overlay,
        }
    }

    /// Build a pipeline from configuration around an already created backend.
    pub fn from_config(
        config: &FacecamConfig,
        backend: Box<dyn FaceDetector>,
        overlay: OverlayHandle,
    ) -> Self {
        let detector = FaceDetectorAdapter::new(backend, config.max_faces);
        let planner = CropPlanner::new(config.min_eye_distance);
        let pipeline = Self::new(detector, planner, config.view_size(), overlay);
        match &config.thumbnail_path {
            Some(path) => pipeline.with_thumbnails(
                ThumbnailWriter::new(path).with_min_interval(config.thumbnail_interval),
            ),
            None => pipeline,
        }
    }

    pub fn with_thumbnails(mut self, writer: ThumbnailWriter) -> Self {
        self.thumbnails = Some(writer);
        self
    }

    /// Process one frame.
    ///
    /// Decode and detection failures abort this frame only; the overlay is
    /// left as it was. Thumbnail failures are logged and do not fail the frame.
    pub fn process(&mut self, frame: &Frame) -> WorkerResult<FrameReport> {
        let started = Instant::now();

        let image = self.converter.convert(frame)?;
        let (width, height) = image.dims();
        let faces = self.detector.detect(&image)?;

        if faces.is_empty() {
            self.overlay.clear();
        } else {
            let scale = ScaleFactors::between(self.view_size, (width, height)).unwrap_or_default();
            self.overlay.update_faces(faces.clone(), scale.x, scale.y);
        }

        let crop = self.planner.plan_first(&faces, width, height);
        let thumbnail = match (crop, self.thumbnails.as_mut()) {
            (Some(region), Some(writer)) => writer.write(&image, &region).ok(),
            _ => None,
        };

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::record_frame_processed(faces.len(), latency_ms);
        debug!(
            seq = frame.seq,
            faces = faces.len(),
            crop = ?crop,
            latency_ms,
            "Frame processed"
        );

        Ok(FrameReport {
            seq: frame.seq,
            image_size: (width, height),
            faces,
            crop,
            thumbnail,
        })
    }

    /// Log pipeline statistics.
    pub fn log_stats(&self) {
        self.converter.log_stats();
        info!(
            backend = self.detector.backend(),
            max_faces = self.detector.max_faces(),
            "Detector stats"
        );
    }

    pub fn converter(&self) -> &FrameConverter {
        &self.converter
    }
}
