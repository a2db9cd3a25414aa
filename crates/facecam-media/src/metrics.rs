//! Pipeline metrics collection.
//!
//! Provides standardized metrics for monitoring the frame pipeline:
//! - Frame counters (processed, dropped by backpressure, failed to decode, panicked)
//! - Faces detected per frame
//! - Thumbnail write outcomes
//! - End-to-end pipeline latency

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Frames that went through the full pipeline.
    pub const FRAMES_PROCESSED_TOTAL: &str = "facecam_frames_processed_total";

    /// Frames replaced in the latest-frame slot before being picked up.
    pub const FRAMES_DROPPED_TOTAL: &str = "facecam_frames_dropped_total";

    /// Frames whose buffer could not be decoded, by pixel format.
    pub const DECODE_FAILURES_TOTAL: &str = "facecam_decode_failures_total";

    /// Faces reported per processed frame.
    pub const FACES_DETECTED: &str = "facecam_faces_detected";

    /// Frames whose processing panicked.
    pub const FRAMES_PANICKED_TOTAL: &str = "facecam_frames_panicked_total";

    /// Thumbnail writes by outcome.
    pub const THUMBNAILS_TOTAL: &str = "facecam_thumbnails_total";

    /// Pipeline latency in seconds, from pickup to overlay update.
    pub const PIPELINE_LATENCY_SECONDS: &str = "facecam_pipeline_latency_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a frame that completed the pipeline.
pub fn record_frame_processed(faces: usize, latency_ms: f64) {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
    histogram!(names::FACES_DETECTED).record(faces as f64);
    histogram!(names::PIPELINE_LATENCY_SECONDS).record(latency_ms / 1000.0);
}

/// Record a frame dropped by the latest-frame policy.
pub fn record_frame_dropped() {
    counter!(names::FRAMES_DROPPED_TOTAL).increment(1);
}

/// Record a frame that failed to decode.
pub fn record_decode_failure(format: &str) {
    counter!(
        names::DECODE_FAILURES_TOTAL,
        "format" => format.to_string()
    )
    .increment(1);
}

/// Record a frame whose processing panicked.
pub fn record_frame_panicked() {
    counter!(names::FRAMES_PANICKED_TOTAL).increment(1);
}

/// Record the outcome of a thumbnail write.
pub fn record_thumbnail(success: bool) {
    let status = if success { "written" } else { "failed" };
    counter!(names::THUMBNAILS_TOTAL, "status" => status).increment(1);
}

// =============================================================================
// Tests
// =============================================================================
