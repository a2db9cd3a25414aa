//! Runtime plumbing for the facecam pipeline.
//!
//! - [`frame_slot`]: latest-frame backpressure and frame release
//! - [`executor`]: the detection worker task
//! - [`pipeline`]: per-frame convert / detect / publish / persist
//! - [`overlay_view`]: worker to render-thread handoff
//! - [`config`], [`logging`], [`error`]: ambient setup

pub mod config;
pub mod error;
pub mod executor;
pub mod frame_slot;
pub mod logging;
pub mod overlay_view;
pub mod pipeline;

pub use config::FacecamConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{DetectionWorker, FrameOutcome};
pub use frame_slot::{CapturedFrame, FrameSubmitter, LatestFrameSlot, ReleaseFn, ReleaseGuard};
pub use logging::init_tracing;
pub use overlay_view::{
    overlay_channel, OverlayHandle, OverlayUpdate, OverlayView, OverlayViewSettings,
    OVERLAY_CHANNEL_CAPACITY,
};
pub use pipeline::{FramePipeline, FrameReport};
