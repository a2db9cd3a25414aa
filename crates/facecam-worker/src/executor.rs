//! Detection worker.
//!
//! Pulls the newest frame from the [`LatestFrameSlot`], runs the pipeline on
//! the blocking pool, and releases the frame. One frame is processed at a
//! time and a running frame is never cancelled; shutdown takes effect
//! between frames.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use facecam_media::metrics;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::error::{WorkerError, WorkerResult};
use crate::frame_slot::{FrameSubmitter, LatestFrameSlot};
use crate::pipeline::{FramePipeline, FrameReport};

/// Result of one frame, for observers.
#[derive(Debug)]
pub enum FrameOutcome {
    Processed(FrameReport),
    Failed { seq: u64, error: String },
}

impl FrameOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            FrameOutcome::Processed(report) => report.seq,
            FrameOutcome::Failed { seq, .. } => *seq,
        }
    }
}

/// Detection worker fed by a latest-frame slot.
pub struct DetectionWorker {
    slot: Arc<LatestFrameSlot>,
    shutdown: watch::Sender<bool>,
    outcomes: Option<mpsc::UnboundedSender<FrameOutcome>>,
}

impl Default for DetectionWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionWorker {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            slot: Arc::new(LatestFrameSlot::new()),
            shutdown,
            outcomes: None,
        }
    }

    /// Also report every frame outcome on a channel.
    pub fn with_outcomes(mut self) -> (Self, mpsc::UnboundedReceiver<FrameOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outcomes = Some(tx);
        (self, rx)
    }

    /// Capture-side handle.
    pub fn submitter(&self) -> FrameSubmitter {
        FrameSubmitter::new(Arc::clone(&self.slot))
    }

    /// Frames dropped by the latest-frame policy so far.
    pub fn dropped_frames(&self) -> u64 {
        self.slot.dropped_count()
    }

    /// Stop after the frame in progress, releasing any waiting frame.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        self.slot.close();
    }

    /// Run until shutdown. Returns the pipeline so callers can inspect it.
    pub async fn run(&self, pipeline: FramePipeline) -> WorkerResult<FramePipeline> {
        info!("Starting detection worker");

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut pipeline = pipeline;

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let captured = tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping worker");
                        break;
                    }
                    continue;
                }
                captured = self.slot.take() => match captured {
                    Some(captured) => captured,
                    None => break,
                },
            };

            let (frame, guard) = captured.into_parts();
            let seq = frame.seq;

            // A panic is confined to its frame: the guard still releases it
            // and the pipeline comes back for the next one.
            let joined = tokio::task::spawn_blocking(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline.process(&frame)));
                drop(guard);
                (pipeline, result)
            })
            .await;

            let (returned, result) = match joined {
                Ok(joined) => joined,
                Err(e) => {
                    self.slot.close();
                    return Err(WorkerError::task_failed(format!("frame {}: {}", seq, e)));
                }
            };
            pipeline = returned;

            let outcome = match result {
                Ok(Ok(report)) => FrameOutcome::Processed(report),
                Ok(Err(e)) => {
                    warn!(seq, error = %e, "Frame skipped");
                    FrameOutcome::Failed {
                        seq,
                        error: e.to_string(),
                    }
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(seq, panic = %message, "Frame processing panicked");
                    metrics::record_frame_panicked();
                    FrameOutcome::Failed {
                        seq,
                        error: format!("panicked: {}", message),
                    }
                }
            };
            if let Some(tx) = &self.outcomes {
                let _ = tx.send(outcome);
            }
        }

        // Frames submitted after the loop ends are released, not stranded.
        self.slot.close();
        info!(dropped = self.slot.dropped_count(), "Detection worker stopped");
        pipeline.log_stats();
        Ok(pipeline)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
