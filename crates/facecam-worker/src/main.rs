//! Replay harness.
//!
//! Feeds the still images in `FACECAM_REPLAY_DIR` through the detection
//! worker as if they came from a camera, and writes the rendered overlay for
//! each frame next to the face thumbnail.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use facecam_media::{create_detector, ImageCanvas};
use facecam_models::Frame;
use facecam_worker::{
    init_tracing, overlay_channel, DetectionWorker, FacecamConfig, FrameOutcome, FramePipeline,
    OverlayViewSettings, ReleaseFn,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, error, info, warn};

const STILL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

fn list_stills(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut stills = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_still = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| STILL_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_still {
            stills.push(path);
        }
    }
    stills.sort();
    Ok(stills)
}

fn overlay_dir(config: &FacecamConfig) -> PathBuf {
    config
        .thumbnail_path
        .as_ref()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting facecam-replay");

    let config = FacecamConfig::from_env();
    config.validate()?;
    info!("Facecam config: {:?}", config);

    let prometheus = if config.metrics_enabled {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("installing Prometheus recorder")?,
        )
    } else {
        None
    };

    let stills = list_stills(&config.replay_dir)?;
    if stills.is_empty() {
        bail!("no stills found in {}", config.replay_dir.display());
    }

    let backend = create_detector(config.detector, &config.model_path)
        .with_context(|| format!("creating {} detector", config.detector))?;

    let (overlay, mut view) = overlay_channel(OverlayViewSettings {
        mirror: config.mirror,
        draw_mode: config.draw_mode,
    });
    let pipeline = FramePipeline::from_config(&config, backend, overlay);

    let (worker, mut outcomes) = DetectionWorker::new().with_outcomes();
    let worker = Arc::new(worker);
    let submitter = worker.submitter();
    let worker_task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(pipeline).await })
    };

    let release: ReleaseFn = Arc::new(|seq| debug!(seq, "Frame released"));
    let out_dir = overlay_dir(&config);
    std::fs::create_dir_all(&out_dir)?;

    for (index, path) in stills.iter().enumerate() {
        let seq = index as u64 + 1;
        let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        submitter.submit(Frame::encoded(seq, data, config.replay_rotation), Arc::clone(&release));

        // Replay waits for each frame so none is dropped.
        let outcome = tokio::select! {
            outcome = outcomes.recv() => outcome,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        };

        match outcome {
            Some(FrameOutcome::Processed(report)) => {
                info!(
                    file = %path.display(),
                    faces = report.faces.len(),
                    crop = ?report.crop,
                    "Frame replayed"
                );
            }
            Some(FrameOutcome::Failed { error, .. }) => {
                warn!(file = %path.display(), %error, "Frame failed");
                continue;
            }
            None => {
                error!("Worker stopped unexpectedly");
                break;
            }
        }

        let mut canvas = ImageCanvas::new(config.view_width, config.view_height);
        if view.tick(&mut canvas) {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("frame");
            let target = out_dir.join(format!("overlay_{}.png", stem));
            canvas
                .into_image()
                .save(&target)
                .with_context(|| format!("writing {}", target.display()))?;
        }
    }

    worker.shutdown();
    worker_task.await??;

    if let Some(handle) = prometheus {
        info!("Metrics:\n{}", handle.render());
    }

    info!("Replay complete");
    Ok(())
}
