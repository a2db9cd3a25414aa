//! Latest-frame delivery through the detection worker.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{blank_frame, release_recorder, PanicOnceDetector, ScriptedDetector};
use facecam_media::{CropPlanner, FaceDetector, FaceDetectorAdapter};
use facecam_models::{Frame, PixelFormat, Rotation};
use facecam_worker::{
    overlay_channel, DetectionWorker, FrameOutcome, FramePipeline, OverlayView,
    OverlayViewSettings,
};

fn pipeline() -> (FramePipeline, OverlayView) {
    pipeline_with(Box::new(ScriptedDetector::new(Vec::new())))
}

fn pipeline_with(detector: Box<dyn FaceDetector>) -> (FramePipeline, OverlayView) {
    let (overlay, view) = overlay_channel(OverlayViewSettings::default());
    let detector = FaceDetectorAdapter::new(detector, 3);
    let pipeline = FramePipeline::new(detector, CropPlanner::default(), (16, 16), overlay);
    (pipeline, view)
}

async fn next_outcome(
    outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<FrameOutcome>,
) -> FrameOutcome {
    tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_only_latest_frame_is_processed() {
    let (pipeline, _view) = pipeline();
    let (worker, mut outcomes) = DetectionWorker::new().with_outcomes();
    let worker = Arc::new(worker);
    let submitter = worker.submitter();
    let (release, released) = release_recorder();

    // Both frames arrive before the worker picks anything up.
    submitter.submit(blank_frame(1), Arc::clone(&release));
    submitter.submit(blank_frame(2), Arc::clone(&release));
    assert_eq!(*released.lock().unwrap(), vec![1]);

    let task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(pipeline).await })
    };

    let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.seq(), 2);
    assert!(matches!(outcome, FrameOutcome::Processed(_)));

    worker.shutdown();
    let pipeline = task.await.unwrap().unwrap();

    assert_eq!(*released.lock().unwrap(), vec![1, 2]);
    assert_eq!(worker.dropped_frames(), 1);
    assert_eq!(pipeline.converter().frames_processed(), 1);
    assert!(outcomes.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_frame_is_released() {
    let (pipeline, mut view) = pipeline();
    let (worker, mut outcomes) = DetectionWorker::new().with_outcomes();
    let worker = Arc::new(worker);
    let (release, released) = release_recorder();

    let task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(pipeline).await })
    };

    let mut broken = blank_frame(9);
    broken.data.clear();
    worker.submitter().submit(broken, release);

    let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, FrameOutcome::Failed { seq: 9, .. }));
    assert_eq!(*released.lock().unwrap(), vec![9]);

    // a failed frame publishes nothing
    let mut surface = common::RecordingSurface::new(16.0);
    assert!(!view.tick(&mut surface));

    worker.shutdown();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_stream_continues_after_failed_frame() {
    let (pipeline, _view) = pipeline();
    let (worker, mut outcomes) = DetectionWorker::new().with_outcomes();
    let worker = Arc::new(worker);
    let submitter = worker.submitter();
    let (release, released) = release_recorder();

    let task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(pipeline).await })
    };

    let oversized = Frame::new(
        1,
        vec![0; 16],
        u32::MAX,
        u32::MAX,
        PixelFormat::Rgba8888,
        Rotation::Deg0,
    );
    submitter.submit(oversized, Arc::clone(&release));
    assert!(matches!(
        next_outcome(&mut outcomes).await,
        FrameOutcome::Failed { seq: 1, .. }
    ));

    submitter.submit(blank_frame(2), Arc::clone(&release));
    let outcome = next_outcome(&mut outcomes).await;
    assert!(matches!(outcome, FrameOutcome::Processed(_)));
    assert_eq!(outcome.seq(), 2);
    assert_eq!(*released.lock().unwrap(), vec![1, 2]);

    worker.shutdown();
    let pipeline = task.await.unwrap().unwrap();
    assert_eq!(pipeline.converter().frames_processed(), 1);
    assert_eq!(pipeline.converter().decode_failures(), 1);
}

#[tokio::test]
async fn test_stream_survives_detector_panic() {
    let (pipeline, _view) = pipeline_with(Box::new(PanicOnceDetector::default()));
    let (worker, mut outcomes) = DetectionWorker::new().with_outcomes();
    let worker = Arc::new(worker);
    let submitter = worker.submitter();
    let (release, released) = release_recorder();

    let task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(pipeline).await })
    };

    submitter.submit(blank_frame(1), Arc::clone(&release));
    match next_outcome(&mut outcomes).await {
        FrameOutcome::Failed { seq, error } => {
            assert_eq!(seq, 1);
            assert!(error.contains("detector crashed"), "{}", error);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(*released.lock().unwrap(), vec![1]);

    submitter.submit(blank_frame(2), Arc::clone(&release));
    let outcome = next_outcome(&mut outcomes).await;
    assert!(matches!(outcome, FrameOutcome::Processed(_)));
    assert_eq!(outcome.seq(), 2);
    assert_eq!(*released.lock().unwrap(), vec![1, 2]);

    worker.shutdown();
    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_shutdown_releases_waiting_frame() {
    let worker = DetectionWorker::new();
    let (release, released) = release_recorder();

    worker.submitter().submit(blank_frame(3), Arc::clone(&release));
    worker.shutdown();
    assert_eq!(*released.lock().unwrap(), vec![3]);

    // submissions after shutdown are released straight away
    assert!(!worker.submitter().submit(blank_frame(4), release));
    assert_eq!(*released.lock().unwrap(), vec![3, 4]);

    let (pipeline, _view) = pipeline();
    let pipeline = worker.run(pipeline).await.unwrap();
    assert_eq!(pipeline.converter().frames_processed(), 0);
}
