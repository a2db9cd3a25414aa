//! Shared helpers for worker integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use facecam_media::detector::face_from_eyes;
use facecam_media::overlay::Segment;
use facecam_media::{DrawSurface, FaceDetector, MediaResult, UprightImage};
use facecam_models::{FaceRecord, Frame, PixelFormat, Rotation, ViewRect};
use facecam_worker::ReleaseFn;

pub const MARKER: [u8; 3] = [255, 0, 0];

/// Finds pure-red marker pixels and treats the left and right clusters as eyes.
pub struct MarkerDetector;

impl FaceDetector for MarkerDetector {
    fn detect(&mut self, image: &UprightImage, max_faces: usize) -> MediaResult<Vec<FaceRecord>> {
        let mut points = Vec::new();
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.pixel(x, y) == Some(MARKER) {
                    points.push((x as f32, y as f32));
                }
            }
        }
        if points.len() < 2 || max_faces == 0 {
            return Ok(Vec::new());
        }

        let mean_x = points.iter().map(|p| p.0).sum::<f32>() / points.len() as f32;
        let centroid = |side: &[(f32, f32)]| {
            let n = side.len() as f32;
            (
                side.iter().map(|p| p.0).sum::<f32>() / n,
                side.iter().map(|p| p.1).sum::<f32>() / n,
            )
        };
        let (left, right): (Vec<(f32, f32)>, Vec<(f32, f32)>) =
            points.iter().copied().partition(|p| p.0 < mean_x);
        Ok(vec![face_from_eyes(centroid(&left), centroid(&right), 1.0)])
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

/// Returns pre-scripted results, one per call, then no faces.
pub struct ScriptedDetector {
    script: VecDeque<Vec<FaceRecord>>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<FaceRecord>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, _image: &UprightImage, max_faces: usize) -> MediaResult<Vec<FaceRecord>> {
        let mut faces = self.script.pop_front().unwrap_or_default();
        faces.truncate(max_faces);
        Ok(faces)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Panics on its first call, then reports no faces.
#[derive(Default)]
pub struct PanicOnceDetector {
    calls: usize,
}

impl FaceDetector for PanicOnceDetector {
    fn detect(&mut self, _image: &UprightImage, _max_faces: usize) -> MediaResult<Vec<FaceRecord>> {
        self.calls += 1;
        if self.calls == 1 {
            panic!("detector crashed on frame");
        }
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "panic-once"
    }
}

/// Draw surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub clears: usize,
    pub lines: Vec<(Segment, f32)>,
    pub rects: Vec<(ViewRect, f32)>,
}

impl RecordingSurface {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw_line(&mut self, segment: Segment, stroke_width: f32) {
        self.lines.push((segment, stroke_width));
    }

    fn draw_rect(&mut self, rect: &ViewRect, stroke_width: f32) {
        self.rects.push((*rect, stroke_width));
    }
}

/// Black RGB frame with marker pixels at the given points.
pub fn marker_frame(seq: u64, width: u32, height: u32, eyes: &[(u32, u32)]) -> Frame {
    let mut data = vec![0u8; (width * height * 3) as usize];
    for (x, y) in eyes {
        let idx = ((y * width + x) * 3) as usize;
        data[idx..idx + 3].copy_from_slice(&MARKER);
    }
    Frame::new(seq, data, width, height, PixelFormat::Rgb888, Rotation::Deg0)
}

/// Plain grey frame.
pub fn blank_frame(seq: u64) -> Frame {
    Frame::new(seq, vec![40; 16 * 16 * 3], 16, 16, PixelFormat::Rgb888, Rotation::Deg0)
}

/// Release callback recording sequence numbers.
pub fn release_recorder() -> (ReleaseFn, Arc<Mutex<Vec<u64>>>) {
    let released = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&released);
    let release: ReleaseFn = Arc::new(move |seq| sink.lock().unwrap().push(seq));
    (release, released)
}
