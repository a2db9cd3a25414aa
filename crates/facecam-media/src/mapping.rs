//! Coordinate Mapping from detector space to view space
//!
//! Detection runs on the upright image; the overlay is drawn on the preview
//! view, which generally has a different size. A face record maps to a view
//! rectangle by:
//!
//! 1. Taking the square of half-side `eyes_distance` around the eye midpoint
//! 2. Scaling each axis independently (`view / image`)
//! 3. Optionally reflecting horizontally across the canvas (front camera)
//!
//! Mirroring happens in view space, after scaling.
//!
//! # Usage
//! ```rust,ignore
//! use facecam_media::mapping::{CoordinateMapper, ScaleFactors};
//!
//! let scale = ScaleFactors::between((1080, 1920), (480, 640)).unwrap();
//! let mapper = CoordinateMapper::new(scale).with_mirror(1080.0);
//! let rects = mapper.map_all(&faces);
//! ```

use facecam_models::{FaceRecord, ViewRect};

/// Independent per-axis scale from image space to view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// No scaling.
    pub fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Scale factors mapping an image of `image` size onto a view of `view`
    /// size, both as (width, height).
    ///
    /// Returns `None` when either image dimension is zero.
    pub fn between(view: (u32, u32), image: (u32, u32)) -> Option<Self> {
        if image.0 == 0 || image.1 == 0 {
            return None;
        }
        Some(Self::new(
            view.0 as f32 / image.0 as f32,
            view.1 as f32 / image.1 as f32,
        ))
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::identity()
    }
}

/// Maps face records to view rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale: ScaleFactors,
    /// Canvas width to mirror across, `None` for no mirroring
    mirror_width: Option<f32>,
}

impl CoordinateMapper {
    pub fn new(scale: ScaleFactors) -> Self {
        Self {
            scale,
            mirror_width: None,
        }
    }

    /// Reflect results horizontally across a canvas of the given width.
    pub fn with_mirror(mut self, canvas_width: f32) -> Self {
        self.mirror_width = Some(canvas_width);
        self
    }

    pub fn scale(&self) -> ScaleFactors {
        self.scale
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror_width.is_some()
    }

    /// Map one face record.
    pub fn map(&self, face: &FaceRecord) -> ViewRect {
        let half = face.eyes_distance;
        let rect = ViewRect::new(
            (face.mid_x - half) * self.scale.x,
            (face.mid_y - half) * self.scale.y,
            (face.mid_x + half) * self.scale.x,
            (face.mid_y + half) * self.scale.y,
        );

        match self.mirror_width {
            Some(width) => rect.mirrored(width),
            None => rect,
        }
    }

    /// Map every record, preserving order.
    pub fn map_all(&self, faces: &[FaceRecord]) -> Vec<ViewRect> {
        faces.iter().map(|face| self.map(face)).collect()
    }
}
