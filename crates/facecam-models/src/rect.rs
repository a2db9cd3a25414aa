use serde::{Deserialize, Serialize};

/// A rectangle in view (on-screen preview) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ViewRect {
    /// Create a new view rectangle.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Reflect horizontally across a canvas of the given width.
    ///
    /// Left and right are swapped as part of the reflection so that
    /// `right >= left` still holds afterwards.
    pub fn mirrored(&self, canvas_width: f32) -> Self {
        Self {
            left: canvas_width - self.right,
            top: self.top,
            right: canvas_width - self.left,
            bottom: self.bottom,
        }
    }

    /// Check that the edges are ordered (`right >= left`, `bottom >= top`).
    pub fn is_ordered(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }
}

/// A crop rectangle in upright-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Create a new crop region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check that the region is non-empty and lies inside an image.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }
}
