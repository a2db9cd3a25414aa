//! In-memory RGBA draw surface.

use super::renderer::{DrawSurface, Segment};
use facecam_models::ViewRect;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Default decoration colour (opaque white).
pub const DEFAULT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A transparent RGBA overlay layer the renderer can draw on.
#[derive(Debug, Clone)]
pub struct ImageCanvas {
    image: RgbaImage,
    color: Rgba<u8>,
}

impl ImageCanvas {
    /// Transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, TRANSPARENT),
            color: DEFAULT_COLOR,
        }
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// True when every pixel is transparent.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// True if the pixel at (x, y) carries the decoration colour.
    pub fn is_painted(&self, x: u32, y: u32) -> bool {
        x < self.image.width() && y < self.image.height() && *self.image.get_pixel(x, y) == self.color
    }

    /// Fill an axis-aligned box spanning two corners, clipped to the canvas.
    fn fill_span(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let left = x0.min(x1).round() as i32;
        let top = y0.min(y1).round() as i32;
        let width = ((x0 - x1).abs().round() as u32).max(1);
        let height = ((y0 - y1).abs().round() as u32).max(1);
        draw_filled_rect_mut(&mut self.image, Rect::at(left, top).of_size(width, height), self.color);
    }
}

impl DrawSurface for ImageCanvas {
    fn width(&self) -> f32 {
        self.image.width() as f32
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    fn draw_line(&mut self, segment: Segment, stroke_width: f32) {
        let half = stroke_width / 2.0;
        let Segment { start, end } = segment;

        if start.0 == end.0 {
            self.fill_span(start.0 - half, start.1, start.0 + half, end.1);
        } else if start.1 == end.1 {
            self.fill_span(start.0, start.1 - half, end.0, start.1 + half);
        } else {
            // Thick diagonal: stack 1 px lines across the stroke.
            let steps = stroke_width.round().max(1.0) as i32;
            for i in 0..steps {
                let offset = i as f32 - half;
                draw_line_segment_mut(
                    &mut self.image,
                    (start.0 + offset, start.1),
                    (end.0 + offset, end.1),
                    self.color,
                );
            }
        }
    }

    fn draw_rect(&mut self, rect: &ViewRect, stroke_width: f32) {
        let corners = [
            (rect.left, rect.top),
            (rect.right, rect.top),
            (rect.right, rect.bottom),
            (rect.left, rect.bottom),
        ];
        for i in 0..corners.len() {
            let segment = Segment::new(corners[i], corners[(i + 1) % corners.len()]);
            self.draw_line(segment, stroke_width);
        }
    }
}
