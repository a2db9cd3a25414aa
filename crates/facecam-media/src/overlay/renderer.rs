//! Overlay rendering.
//!
//! Each rectangle is drawn either as a closed stroked rectangle or as four
//! corner brackets. Brackets sit outside the face rectangle, pushed out by a
//! quarter of its height, with arms of the same length. The stroke width is
//! a twelfth of the arm length, but never thinner than 2 px, in both modes.

use super::state::OverlaySnapshot;
use facecam_models::ViewRect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum stroke width in view pixels.
pub const MIN_STROKE_WIDTH: f32 = 2.0;

/// How each face rectangle is decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Four corner brackets around the face.
    #[default]
    Brackets,

    /// A closed stroked rectangle.
    Rect,
}

impl DrawMode {
    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawMode::Brackets => "brackets",
            DrawMode::Rect => "rect",
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DrawMode {
    type Err = DrawModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brackets" | "bracket" | "corners" => Ok(DrawMode::Brackets),
            "rect" | "rectangle" | "box" => Ok(DrawMode::Rect),
            _ => Err(DrawModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown draw mode: {0}")]
pub struct DrawModeParseError(String);

/// A straight line segment in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl Segment {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self { start, end }
    }
}

/// Target for overlay draw calls.
#[cfg_attr(test, mockall::automock)]
pub trait DrawSurface {
    /// Width of the surface in view pixels.
    fn width(&self) -> f32;

    /// Blank the whole surface.
    fn clear(&mut self);

    /// Stroke a line segment.
    fn draw_line(&mut self, segment: Segment, stroke_width: f32);

    /// Stroke a closed rectangle outline.
    fn draw_rect(&mut self, rect: &ViewRect, stroke_width: f32);
}

/// Stroke width used for a rectangle of the given view-space height.
pub fn stroke_width_for(rect: &ViewRect) -> f32 {
    let len = rect.height() / 4.0;
    let width = len / 12.0;
    if width >= MIN_STROKE_WIDTH {
        width
    } else {
        MIN_STROKE_WIDTH
    }
}

/// The eight segments forming four corner brackets around `rect`.
///
/// Order: bottom-left (vertical, horizontal), bottom-right, top-left,
/// top-right. Horizontal arms start half a stroke further out so the
/// corners close.
pub fn bracket_segments(rect: &ViewRect, stroke_width: f32) -> [Segment; 8] {
    let len = rect.height() / 4.0;
    let left = rect.left - len;
    let top = rect.top - len;
    let right = rect.right + len;
    let bottom = rect.bottom + len;
    let overlap = stroke_width / 2.0;

    [
        Segment::new((left, bottom), (left, bottom - len)),
        Segment::new((left - overlap, bottom), (left + len, bottom)),
        Segment::new((right, bottom), (right, bottom - len)),
        Segment::new((right + overlap, bottom), (right - len, bottom)),
        Segment::new((left, top), (left, top + len)),
        Segment::new((left - overlap, top), (left + len, top)),
        Segment::new((right, top), (right, top + len)),
        Segment::new((right + overlap, top), (right - len, top)),
    ]
}

/// Draws overlay snapshots onto a [`DrawSurface`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRenderer {
    mode: DrawMode,
}

impl OverlayRenderer {
    pub fn new(mode: DrawMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Render one snapshot.
    ///
    /// A clearing snapshot blanks the surface; otherwise rectangles are drawn
    /// on top of whatever the host prepared.
    pub fn render(&self, snapshot: &OverlaySnapshot, surface: &mut dyn DrawSurface) {
        if snapshot.clear {
            surface.clear();
            return;
        }

        for rect in snapshot.rects.iter() {
            let stroke = stroke_width_for(rect);
            match self.mode {
                DrawMode::Rect => surface.draw_rect(rect, stroke),
                DrawMode::Brackets => {
                    for segment in bracket_segments(rect, stroke) {
                        surface.draw_line(segment, stroke);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(rects: Vec<ViewRect>, clear: bool) -> OverlaySnapshot {
        OverlaySnapshot {
            rects: Arc::from(rects),
            clear,
        }
    }

    #[test]
    fn test_stroke_width() {
        // height 96 -> len 24 -> 24 / 12 = 2
        assert_eq!(stroke_width_for(&ViewRect::new(0.0, 0.0, 96.0, 96.0)), 2.0);
        // height 480 -> len 120 -> 10
        assert_eq!(stroke_width_for(&ViewRect::new(0.0, 0.0, 480.0, 480.0)), 10.0);
        // small faces are clamped
        assert_eq!(stroke_width_for(&ViewRect::new(0.0, 0.0, 40.0, 40.0)), 2.0);
    }

    #[test]
    fn test_bracket_segments() {
        // height 40 -> len 10, stroke 2 -> overlap 1
        let rect = ViewRect::new(80.0, 80.0, 120.0, 120.0);
        let segments = bracket_segments(&rect, 2.0);

        assert_eq!(segments[0], Segment::new((70.0, 130.0), (70.0, 120.0)));
        assert_eq!(segments[1], Segment::new((69.0, 130.0), (80.0, 130.0)));
        assert_eq!(segments[2], Segment::new((130.0, 130.0), (130.0, 120.0)));
        assert_eq!(segments[3], Segment::new((131.0, 130.0), (120.0, 130.0)));
        assert_eq!(segments[4], Segment::new((70.0, 70.0), (70.0, 80.0)));
        assert_eq!(segments[5], Segment::new((69.0, 70.0), (80.0, 70.0)));
        assert_eq!(segments[6], Segment::new((130.0, 70.0), (130.0, 80.0)));
        assert_eq!(segments[7], Segment::new((131.0, 70.0), (120.0, 70.0)));

        for segment in segments {
            let axis_aligned = segment.start.0 == segment.end.0 || segment.start.1 == segment.end.1;
            assert!(axis_aligned, "{:?}", segment);
        }
    }

    #[test]
    fn test_brackets_draw_eight_lines_per_rect() {
        let mut surface = MockDrawSurface::new();
        surface.expect_draw_line().times(16).return_const(());
        surface.expect_draw_rect().never();
        surface.expect_clear().never();

        let rects = vec![
            ViewRect::new(0.0, 0.0, 40.0, 40.0),
            ViewRect::new(100.0, 100.0, 140.0, 140.0),
        ];
        OverlayRenderer::new(DrawMode::Brackets).render(&snapshot(rects, false), &mut surface);
    }

    #[test]
    fn test_rect_mode_draws_rects() {
        let mut surface = MockDrawSurface::new();
        surface
            .expect_draw_rect()
            .withf(|rect, stroke| rect.left == 180.0 && *stroke == 2.0)
            .times(1)
            .return_const(());
        surface.expect_draw_line().never();

        let rects = vec![ViewRect::new(180.0, 80.0, 220.0, 120.0)];
        OverlayRenderer::new(DrawMode::Rect).render(&snapshot(rects, false), &mut surface);
    }

    #[test]
    fn test_clear_snapshot_only_clears() {
        let mut surface = MockDrawSurface::new();
        surface.expect_clear().times(1).return_const(());
        surface.expect_draw_line().never();
        surface.expect_draw_rect().never();

        OverlayRenderer::default().render(&snapshot(Vec::new(), true), &mut surface);
    }

    #[test]
    fn test_draw_mode_parse() {
        assert_eq!("brackets".parse::<DrawMode>().unwrap(), DrawMode::Brackets);
        assert_eq!("RECT".parse::<DrawMode>().unwrap(), DrawMode::Rect);
        assert!("circle".parse::<DrawMode>().is_err());
        assert_eq!(DrawMode::default(), DrawMode::Brackets);
    }
}
