//! Overlay redraw state machine.
//!
//! ```text
//!            faces                  redraw (draws, stays)
//!   Empty ───────────▶ Active ◀──────────┐
//!     ▲                  │  └────────────┘
//!     │ redraw           │ no faces / pause / resume
//!     │ (blank once)     ▼
//!     └────────── PendingClear ──faces──▶ Active
//! ```
//!
//! A clear is consumed by exactly one redraw and is never re-armed
//! implicitly. Faces arriving before that redraw supersede the clear.

use facecam_models::ViewRect;
use std::sync::Arc;

/// Observable phase of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Empty,
    Active,
    PendingClear,
}

/// Immutable view of what one redraw should do.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    /// Rectangles to draw, in detector order
    pub rects: Arc<[ViewRect]>,
    /// Blank the surface instead of drawing
    pub clear: bool,
}

impl OverlaySnapshot {
    fn clear() -> Self {
        Self {
            rects: Arc::from(Vec::new()),
            clear: true,
        }
    }
}

/// Current overlay content, owned by the render thread.
#[derive(Debug, Clone)]
pub struct OverlayState {
    rects: Arc<[ViewRect]>,
    pending_clear: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            rects: Arc::from(Vec::new()),
            pending_clear: false,
        }
    }
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.pending_clear {
            OverlayPhase::PendingClear
        } else if self.rects.is_empty() {
            OverlayPhase::Empty
        } else {
            OverlayPhase::Active
        }
    }

    /// Replace the rectangles with the result of a detection cycle.
    ///
    /// An empty result is a "no face" signal and requests a clear.
    pub fn set_faces(&mut self, rects: Vec<ViewRect>) {
        if rects.is_empty() {
            self.request_clear();
            return;
        }
        self.rects = Arc::from(rects);
        self.pending_clear = false;
    }

    /// Drop the rectangles and request one blank redraw.
    pub fn request_clear(&mut self) {
        self.rects = Arc::from(Vec::new());
        self.pending_clear = true;
    }

    /// Current rectangles.
    pub fn rects(&self) -> &[ViewRect] {
        &self.rects
    }

    /// Take the snapshot for one redraw, advancing the state machine.
    ///
    /// Returns `None` when there is nothing to do (Empty).
    pub fn snapshot_for_redraw(&mut self) -> Option<OverlaySnapshot> {
        match self.phase() {
            OverlayPhase::Empty => None,
            OverlayPhase::PendingClear => {
                self.pending_clear = false;
                Some(OverlaySnapshot::clear())
            }
            OverlayPhase::Active => Some(OverlaySnapshot {
                rects: Arc::clone(&self.rects),
                clear: false,
            }),
        }
    }
}
