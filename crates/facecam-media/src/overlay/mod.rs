//! Overlay state and rendering.
//!
//! - [`state`]: the Empty / Active / PendingClear state machine
//! - [`renderer`]: turns a snapshot into draw calls (full rect or corner brackets)
//! - [`canvas`]: an in-memory RGBA [`DrawSurface`] backed by `imageproc`

pub mod canvas;
pub mod renderer;
pub mod state;

pub use canvas::ImageCanvas;
pub use renderer::{
    bracket_segments, stroke_width_for, DrawMode, DrawModeParseError, DrawSurface, OverlayRenderer,
    Segment,
};
pub use state::{OverlayPhase, OverlaySnapshot, OverlayState};
