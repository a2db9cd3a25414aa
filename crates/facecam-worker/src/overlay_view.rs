//! Worker to render-thread overlay handoff.
//!
//! The detection worker holds an [`OverlayHandle`] and pushes
//! [`OverlayUpdate`]s; the render thread owns the matching [`OverlayView`] and
//! drains them once per redraw tick. The view is the only place overlay
//! state is mutated.
//!
//! # Usage
//! ```rust,ignore
//! let (handle, mut view) = overlay_channel(OverlayViewSettings::default());
//! handle.update_faces(faces, scale_x, scale_y); // worker thread
//! view.tick(&mut canvas);                       // render thread
//! ```

use facecam_media::{
    CoordinateMapper, DrawMode, DrawSurface, OverlayPhase, OverlayRenderer, OverlayState,
    ScaleFactors,
};
use facecam_models::FaceRecord;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

/// Updates buffered between render ticks before new ones are dropped.
pub const OVERLAY_CHANNEL_CAPACITY: usize = 32;

/// Message from the worker to the render thread.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayUpdate {
    /// Faces found in the latest frame, in detector space.
    Faces {
        records: Vec<FaceRecord>,
        scale: ScaleFactors,
    },
    /// No face in the latest frame.
    Clear,
}

/// Worker-side sender. Cheap to clone; every call is fire-and-forget and
/// never blocks the worker.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: mpsc::Sender<OverlayUpdate>,
}

impl OverlayHandle {
    /// Publish faces with the image-to-view scale factors.
    pub fn update_faces(&self, records: Vec<FaceRecord>, scale_x: f32, scale_y: f32) {
        self.send(OverlayUpdate::Faces {
            records,
            scale: ScaleFactors::new(scale_x, scale_y),
        });
    }

    /// Ask the view to blank itself on its next redraw.
    pub fn clear(&self) {
        self.send(OverlayUpdate::Clear);
    }

    /// True once the view has been detached or dropped.
    pub fn is_detached(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, update: OverlayUpdate) {
        match self.tx.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!("Overlay render thread behind, dropping update");
            }
            Err(TrySendError::Closed(_)) => {
                trace!("Overlay view detached, discarding update");
            }
        }
    }
}

/// Render-side settings.
#[derive(Debug, Clone, Copy)]
pub struct OverlayViewSettings {
    pub mirror: bool,
    pub draw_mode: DrawMode,
}

impl Default for OverlayViewSettings {
    fn default() -> Self {
        Self {
            mirror: true,
            draw_mode: DrawMode::Brackets,
        }
    }
}

/// Render-thread owner of the overlay state.
#[derive(Debug)]
pub struct OverlayView {
    state: OverlayState,
    renderer: OverlayRenderer,
    mirror: bool,
    rx: Option<mpsc::Receiver<OverlayUpdate>>,
}

/// Create a connected handle and view.
pub fn overlay_channel(settings: OverlayViewSettings) -> (OverlayHandle, OverlayView) {
    let (tx, rx) = mpsc::channel(OVERLAY_CHANNEL_CAPACITY);
    let view = OverlayView {
        state: OverlayState::new(),
        renderer: OverlayRenderer::new(settings.draw_mode),
        mirror: settings.mirror,
        rx: Some(rx),
    };
    (OverlayHandle { tx }, view)
}

impl OverlayView {
    pub fn phase(&self) -> OverlayPhase {
        self.state.phase()
    }

    pub fn is_attached(&self) -> bool {
        self.rx.is_some()
    }

    /// Lifecycle pause: request one blank redraw.
    pub fn on_pause(&mut self) {
        self.state.request_clear();
    }

    /// Lifecycle resume: request one blank redraw.
    pub fn on_resume(&mut self) {
        self.state.request_clear();
    }

    /// Detach from the window. Later updates are discarded and ticks do nothing.
    pub fn detach(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            debug!("Overlay view detached");
        }
    }

    /// One redraw: apply pending updates in order, then draw.
    ///
    /// Returns `true` if anything was drawn or cleared.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };

        let canvas_width = surface.width();
        while let Ok(update) = rx.try_recv() {
            Self::apply(&mut self.state, self.mirror, canvas_width, update);
        }

        match self.state.snapshot_for_redraw() {
            Some(snapshot) => {
                self.renderer.render(&snapshot, surface);
                true
            }
            None => false,
        }
    }

    fn apply(state: &mut OverlayState, mirror: bool, canvas_width: f32, update: OverlayUpdate) {
        match update {
            OverlayUpdate::Faces { records, scale } => {
                let mut mapper = CoordinateMapper::new(scale);
                if mirror {
                    mapper = mapper.with_mirror(canvas_width);
                }
                state.set_faces(mapper.map_all(&records));
            }
            OverlayUpdate::Clear => state.request_clear(),
        }
    }
}
