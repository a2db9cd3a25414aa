//! Latest-frame delivery with release tracking.
//!
//! The camera produces frames faster than detection can consume them. Only
//! the most recent undelivered frame is kept: submitting a new frame while
//! one is still waiting drops the waiting frame. Every frame carries a
//! [`ReleaseGuard`] that hands the frame back to the capture source exactly
//! once, whether it was processed, failed, or dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use facecam_media::metrics;
use facecam_models::Frame;
use tokio::sync::Notify;
use tracing::{debug, trace};

/// Callback returning a frame (by sequence number) to the capture source.
pub type ReleaseFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Calls the release callback when dropped.
pub struct ReleaseGuard {
    seq: u64,
    release: Option<ReleaseFn>,
}

impl ReleaseGuard {
    pub fn new(seq: u64, release: ReleaseFn) -> Self {
        Self {
            seq,
            release: Some(release),
        }
    }

    /// A guard with nothing to release.
    pub fn noop(seq: u64) -> Self {
        Self { seq, release: None }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            trace!(seq = self.seq, "Releasing frame");
            release(self.seq);
        }
    }
}

impl std::fmt::Debug for ReleaseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("seq", &self.seq)
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// A frame paired with its release guard.
#[derive(Debug)]
pub struct CapturedFrame {
    pub frame: Frame,
    guard: ReleaseGuard,
}

impl CapturedFrame {
    pub fn new(frame: Frame, guard: ReleaseGuard) -> Self {
        Self { frame, guard }
    }

    pub fn seq(&self) -> u64 {
        self.frame.seq
    }

    /// Split into the frame and the guard that releases it.
    pub fn into_parts(self) -> (Frame, ReleaseGuard) {
        (self.frame, self.guard)
    }
}

#[derive(Default)]
struct SlotInner {
    pending: Option<CapturedFrame>,
    closed: bool,
    dropped: u64,
}

/// Single-entry mailbox holding the newest undelivered frame.
#[derive(Default)]
pub struct LatestFrameSlot {
    inner: Mutex<SlotInner>,
    notify: Notify,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        // A panic while holding the lock leaves the slot consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a frame, dropping (and releasing) any frame still waiting.
    ///
    /// Returns `false` if the slot is closed; the frame is released at once.
    pub fn put(&self, captured: CapturedFrame) -> bool {
        let replaced = {
            let mut inner = self.lock();
            if inner.closed {
                drop(inner);
                debug!(seq = captured.seq(), "Slot closed, releasing frame");
                return false;
            }
            let replaced = inner.pending.replace(captured);
            if replaced.is_some() {
                inner.dropped += 1;
            }
            replaced
        };

        // Release outside the lock so callbacks may resubmit.
        if let Some(old) = replaced {
            metrics::record_frame_dropped();
            debug!(seq = old.seq(), "Dropping stale frame");
            drop(old);
        }
        self.notify.notify_one();
        true
    }

    /// Take the waiting frame, if any, without blocking.
    pub fn try_take(&self) -> Option<CapturedFrame> {
        self.lock().pending.take()
    }

    /// Wait for the next frame.
    ///
    /// Returns `None` once the slot is closed and empty.
    pub async fn take(&self) -> Option<CapturedFrame> {
        loop {
            {
                let mut inner = self.lock();
                if let Some(captured) = inner.pending.take() {
                    return Some(captured);
                }
                if inner.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Stop accepting frames and release any frame still waiting.
    pub fn close(&self) {
        let pending = {
            let mut inner = self.lock();
            inner.closed = true;
            inner.pending.take()
        };
        drop(pending);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Frames dropped because a newer frame replaced them.
    pub fn dropped_count(&self) -> u64 {
        self.lock().dropped
    }
}

/// Capture-side handle for handing frames to the worker.
#[derive(Clone)]
pub struct FrameSubmitter {
    slot: Arc<LatestFrameSlot>,
}

impl FrameSubmitter {
    pub fn new(slot: Arc<LatestFrameSlot>) -> Self {
        Self { slot }
    }

    /// Submit a frame; `release` is called exactly once for it.
    ///
    /// Returns `false` if the worker has shut down (the frame is released
    /// immediately).
    pub fn submit(&self, frame: Frame, release: ReleaseFn) -> bool {
        let guard = ReleaseGuard::new(frame.seq, release);
        self.slot.put(CapturedFrame::new(frame, guard))
    }

    /// Submit a frame the caller does not need back.
    pub fn submit_owned(&self, frame: Frame) -> bool {
        let guard = ReleaseGuard::noop(frame.seq);
        self.slot.put(CapturedFrame::new(frame, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecam_models::{PixelFormat, Rotation};

    fn frame(seq: u64) -> Frame {
        Frame::new(seq, vec![0; 3], 1, 1, PixelFormat::Rgb888, Rotation::Deg0)
    }

    fn recorder() -> (ReleaseFn, Arc<Mutex<Vec<u64>>>) {
        let released = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&released);
        let release: ReleaseFn = Arc::new(move |seq| sink.lock().unwrap().push(seq));
        (release, released)
    }

    #[test]
    fn test_replacement_releases_old_frame() {
        let slot = Arc::new(LatestFrameSlot::new());
        let submitter = FrameSubmitter::new(Arc::clone(&slot));
        let (release, released) = recorder();

        assert!(submitter.submit(frame(1), Arc::clone(&release)));
        assert!(submitter.submit(frame(2), Arc::clone(&release)));

        assert_eq!(*released.lock().unwrap(), vec![1]);
        assert_eq!(slot.dropped_count(), 1);

        let taken = slot.try_take().unwrap();
        assert_eq!(taken.seq(), 2);
        drop(taken);
        assert_eq!(*released.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_closed_slot_releases_immediately() {
        let slot = Arc::new(LatestFrameSlot::new());
        let submitter = FrameSubmitter::new(Arc::clone(&slot));
        let (release, released) = recorder();

        submitter.submit(frame(1), Arc::clone(&release));
        slot.close();
        assert_eq!(*released.lock().unwrap(), vec![1]);

        assert!(!submitter.submit(frame(2), release));
        assert_eq!(*released.lock().unwrap(), vec![1, 2]);
        assert!(slot.try_take().is_none());
    }

    #[tokio::test]
    async fn test_take_waits_for_frame() {
        let slot = Arc::new(LatestFrameSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.take().await.map(|c| c.seq()) })
        };

        tokio::task::yield_now().await;
        FrameSubmitter::new(Arc::clone(&slot)).submit_owned(frame(7));

        assert_eq!(waiter.await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_take_returns_none_after_close() {
        let slot = Arc::new(LatestFrameSlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.take().await.is_none() })
        };

        tokio::task::yield_now().await;
        slot.close();
        assert!(waiter.await.unwrap());
    }

    #[test]
    fn test_guard_releases_once() {
        let (release, released) = recorder();
        let guard = ReleaseGuard::new(5, release);
        assert_eq!(guard.seq(), 5);
        drop(guard);
        assert_eq!(*released.lock().unwrap(), vec![5]);
    }
}
