//! Frame scheduling seam.
//!
//! An engine never drives its own loop. After each tick it asks its
//! [`Scheduler`] for the next frame and keeps the returned [`FrameHandle`];
//! stopping the engine cancels that handle. The host decides what "next
//! frame" means:
//!
//! - [`ManualScheduler`]: frames are delivered by hand, for tests and
//!   headless rendering
//! - `RedrawScheduler` in the window host: maps to `Window::request_redraw`

use std::collections::BTreeSet;

/// Identifies one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Requests future frames on behalf of an engine.
pub trait Scheduler {
    /// Request one frame. The host later calls the engine's `on_frame` with
    /// the returned handle.
    fn schedule(&mut self) -> FrameHandle;

    /// Cancel a requested frame. Cancelling an unknown or already delivered
    /// handle does nothing.
    fn cancel(&mut self, handle: FrameHandle);
}

/// A scheduler driven by the caller.
///
/// Requested frames queue up until [`take_due`](ManualScheduler::take_due)
/// hands them out, oldest first.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    next: u64,
    pending: BTreeSet<FrameHandle>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest pending frame, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.pop_first()
    }

    /// Frames requested and not yet taken or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total frames ever requested.
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }

    /// Total pending frames cancelled.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next += 1;
        self.scheduled += 1;
        let handle = FrameHandle(self.next);
        self.pending.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending.remove(&handle) {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_fifo() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule();
        let b = scheduler.schedule();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.take_due(), Some(a));
        assert_eq!(scheduler.take_due(), Some(b));
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule();
        scheduler.cancel(a);
        scheduler.cancel(a);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.cancelled_count(), 1);
        assert_eq!(scheduler.scheduled_count(), 1);
    }
}
