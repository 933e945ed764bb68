//! Self-rescheduling frame loop with an explicit start/stop/cancel contract.
//!
//! The host's vsync or timer primitive sits behind [`FrameScheduler`]. Each
//! request yields a [`FrameRequest`] token; when the host fires it, the loop
//! checks the token against the one it is waiting on, runs the frame, and
//! requests the next. Stopping cancels the pending request, so a token that
//! fires late (or was never cancelled by the host) is simply ignored.

#[cfg(test)]
#[path = "frame_loop_test.rs"]
mod frame_loop_test;

/// Handle for one pending next-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host primitive that calls back once per frame.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request. Cancelling an unknown or already-fired request is a no-op.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Loop state: whether it runs and which request it waits on.
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    pending: Option<FrameRequest>,
    frames: u64,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the first frame. No-op if already running.
    pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = Some(scheduler.request_frame());
    }

    /// Accept a fired request. Returns `false` for stale or foreign tokens,
    /// in which case no frame must run.
    pub fn begin_frame(&mut self, request: FrameRequest) -> bool {
        if !self.running || self.pending != Some(request) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Finish a frame and schedule the next one if still running.
    pub fn end_frame<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        self.frames += 1;
        if self.running && self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Stop and cancel the pending request. Idempotent.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        self.running = false;
        if let Some(request) = self.pending.take() {
            scheduler.cancel_frame(request);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Frames completed since creation.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
