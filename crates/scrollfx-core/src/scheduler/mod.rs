//! Frame scheduling
//!
//! The engine runs one pass per display refresh. A [`FrameScheduler`] hands
//! out one-shot tokens; [`FrameLoop`] tracks the single outstanding token so
//! restarting never double-schedules and stale tokens are ignored.

mod service;

use std::collections::VecDeque;

pub use service::Ticker;

/// One-shot frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Display-refresh primitive
pub trait FrameScheduler {
    /// Request one callback on the next refresh
    fn schedule(&mut self) -> FrameToken;

    /// Withdraw a request; unknown tokens are ignored
    fn cancel(&mut self, token: FrameToken);
}

/// Run state of the per-frame loop
#[derive(Debug, Default)]
pub struct FrameLoop {
    pending: Option<FrameToken>,
    running: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start, cancelling any outstanding request first
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(token) = self.pending.take() {
            scheduler.cancel(token);
        }
        self.running = true;
        self.pending = Some(scheduler.schedule());
    }

    /// Stop; a no-op when already stopped
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(token) = self.pending.take() {
            scheduler.cancel(token);
        }
    }

    /// Consume `token` if it is the outstanding request
    pub fn accept(&mut self, token: FrameToken) -> bool {
        if self.running && self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Request the next frame if still running
    pub fn reschedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.running && self.pending.is_none() {
            self.pending = Some(scheduler.schedule());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }
}

/// Deterministic scheduler; the caller decides when frames happen
#[derive(Debug, Default)]
pub struct ManualFrames {
    queue: VecDeque<FrameToken>,
    next: u64,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every outstanding request, oldest first
    pub fn take_due(&mut self) -> Vec<FrameToken> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FrameScheduler for ManualFrames {
    fn schedule(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.queue.push_back(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        self.queue.retain(|t| *t != token);
    }
}
