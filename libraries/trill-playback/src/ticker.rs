//! Position ticker
//!
//! A cooperative loop driven by the environment's next-frame primitive. The
//! ticker owns at most one pending request; a tick is honoured only if its
//! handle is that pending request, so anything cancelled before a state
//! change can never report against the new state.

use crate::scheduler::{Scheduler, TickHandle};
use crate::transport::TransportState;
use crate::types::PositionSample;

/// What one tick observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Still inside the track
    Continue(PositionSample),

    /// Reached the end of the track
    Ended(PositionSample),
}

/// Cancellable ticking loop
#[derive(Debug, Default)]
pub struct PositionTicker {
    pending: Option<TickHandle>,
    ticks: u64,
}

impl PositionTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the next tick unless one is already pending
    pub fn schedule(&mut self, scheduler: &mut dyn Scheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule_next_tick());
        }
    }

    /// Withdraw the pending tick, if any
    ///
    /// Synchronous: once this returns no earlier request can be accepted.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }

    /// Claim a fired handle; false for stale or foreign handles
    pub fn accept(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            self.ticks += 1;
            true
        } else {
            false
        }
    }

    /// Read the transport for one tick
    pub fn evaluate(transport: &TransportState, now: f64) -> TickOutcome {
        let duration = transport.duration();
        let elapsed = transport.elapsed(now).min(duration);
        let sample = PositionSample::new(elapsed, duration);
        if transport.is_at_end(now) {
            TickOutcome::Ended(sample)
        } else {
            TickOutcome::Continue(sample)
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticks accepted since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
