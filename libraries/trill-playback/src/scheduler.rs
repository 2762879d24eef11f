//! Next-frame scheduling primitive

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle for one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle(pub u64);

/// Environment-supplied "call me on the next frame" primitive
///
/// Mirrors a display-refresh callback: a scheduled tick fires once, a
/// cancelled one never fires.
pub trait Scheduler: Send {
    /// Request a tick on the next frame
    fn schedule_next_tick(&mut self) -> TickHandle;

    /// Withdraw a request; unknown or already-fired handles are ignored
    fn cancel(&mut self, handle: TickHandle);

    /// Handles due at the current frame, each returned exactly once
    fn take_due(&mut self) -> Vec<TickHandle>;
}

#[derive(Debug, Default)]
struct FrameQueue {
    next_id: u64,
    pending: Vec<TickHandle>,
}

/// Scheduler whose requests fire on the next `take_due` call
///
/// Clones share the same queue so a host can observe pending ticks.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    queue: Arc<Mutex<FrameQueue>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting for the next frame
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FrameQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_next_tick(&mut self) -> TickHandle {
        let mut queue = self.lock();
        queue.next_id += 1;
        let handle = TickHandle(queue.next_id);
        queue.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.lock().pending.retain(|pending| *pending != handle);
    }

    fn take_due(&mut self) -> Vec<TickHandle> {
        std::mem::take(&mut self.lock().pending)
    }
}
