//! Engine time source

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic clock in seconds
///
/// The engine reads it at every state change and tick; it never needs to be
/// wall-clock time, only non-decreasing.
pub trait Clock: Send {
    /// Current engine time in seconds
    fn now(&self) -> f64;
}

/// Clock advanced by hand
///
/// Clones share the same time, so a host (or a test) can keep one copy and
/// hand the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at `seconds`
    pub fn starting_at(seconds: f64) -> Self {
        let clock = Self::default();
        clock.set(seconds);
        clock
    }

    /// Jump to an absolute time
    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    /// Move forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
