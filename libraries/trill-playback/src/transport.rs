//! Transport bookkeeping: play/pause status and position accounting
//!
//! Position is never stored while playing. A play segment records the clock
//! time at which position zero would have been, so `elapsed = now - started_at`.
//! Pausing freezes the position into `paused_offset`, and resuming rebuilds
//! the anchor from it, which makes pause/resume an exact round trip.

use crate::error::{PlaybackError, Result};

/// Transport state for the current track
#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    paused: bool,
    started_at: f64,
    paused_offset: f64,
    loop_enabled: bool,
    duration: f64,
    loaded: bool,
}

impl TransportState {
    /// Empty transport, nothing loaded
    pub fn new(loop_enabled: bool) -> Self {
        Self {
            paused: true,
            started_at: 0.0,
            paused_offset: 0.0,
            loop_enabled,
            duration: 0.0,
            loaded: false,
        }
    }

    /// Reset for a new track of `duration` seconds
    ///
    /// Returns false (and changes nothing) when the duration is not a finite
    /// non-negative number.
    pub fn load(&mut self, duration: f64, now: f64) -> bool {
        if !duration.is_finite() || duration < 0.0 {
            return false;
        }
        self.paused = true;
        self.paused_offset = 0.0;
        self.started_at = now;
        self.duration = duration;
        self.loaded = true;
        true
    }

    /// Forget the current track, keeping the loop flag
    pub fn unload(&mut self) {
        *self = Self::new(self.loop_enabled);
    }

    /// Start a play segment from the frozen position
    ///
    /// Playing while already playing is a no-op.
    pub fn play(&mut self, now: f64) -> Result<()> {
        if !self.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        if self.paused {
            self.started_at = now - self.paused_offset;
            self.paused_offset = 0.0;
            self.paused = false;
        }
        Ok(())
    }

    /// Freeze the position; exact inverse of [`Self::play`]
    pub fn pause(&mut self, now: f64) {
        if !self.paused {
            self.paused_offset = (now - self.started_at).clamp(0.0, self.duration);
            self.paused = true;
        }
    }

    /// Stop at `fraction` of the track (clamped to [0, 1])
    ///
    /// Never resumes; returns the new frozen position in seconds.
    pub fn seek(&mut self, fraction: f64, now: f64) -> Result<f64> {
        if !self.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        if !fraction.is_finite() {
            return Err(PlaybackError::InvalidParameter(format!(
                "seek fraction {fraction}"
            )));
        }
        let target = self.duration * fraction.clamp(0.0, 1.0);
        self.paused = true;
        self.paused_offset = target;
        self.started_at = now - target;
        Ok(target)
    }

    /// Park at the end of the track
    pub fn finish(&mut self) {
        self.paused = true;
        self.paused_offset = self.duration;
    }

    /// Seconds from the start of the track
    pub fn elapsed(&self, now: f64) -> f64 {
        if self.paused {
            self.paused_offset
        } else {
            (now - self.started_at).max(0.0)
        }
    }

    /// True once the position has reached the duration
    pub fn is_at_end(&self, now: f64) -> bool {
        self.loaded && self.elapsed(now) >= self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn paused_offset(&self) -> f64 {
        self.paused_offset
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new(false)
    }
}
