//! Playback Events
//!
//! Notifications for the output adapter (UI, terminal, recorder).
//! Emitted at key points:
//! - Play state changes (play/pause/end of track)
//! - Position updates (once per tick while playing, and after seek/load)
//! - Volume, mute tier, pan and loop changes
//! - Non-fatal errors

use crate::types::{MuteTier, PositionSample};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Error kinds reported to the output adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Operation needs a track
    NotLoaded,
    /// Input could not be decoded
    DecodeFailed,
    /// Unusable parameter or disabled feature
    InvalidParameter,
    /// Sink rejected a request
    Output,
}

/// Receiver of engine notifications
///
/// Every method has a no-op default so adapters only implement what they show.
pub trait OutputAdapter: Send {
    /// Position changed
    fn on_position_update(&mut self, sample: PositionSample) {
        let _ = sample;
    }

    /// A track finished decoding
    fn on_duration_known(&mut self, seconds: f64) {
        let _ = seconds;
    }

    /// Playing ⇄ not playing
    fn on_play_state_changed(&mut self, is_playing: bool) {
        let _ = is_playing;
    }

    /// Mute icon tier after a volume or mute change
    fn on_mute_state_changed(&mut self, tier: MuteTier) {
        let _ = tier;
    }

    /// Loop flag changed
    fn on_loop_state_changed(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Volume level changed (slider sync)
    fn on_volume_changed(&mut self, level: u8) {
        let _ = level;
    }

    /// Pan position changed (slider sync)
    fn on_pan_changed(&mut self, value: f32) {
        let _ = value;
    }

    /// A non-fatal error occurred
    fn on_error(&mut self, kind: ErrorKind) {
        let _ = kind;
    }
}

/// Adapter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl OutputAdapter for NullOutput {}

/// Notifications as values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    PositionUpdate(PositionSample),
    DurationKnown { seconds: f64 },
    PlayStateChanged { is_playing: bool },
    MuteStateChanged { tier: MuteTier },
    LoopStateChanged { enabled: bool },
    VolumeChanged { level: u8 },
    PanChanged { value: f32 },
    Error { kind: ErrorKind },
}

/// Adapter recording every notification for later draining
///
/// Clones share the same log: hand one to the engine, keep one to poll.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all pending events
    ///
    /// Returns everything recorded since the last drain, oldest first.
    pub fn drain(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Check if there are pending events
    pub fn has_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    fn push(&self, event: PlaybackEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PlaybackEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputAdapter for EventLog {
    fn on_position_update(&mut self, sample: PositionSample) {
        self.push(PlaybackEvent::PositionUpdate(sample));
    }

    fn on_duration_known(&mut self, seconds: f64) {
        self.push(PlaybackEvent::DurationKnown { seconds });
    }

    fn on_play_state_changed(&mut self, is_playing: bool) {
        self.push(PlaybackEvent::PlayStateChanged { is_playing });
    }

    fn on_mute_state_changed(&mut self, tier: MuteTier) {
        self.push(PlaybackEvent::MuteStateChanged { tier });
    }

    fn on_loop_state_changed(&mut self, enabled: bool) {
        self.push(PlaybackEvent::LoopStateChanged { enabled });
    }

    fn on_volume_changed(&mut self, level: u8) {
        self.push(PlaybackEvent::VolumeChanged { level });
    }

    fn on_pan_changed(&mut self, value: f32) {
        self.push(PlaybackEvent::PanChanged { value });
    }

    fn on_error(&mut self, kind: ErrorKind) {
        self.push(PlaybackEvent::Error { kind });
    }
}
