//! Real-time mixer for the output callback
//!
//! Holds at most one source (device-rate interleaved stereo) and renders it
//! with a smoothed gain and a stereo panner. No allocation happens in
//! [`Mixer::render`].

use std::sync::Arc;
use trill_playback::{pan_gains, DecodedAudio, SourceId};

/// The source currently feeding the device
#[derive(Debug, Clone)]
struct ActiveSource {
    id: SourceId,
    /// Interleaved stereo, shared with the engine's track handle
    audio: Arc<DecodedAudio>,
    /// Next frame to render
    frame: usize,
}

impl ActiveSource {
    fn frames(&self) -> usize {
        self.audio.samples.len() / 2
    }
}

/// Single-source mixer
#[derive(Debug, Clone)]
pub struct Mixer {
    source: Option<ActiveSource>,

    // Gain
    gain: f32,
    target_gain: f32,
    gain_step: f32,
    ramp_remaining: u32,

    // Pan
    pan: f32,
}

impl Mixer {
    /// Create an idle mixer at `gain`
    pub fn new(gain: f32) -> Self {
        Self {
            source: None,
            gain,
            target_gain: gain,
            gain_step: 0.0,
            ramp_remaining: 0,
            pan: 0.0,
        }
    }

    /// Start rendering stereo `audio` from `start_frame`, replacing any source
    pub fn start(&mut self, id: SourceId, audio: Arc<DecodedAudio>, start_frame: usize) {
        self.source = Some(ActiveSource {
            id,
            audio,
            frame: start_frame,
        });
    }

    /// Stop `id` if it is the live source
    ///
    /// Returns false when `id` was already replaced or stopped.
    pub fn stop(&mut self, id: SourceId) -> bool {
        match &self.source {
            Some(source) if source.id == id => {
                self.source = None;
                true
            }
            _ => false,
        }
    }

    /// Ramp linearly to `target` over `ramp_frames` frames (0 = jump)
    pub fn set_gain(&mut self, target: f32, ramp_frames: u32) {
        self.target_gain = target;
        if ramp_frames == 0 {
            self.gain = target;
            self.gain_step = 0.0;
            self.ramp_remaining = 0;
        } else {
            self.gain_step = (target - self.gain) / ramp_frames as f32;
            self.ramp_remaining = ramp_frames;
        }
    }

    /// Pan position in [-1, 1]
    pub fn set_pan(&mut self, value: f32) {
        self.pan = value.clamp(-1.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn active(&self) -> Option<SourceId> {
        self.source.as_ref().map(|source| source.id)
    }

    /// Live source ran past its last frame
    pub fn is_drained(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|source| source.frame >= source.frames())
    }

    /// Fill an interleaved device buffer with `channels` channels
    ///
    /// Mono devices get the L/R average; channels past the second stay silent.
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        for frame in output.chunks_mut(channels) {
            let (left, right) = self.next_frame();
            let gain = self.advance_gain();
            let (left, right) = (left * gain, right * gain);

            match frame {
                [mono] => *mono = (left + right) * 0.5,
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Next panned stereo frame, silence when idle or drained
    fn next_frame(&mut self) -> (f32, f32) {
        let Some(source) = self.source.as_mut() else {
            return (0.0, 0.0);
        };
        if source.frame >= source.frames() {
            return (0.0, 0.0);
        }

        let index = source.frame * 2;
        let samples = &source.audio.samples;
        let (left, right) = (samples[index], samples[index + 1]);
        source.frame += 1;
        stereo_pan(left, right, self.pan)
    }

    fn advance_gain(&mut self) -> f32 {
        if self.ramp_remaining > 0 {
            self.ramp_remaining -= 1;
            self.gain = if self.ramp_remaining == 0 {
                self.target_gain
            } else {
                self.gain + self.gain_step
            };
        }
        self.gain
    }
}

/// Stereo panner: the side being panned away from folds into the other
///
/// Center is a pass-through. Hard left sums both channels into the left
/// output, hard right into the right. The fold uses the equal-power law.
pub fn stereo_pan(left: f32, right: f32, pan: f32) -> (f32, f32) {
    if pan <= 0.0 {
        // pan in [-1, 0] maps to the law's [-1, 1]
        let (into_left, keep_right) = pan_gains(2.0 * pan + 1.0);
        (left + right * into_left, right * keep_right)
    } else {
        let (keep_left, into_right) = pan_gains(2.0 * pan - 1.0);
        (left * keep_left, right + left * into_right)
    }
}
