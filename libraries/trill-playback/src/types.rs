//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifies one `load` request; completions carrying an older value are stale
pub type LoadGeneration = u64;

/// Decoded PCM ready for output
///
/// Samples are interleaved f32 in [-1.0, 1.0]. Produced by a [`crate::Decoder`],
/// never touched by the engine beyond handing it to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channels per frame
    pub channels: u16,
}

impl DecodedAudio {
    /// Wrap decoded samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Stereo silence of the given length, handy for simulations
    pub fn silence(duration_seconds: f64, sample_rate: u32) -> Self {
        let frames = (duration_seconds.max(0.0) * sample_rate as f64).round() as usize;
        Self::new(vec![0.0; frames * 2], sample_rate, 2)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Length in seconds, `NaN` when the format is unusable
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return f64::NAN;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Opaque reference to the decoded track owned by the engine
///
/// Cloning is cheap; the samples are shared. Replaced wholesale on every load.
#[derive(Debug, Clone)]
pub struct TrackHandle {
    id: LoadGeneration,
    duration_seconds: f64,
    audio: Arc<DecodedAudio>,
}

impl TrackHandle {
    /// Create a handle for audio installed by load `id`
    pub fn new(id: LoadGeneration, audio: DecodedAudio) -> Self {
        let duration_seconds = audio.duration_seconds();
        Self {
            id,
            duration_seconds,
            audio: Arc::new(audio),
        }
    }

    /// Load generation that produced this track
    pub fn id(&self) -> LoadGeneration {
        self.id
    }

    /// Track length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Shared decoded samples
    pub fn audio(&self) -> &Arc<DecodedAudio> {
        &self.audio
    }
}

/// Position reported once per tick while playing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Seconds from the start of the track
    pub elapsed_seconds: f64,

    /// Position as a percentage of the track length (0-100)
    pub percent: f64,
}

impl PositionSample {
    /// Build a sample, percent is 0 for zero-length tracks
    pub fn new(elapsed_seconds: f64, duration_seconds: f64) -> Self {
        let percent = if duration_seconds > 0.0 {
            (elapsed_seconds * 100.0 / duration_seconds).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            elapsed_seconds,
            percent,
        }
    }
}

/// Icon tier for the mute button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuteTier {
    /// Level 0
    Off,

    /// Level 1-40
    Low,

    /// Level above 40
    Full,
}

impl MuteTier {
    /// Tier for a volume level
    pub fn for_level(level: u8) -> Self {
        match level {
            0 => Self::Off,
            1..=40 => Self::Low,
            _ => Self::Full,
        }
    }

    /// Short name used by text adapters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Full => "full",
        }
    }
}

/// Engine state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No track installed (possibly decoding one)
    Empty,

    /// Track installed, never started
    Loaded,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Stopped at the end of the track
    Ended,
}

/// How the volume slider maps to gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeCurve {
    /// gain = level / 100
    #[default]
    Linear,

    /// 0% = silence, 1-100% mapped to -60 dB..0 dB
    Logarithmic,
}

/// How a gain change reaches the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainRamp {
    /// Jump straight to the new gain
    Immediate,

    /// Move linearly to the new gain over `millis`
    Smoothed {
        /// Ramp length in milliseconds
        millis: u32,
    },
}

impl Default for GainRamp {
    fn default() -> Self {
        Self::Smoothed { millis: 30 }
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 100)
    pub volume: u8,

    /// Initial loop flag (default: false)
    pub loop_enabled: bool,

    /// Accept pan requests (default: false)
    pub pan_enabled: bool,

    /// Start playing as soon as a decode completes (default: true)
    pub autoplay: bool,

    /// Slider to gain mapping (default: linear)
    pub volume_curve: VolumeCurve,

    /// Ramp used for slider moves (default: 30 ms smoothing)
    pub volume_ramp: GainRamp,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            loop_enabled: false,
            pan_enabled: false,
            autoplay: true,
            volume_curve: VolumeCurve::Linear,
            volume_ramp: GainRamp::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 100);
        assert!(!config.loop_enabled);
        assert!(!config.pan_enabled);
        assert!(config.autoplay);
        assert_eq!(config.volume_curve, VolumeCurve::Linear);
        assert_eq!(config.volume_ramp, GainRamp::Smoothed { millis: 30 });
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"volume": 40, "volume_ramp": "immediate"}"#).unwrap();
        assert_eq!(config.volume, 40);
        assert_eq!(config.volume_ramp, GainRamp::Immediate);
        assert!(config.autoplay);
    }

    #[test]
    fn mute_tiers() {
        assert_eq!(MuteTier::for_level(0), MuteTier::Off);
        assert_eq!(MuteTier::for_level(1), MuteTier::Low);
        assert_eq!(MuteTier::for_level(40), MuteTier::Low);
        assert_eq!(MuteTier::for_level(41), MuteTier::Full);
        assert_eq!(MuteTier::for_level(100), MuteTier::Full);
    }

    #[test]
    fn decoded_audio_duration() {
        let audio = DecodedAudio::new(vec![0.0; 8000 * 2 * 3], 8000, 2);
        assert_eq!(audio.frames(), 24000);
        assert!((audio.duration_seconds() - 3.0).abs() < 1e-9);

        let broken = DecodedAudio::new(vec![0.0; 10], 0, 2);
        assert!(broken.duration_seconds().is_nan());
    }

    #[test]
    fn position_sample_percent() {
        let sample = PositionSample::new(2.5, 10.0);
        assert!((sample.percent - 25.0).abs() < 1e-9);

        assert_eq!(PositionSample::new(3.0, 0.0).percent, 0.0);
        assert_eq!(PositionSample::new(12.0, 10.0).percent, 100.0);
    }

    #[test]
    fn track_handle_shares_samples() {
        let handle = TrackHandle::new(7, DecodedAudio::silence(1.5, 1000));
        let clone = handle.clone();
        assert_eq!(handle.id(), 7);
        assert!((handle.duration_seconds() - 1.5).abs() < 1e-9);
        assert!(Arc::ptr_eq(handle.audio(), clone.audio()));
    }
}
