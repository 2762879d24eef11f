//! Volume and mute control
//!
//! Level is 0-100. Muting zeroes the level and remembers the previous one,
//! so `toggle_mute(); toggle_mute();` always lands back on the original level.

use crate::types::{MuteTier, VolumeCurve};

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0-100), 0 while muted
    level: u8,

    /// Mute state
    muted: bool,

    /// Level to restore on unmute
    pre_mute_level: u8,

    /// Level to gain mapping
    curve: VolumeCurve,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume (0-100, clamped)
    /// * `curve` - Level to gain mapping
    pub fn new(level: u8, curve: VolumeCurve) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            pre_mute_level: level,
            curve,
        }
    }

    /// Set volume level (0-100)
    ///
    /// A non-zero level while muted clears the mute flag.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        if self.muted && self.level > 0 {
            self.muted = false;
        }
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Level restored by the next unmute
    pub fn pre_mute_level(&self) -> u8 {
        self.pre_mute_level
    }

    /// Toggle mute, returns the new mute state
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.level = self.pre_mute_level;
        } else {
            self.pre_mute_level = self.level;
            self.level = 0;
        }
        self.muted = !self.muted;
        self.muted
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Icon tier for the current level
    pub fn tier(&self) -> MuteTier {
        MuteTier::for_level(self.level)
    }

    /// Gain multiplier handed to the sink
    pub fn gain(&self) -> f32 {
        match self.curve {
            VolumeCurve::Linear => f32::from(self.level) / 100.0,
            VolumeCurve::Logarithmic => Self::logarithmic_gain(self.level),
        }
    }

    /// Convert volume percentage to gain on a -60 dB..0 dB scale
    ///
    /// Formula: gain = 10^((level% - 100) * 0.6 / 20)
    /// - 0%   → silence
    /// - 50%  → -30 dB → 0.0316 gain
    /// - 100% →   0 dB → 1.0 gain
    fn logarithmic_gain(level: u8) -> f32 {
        if level == 0 {
            return 0.0;
        }
        let db = (f32::from(level) - 100.0) * 0.6;
        10.0_f32.powf(db / 20.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(100, VolumeCurve::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(80, VolumeCurve::Linear);
        assert_eq!(vol.level(), 80);
        assert_eq!(vol.pre_mute_level(), 80);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level() {
        let mut vol = Volume::new(50, VolumeCurve::Linear);
        vol.set_level(75);
        assert_eq!(vol.level(), 75);

        // Clamp to 100
        vol.set_level(150);
        assert_eq!(vol.level(), 100);
    }

    #[test]
    fn mute_zeroes_and_restores() {
        let mut vol = Volume::new(65, VolumeCurve::Linear);

        assert!(vol.toggle_mute());
        assert_eq!(vol.level(), 0);
        assert_eq!(vol.gain(), 0.0);
        assert_eq!(vol.tier(), MuteTier::Off);

        assert!(!vol.toggle_mute());
        assert_eq!(vol.level(), 65);
    }

    #[test]
    fn mute_at_zero_round_trips() {
        let mut vol = Volume::new(0, VolumeCurve::Linear);
        vol.toggle_mute();
        vol.toggle_mute();
        assert_eq!(vol.level(), 0);
        assert!(!vol.is_muted());
    }

    #[test]
    fn raising_level_while_muted_unmutes() {
        let mut vol = Volume::new(70, VolumeCurve::Linear);
        vol.toggle_mute();

        vol.set_level(0);
        assert!(vol.is_muted());

        vol.set_level(30);
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 30);
        assert_eq!(vol.pre_mute_level(), 70);
    }

    #[test]
    fn linear_gain() {
        assert_eq!(Volume::new(0, VolumeCurve::Linear).gain(), 0.0);
        assert!((Volume::new(55, VolumeCurve::Linear).gain() - 0.55).abs() < 1e-6);
        assert_eq!(Volume::new(100, VolumeCurve::Linear).gain(), 1.0);
    }

    #[test]
    fn logarithmic_gain() {
        assert_eq!(Volume::new(0, VolumeCurve::Logarithmic).gain(), 0.0);
        assert!((Volume::new(100, VolumeCurve::Logarithmic).gain() - 1.0).abs() < 0.001);
        assert!((Volume::new(50, VolumeCurve::Logarithmic).gain() - 0.0316).abs() < 0.001);
    }

    #[test]
    fn tiers_follow_level() {
        let mut vol = Volume::default();
        vol.set_level(0);
        assert_eq!(vol.tier(), MuteTier::Off);
        vol.set_level(55);
        assert_eq!(vol.tier(), MuteTier::Full);
        vol.set_level(20);
        assert_eq!(vol.tier(), MuteTier::Low);
    }
}
