//! Stereo balance

/// Pan position in [-1, 1], -1 hard left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pan {
    value: f32,
}

impl Pan {
    /// Store a new position, clamped to [-1, 1]
    pub fn set(&mut self, value: f32) -> f32 {
        self.value = value.clamp(-1.0, 1.0);
        self.value
    }

    /// Back to center
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Per-channel gains for this position
    pub fn gains(&self) -> (f32, f32) {
        pan_gains(self.value)
    }
}

/// Equal-power pan law
///
/// Returns `(left, right)` multipliers. Center gives ~0.707 on both sides so
/// perceived loudness stays constant across the sweep.
pub fn pan_gains(value: f32) -> (f32, f32) {
    let x = (value.clamp(-1.0, 1.0) + 1.0) * 0.5;
    let angle = x * std::f32::consts::FRAC_PI_2;
    (angle.cos(), angle.sin())
}
