//! Audio output sink

use crate::error::Result;
use crate::types::{GainRamp, TrackHandle};
use serde::{Deserialize, Serialize};

/// Identifies one single-use source created by [`Sink::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// Downstream output the engine connects to but does not implement
///
/// The chain is source → gain → pan → destination. Sources are single-use:
/// once stopped, a source id is dead and the next play must `connect` again.
pub trait Sink: Send {
    /// Create a source for `track`, starting `offset_seconds` in, and start it
    ///
    /// # Returns
    /// * `Ok(id)` - Source is live and audible
    /// * `Err(_)` - Output could not accept the source
    fn connect(&mut self, track: &TrackHandle, offset_seconds: f64) -> Result<SourceId>;

    /// Stop and disconnect a source
    fn stop(&mut self, source: SourceId) -> Result<()>;

    /// Set the gain stage (0.0-1.0)
    fn set_gain(&mut self, gain: f32, ramp: GainRamp) -> Result<()>;

    /// Set the pan stage (-1.0 left .. 1.0 right)
    fn set_pan(&mut self, pan: f32) -> Result<()>;
}
