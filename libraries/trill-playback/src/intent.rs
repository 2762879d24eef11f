//! User intents delivered by an input adapter

use serde::{Deserialize, Serialize};

/// Everything an input adapter can ask of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Decode and install a new file
    LoadFile(Vec<u8>),
    /// Play if stopped, pause if playing
    PlayToggle,
    /// Jump to a fraction (0.0-1.0) of the track
    Seek(f64),
    /// Volume slider moved (0-100)
    SetVolume(i32),
    /// Mute button
    Mute,
    /// Set the loop flag
    SetLoop(bool),
    /// Loop button
    ToggleLoop,
    /// Pan slider moved (-1.0-1.0)
    SetPan(f32),
    /// Pan slider double action
    ResetPan,
}
