//! Error types for playback management

use crate::events::ErrorKind;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    /// Operation needs a decoded track and none is installed
    #[error("No track loaded")]
    NotLoaded,

    /// Input could not be decoded
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// Parameter had no usable value (NaN, infinite, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A decode finished after a newer load was issued
    #[error("Stale load result ignored (generation {generation})")]
    StaleLoadIgnored {
        /// Generation carried by the dropped completion
        generation: u64,
    },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The audio sink rejected a request
    #[error("Output error: {0}")]
    Output(String),
}

impl PlaybackError {
    /// Adapter-facing kind, `None` for errors that stay internal
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotLoaded => Some(ErrorKind::NotLoaded),
            Self::DecodeFailed(_) => Some(ErrorKind::DecodeFailed),
            Self::InvalidParameter(_) | Self::InvalidOperation(_) => {
                Some(ErrorKind::InvalidParameter)
            }
            Self::Output(_) => Some(ErrorKind::Output),
            Self::StaleLoadIgnored { .. } => None,
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
