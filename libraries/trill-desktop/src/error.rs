/// Desktop audio errors
use thiserror::Error;
use trill_playback::PlaybackError;

/// Result type for desktop audio operations
pub type Result<T> = std::result::Result<T, DesktopError>;

/// Desktop audio errors
#[derive(Debug, Error)]
pub enum DesktopError {
    /// Device not found
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// CPAL error
    #[error("CPAL error: {0}")]
    CpalError(String),

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),

    /// Bytes could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Track is not in the device's output format
    #[error("Track is {channels} ch at {rate} Hz, device needs stereo at {device_rate} Hz")]
    FormatMismatch {
        channels: u16,
        rate: u32,
        device_rate: u32,
    },

    /// Audio or decode thread is gone
    #[error("Worker thread unavailable: {0}")]
    ThreadError(String),
}

impl From<cpal::BuildStreamError> for DesktopError {
    fn from(err: cpal::BuildStreamError) -> Self {
        DesktopError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for DesktopError {
    fn from(err: cpal::PlayStreamError) -> Self {
        DesktopError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for DesktopError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        DesktopError::CpalError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for DesktopError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        DesktopError::DecodeError(err.to_string())
    }
}

impl From<DesktopError> for PlaybackError {
    fn from(err: DesktopError) -> Self {
        match err {
            DesktopError::DecodeError(message) => PlaybackError::DecodeFailed(message),
            other => PlaybackError::Output(other.to_string()),
        }
    }
}
