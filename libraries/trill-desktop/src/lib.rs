//! Desktop backends for the Trill playback engine
//!
//! This crate provides the platform pieces `trill-playback` leaves abstract:
//!
//! - [`SymphoniaDecoder`]: decodes (and resamples) in-memory files on a worker thread
//! - [`CpalSink`]: plays the single live source on the default output device
//! - [`SystemClock`]: monotonic wall clock
//!
//! The scheduler is the engine's own `FrameScheduler`, driven by the host's
//! frame loop.
//!
//! # Example
//!
//! ```no_run
//! use trill_desktop::{CpalSink, SymphoniaDecoder, SystemClock};
//! use trill_playback::{
//!     Collaborators, FrameScheduler, Intent, NullOutput, PlaybackEngine, PlayerConfig,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = CpalSink::new()?;
//! let decoder = SymphoniaDecoder::with_output_rate(sink.sample_rate())?;
//! let mut engine = PlaybackEngine::new(
//!     PlayerConfig::default(),
//!     Collaborators {
//!         clock: Box::new(SystemClock::new()),
//!         scheduler: Box::new(FrameScheduler::new()),
//!         sink: Box::new(sink),
//!         decoder: Box::new(decoder),
//!         output: Box::new(NullOutput),
//!     },
//! );
//!
//! engine.dispatch(Intent::LoadFile(std::fs::read("song.flac")?))?;
//! loop {
//!     engine.on_frame();
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! # }
//! ```

#![deny(unsafe_code)]

mod clock;
mod decoder;
mod error;
mod mixer;
mod output;
mod resample;

pub use clock::SystemClock;
pub use decoder::{decode_bytes, SymphoniaDecoder};
pub use error::{DesktopError, Result};
pub use mixer::{stereo_pan, Mixer};
pub use output::CpalSink;
pub use resample::prepare_for_device;
