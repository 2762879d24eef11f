//! Trill - Playback Engine
//!
//! Platform-agnostic single-track playback controller.
//!
//! This crate provides:
//! - Transport bookkeeping (play/pause/seek with exact position accounting)
//! - Volume control (0-100, mute/unmute with level restore)
//! - Stereo pan (optional)
//! - A cancellable position ticker driven by a next-frame primitive
//! - Loop restart at end of track
//! - Stale-decode protection through load generations
//!
//! # Architecture
//!
//! `trill-playback` is completely platform-agnostic:
//! - No dependency on CPAL (desktop audio)
//! - No dependency on Symphonia (decoding)
//! - No dependency on any UI
//!
//! Everything external (clock, scheduler, decoder, sink, output adapter) is
//! injected as a trait object. Input arrives as [`Intent`] values through
//! [`PlaybackEngine::dispatch`]; the host calls [`PlaybackEngine::on_frame`]
//! once per frame.
//!
//! # Example: Simulated Playback
//!
//! ```rust
//! use trill_playback::{
//!     Collaborators, DecodeCompletion, DecodeRequest, DecodedAudio, Decoder, EngineState,
//!     EventLog, FrameScheduler, Intent, ManualClock, PlaybackEngine, PlayerConfig, Result,
//!     Sink, SourceId, TrackHandle, GainRamp,
//! };
//!
//! // Decodes anything into two seconds of silence
//! struct SilenceDecoder(Vec<DecodeCompletion>);
//!
//! impl Decoder for SilenceDecoder {
//!     fn submit(&mut self, request: DecodeRequest) {
//!         self.0.push(DecodeCompletion {
//!             generation: request.generation,
//!             result: Ok(DecodedAudio::silence(2.0, 1000)),
//!         });
//!     }
//!
//!     fn poll(&mut self) -> Option<DecodeCompletion> {
//!         self.0.pop()
//!     }
//! }
//!
//! // Accepts everything, plays nothing
//! struct QuietSink(u64);
//!
//! impl Sink for QuietSink {
//!     fn connect(&mut self, _: &TrackHandle, _: f64) -> Result<SourceId> {
//!         self.0 += 1;
//!         Ok(SourceId(self.0))
//!     }
//!     fn stop(&mut self, _: SourceId) -> Result<()> { Ok(()) }
//!     fn set_gain(&mut self, _: f32, _: GainRamp) -> Result<()> { Ok(()) }
//!     fn set_pan(&mut self, _: f32) -> Result<()> { Ok(()) }
//! }
//!
//! let clock = ManualClock::default();
//! let mut engine = PlaybackEngine::new(
//!     PlayerConfig::default(),
//!     Collaborators {
//!         clock: Box::new(clock.clone()),
//!         scheduler: Box::new(FrameScheduler::new()),
//!         sink: Box::new(QuietSink(0)),
//!         decoder: Box::new(SilenceDecoder(Vec::new())),
//!         output: Box::new(EventLog::new()),
//!     },
//! );
//!
//! engine.dispatch(Intent::LoadFile(b"RIFF....".to_vec())).ok();
//! engine.on_frame(); // decode lands, autoplay starts
//! assert_eq!(engine.state(), EngineState::Playing);
//!
//! clock.advance(2.0);
//! engine.on_frame(); // end of track
//! assert_eq!(engine.state(), EngineState::Ended);
//! ```

mod clock;
mod decoder;
mod engine;
mod error;
mod events;
mod format;
mod intent;
mod pan;
mod scheduler;
mod sink;
mod ticker;
mod transport;
pub mod types;
mod volume;

// Public exports
pub use clock::{Clock, ManualClock};
pub use decoder::{DecodeCompletion, DecodeRequest, Decoder};
pub use engine::{Collaborators, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::{ErrorKind, EventLog, NullOutput, OutputAdapter, PlaybackEvent};
pub use format::format_time;
pub use intent::Intent;
pub use pan::{pan_gains, Pan};
pub use scheduler::{FrameScheduler, Scheduler, TickHandle};
pub use sink::{Sink, SourceId};
pub use ticker::{PositionTicker, TickOutcome};
pub use transport::TransportState;
pub use types::{
    DecodedAudio, EngineState, GainRamp, LoadGeneration, MuteTier, PlayerConfig, PositionSample,
    TrackHandle, VolumeCurve,
};
pub use volume::Volume;
