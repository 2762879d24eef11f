//! Playback engine - the facade
//!
//! Composes transport, volume, pan and the position ticker, owns the single
//! track handle and the single live sink connection, and is the only thing
//! that mutates them.
//!
//! State machine:
//!
//! ```text
//! Empty ──decode ok──▶ Loaded ──play──▶ Playing ⇄ Paused
//!                                          │
//!                                  end, loop off
//!                                          ▼
//!                                        Ended
//! ```
//!
//! Any state goes back to `Empty` on `load`. Seek lands in `Paused`.

use crate::{
    clock::Clock,
    decoder::{DecodeCompletion, DecodeRequest, Decoder},
    error::{PlaybackError, Result},
    events::OutputAdapter,
    intent::Intent,
    pan::Pan,
    scheduler::{Scheduler, TickHandle},
    sink::{Sink, SourceId},
    ticker::{PositionTicker, TickOutcome},
    transport::TransportState,
    types::{
        EngineState, GainRamp, LoadGeneration, MuteTier, PlayerConfig, PositionSample, TrackHandle,
    },
    volume::Volume,
};
use tracing::{debug, error, info, warn};

/// External collaborators handed to the engine at construction
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub scheduler: Box<dyn Scheduler>,
    pub sink: Box<dyn Sink>,
    pub decoder: Box<dyn Decoder>,
    pub output: Box<dyn OutputAdapter>,
}

/// Single-track playback controller
pub struct PlaybackEngine {
    // State
    state: EngineState,
    transport: TransportState,
    track: Option<TrackHandle>,
    active_source: Option<SourceId>,

    // Loads
    generation: LoadGeneration,
    pending_load: Option<LoadGeneration>,

    // Settings
    volume: Volume,
    pan: Pan,
    config: PlayerConfig,

    ticker: PositionTicker,

    // Collaborators
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    sink: Box<dyn Sink>,
    decoder: Box<dyn Decoder>,
    output: Box<dyn OutputAdapter>,
}

impl PlaybackEngine {
    /// Create an engine in the `Empty` state
    ///
    /// Pushes the configured volume (and center pan, when enabled) to the sink.
    pub fn new(config: PlayerConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            clock,
            scheduler,
            sink,
            decoder,
            output,
        } = collaborators;

        let mut engine = Self {
            state: EngineState::Empty,
            transport: TransportState::new(config.loop_enabled),
            track: None,
            active_source: None,
            generation: 0,
            pending_load: None,
            volume: Volume::new(config.volume, config.volume_curve),
            pan: Pan::default(),
            config,
            ticker: PositionTicker::new(),
            clock,
            scheduler,
            sink,
            decoder,
            output,
        };

        if let Err(e) = engine.sink.set_gain(engine.volume.gain(), GainRamp::Immediate) {
            warn!("Initial gain rejected by sink: {}", e);
        }
        if engine.config.pan_enabled {
            if let Err(e) = engine.sink.set_pan(0.0) {
                warn!("Initial pan rejected by sink: {}", e);
            }
        }
        engine
    }

    // ===== Dispatch =====

    /// Single entry point for input adapters
    pub fn dispatch(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::LoadFile(bytes) => {
                self.load(bytes);
                Ok(())
            }
            Intent::PlayToggle => self.play_toggle(),
            Intent::Seek(fraction) => self.seek(fraction),
            Intent::SetVolume(level) => self.set_volume(level),
            Intent::Mute => self.toggle_mute(),
            Intent::SetLoop(enabled) => {
                self.set_loop(enabled);
                Ok(())
            }
            Intent::ToggleLoop => {
                self.set_loop(!self.transport.loop_enabled());
                Ok(())
            }
            Intent::SetPan(value) => self.set_pan(value),
            Intent::ResetPan => self.reset_pan(),
        }
    }

    /// Per-frame entry point
    ///
    /// Collects the ticks due this frame, installs finished decodes, then runs
    /// the collected ticks. A tick scheduled during this call (autoplay after
    /// a decode, say) fires on the next frame.
    pub fn on_frame(&mut self) {
        let due = self.scheduler.take_due();

        while let Some(completion) = self.decoder.poll() {
            match self.complete_load(completion) {
                Ok(()) | Err(PlaybackError::StaleLoadIgnored { .. }) => {}
                Err(e) => debug!("Load completion failed: {}", e),
            }
        }

        for handle in due {
            self.tick(handle);
        }
    }

    // ===== Loading =====

    /// Discard the current track and start decoding `bytes`
    ///
    /// Returns the generation that identifies this load. Any decode still in
    /// flight is superseded and its result will be dropped.
    pub fn load(&mut self, bytes: Vec<u8>) -> LoadGeneration {
        let was_playing = self.state == EngineState::Playing;
        self.stop_segment();

        self.track = None;
        self.transport.unload();
        self.state = EngineState::Empty;

        self.generation += 1;
        let generation = self.generation;
        if let Some(previous) = self.pending_load.replace(generation) {
            debug!("Load {} superseded by load {}", previous, generation);
        }

        if was_playing {
            self.output.on_play_state_changed(false);
        }
        self.output.on_position_update(PositionSample::new(0.0, 0.0));

        info!("Loading track (generation {}, {} bytes)", generation, bytes.len());
        self.decoder.submit(DecodeRequest { generation, bytes });
        generation
    }

    /// Install the result of a decode
    ///
    /// Completions for anything but the latest load are dropped with
    /// `StaleLoadIgnored`, which is never shown to the output adapter.
    pub fn complete_load(&mut self, completion: DecodeCompletion) -> Result<()> {
        let DecodeCompletion { generation, result } = completion;

        if self.pending_load != Some(generation) {
            warn!(
                "Dropping decode result for generation {} (current {})",
                generation, self.generation
            );
            return Err(PlaybackError::StaleLoadIgnored { generation });
        }
        self.pending_load = None;

        let audio = match result {
            Ok(audio) => audio,
            Err(message) => {
                error!("Decode failed for generation {}: {}", generation, message);
                return self.reject(PlaybackError::DecodeFailed(message));
            }
        };

        let track = TrackHandle::new(generation, audio);
        let duration = track.duration_seconds();
        let now = self.clock.now();
        if !self.transport.load(duration, now) {
            error!("Decoded track has unusable duration {}", duration);
            return self.reject(PlaybackError::DecodeFailed(format!(
                "unusable duration {duration}"
            )));
        }

        info!("Track ready: {:.3}s (generation {})", duration, generation);
        self.track = Some(track);
        self.state = EngineState::Loaded;
        self.output.on_duration_known(duration);
        self.output.on_position_update(PositionSample::new(0.0, duration));

        if self.config.autoplay {
            self.play()?;
        }
        Ok(())
    }

    // ===== Playback Control =====

    /// Play if not playing, pause if playing
    pub fn play_toggle(&mut self) -> Result<()> {
        if self.state == EngineState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            EngineState::Empty => self.reject(PlaybackError::NotLoaded),
            EngineState::Playing => Ok(()),
            EngineState::Loaded | EngineState::Paused => self.start_segment(),
            EngineState::Ended => {
                // Replaying a finished track starts over
                let now = self.clock.now();
                self.transport.seek(0.0, now)?;
                self.start_segment()
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            EngineState::Empty => self.reject(PlaybackError::NotLoaded),
            EngineState::Playing => {
                self.stop_segment();
                let now = self.clock.now();
                self.transport.pause(now);
                self.state = EngineState::Paused;
                debug!("Paused at {:.3}s", self.transport.paused_offset());

                let sample = self.position_sample();
                self.output.on_play_state_changed(false);
                self.output.on_position_update(sample);
                Ok(())
            }
            EngineState::Loaded | EngineState::Paused | EngineState::Ended => Ok(()),
        }
    }

    // ===== Seek =====

    /// Jump to `fraction` of the track (clamped to [0, 1])
    ///
    /// Always stops playback; a separate `play` resumes from the new position.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        if self.state == EngineState::Empty {
            return self.reject(PlaybackError::NotLoaded);
        }
        if !fraction.is_finite() {
            return self.reject(PlaybackError::InvalidParameter(format!(
                "seek fraction {fraction}"
            )));
        }
        if !(0.0..=1.0).contains(&fraction) {
            debug!("Clamping seek fraction {}", fraction);
        }

        let was_playing = self.state == EngineState::Playing;
        self.stop_segment();

        let now = self.clock.now();
        let target = self.transport.seek(fraction, now)?;
        self.state = EngineState::Paused;
        debug!("Seeked to {:.3}s", target);

        let sample = self.position_sample();
        if was_playing {
            self.output.on_play_state_changed(false);
        }
        self.output.on_position_update(sample);
        Ok(())
    }

    // ===== Volume =====

    /// Volume slider (0-100, clamped)
    pub fn set_volume(&mut self, level: i32) -> Result<()> {
        let clamped = level.clamp(0, 100);
        if clamped != level {
            debug!("Clamping volume {} to {}", level, clamped);
        }
        self.volume.set_level(clamped as u8);
        self.apply_gain(self.config.volume_ramp)
    }

    /// Mute button: mute, or restore the pre-mute level
    pub fn toggle_mute(&mut self) -> Result<()> {
        let muted = self.volume.toggle_mute();
        debug!("Muted: {}", muted);
        self.apply_gain(GainRamp::Immediate)
    }

    // ===== Loop =====

    pub fn set_loop(&mut self, enabled: bool) {
        self.transport.set_loop(enabled);
        self.output.on_loop_state_changed(enabled);
    }

    // ===== Pan =====

    /// Pan slider (-1.0-1.0, clamped)
    pub fn set_pan(&mut self, value: f32) -> Result<()> {
        if !self.config.pan_enabled {
            return self.reject(PlaybackError::InvalidOperation(
                "pan is disabled".to_string(),
            ));
        }
        if !value.is_finite() {
            return self.reject(PlaybackError::InvalidParameter(format!("pan {value}")));
        }
        let value = self.pan.set(value);
        self.apply_pan(value)
    }

    /// Re-center the pan, independent of playback state
    pub fn reset_pan(&mut self) -> Result<()> {
        if !self.config.pan_enabled {
            return self.reject(PlaybackError::InvalidOperation(
                "pan is disabled".to_string(),
            ));
        }
        self.pan.reset();
        self.apply_pan(0.0)
    }

    // ===== State Queries =====

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    /// Transport is frozen on a loaded track (`Loaded`, `Paused` or `Ended`)
    pub fn is_paused(&self) -> bool {
        self.transport.is_loaded() && self.transport.is_paused()
    }

    /// A decode is in flight
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Latest load generation handed out
    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn track(&self) -> Option<&TrackHandle> {
        self.track.as_ref()
    }

    /// Seconds from the start of the track
    pub fn elapsed(&self) -> f64 {
        self.transport.elapsed(self.clock.now())
    }

    pub fn duration(&self) -> Option<f64> {
        self.track.as_ref().map(TrackHandle::duration_seconds)
    }

    /// Current position as the ticker would report it
    pub fn position_sample(&self) -> PositionSample {
        let duration = self.transport.duration();
        PositionSample::new(self.elapsed().min(duration), duration)
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn volume_level(&self) -> u8 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn mute_tier(&self) -> MuteTier {
        self.volume.tier()
    }

    pub fn pan(&self) -> f32 {
        self.pan.value()
    }

    pub fn loop_enabled(&self) -> bool {
        self.transport.loop_enabled()
    }

    /// The ticker is waiting for a frame
    pub fn has_scheduled_tick(&self) -> bool {
        self.ticker.is_scheduled()
    }

    /// The live sink source, if any
    pub fn active_source(&self) -> Option<SourceId> {
        self.active_source
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    // ===== Internals =====

    /// One ticker iteration
    fn tick(&mut self, handle: TickHandle) {
        if !self.ticker.accept(handle) {
            debug!("Ignoring stale tick {:?}", handle);
            return;
        }
        if self.state != EngineState::Playing {
            return;
        }

        let now = self.clock.now();
        match PositionTicker::evaluate(&self.transport, now) {
            TickOutcome::Continue(sample) => {
                self.output.on_position_update(sample);
                self.ticker.schedule(self.scheduler.as_mut());
            }
            TickOutcome::Ended(sample) => {
                self.output.on_position_update(sample);
                // A zero-length track would restart on every frame
                if self.transport.loop_enabled() && self.transport.duration() > 0.0 {
                    self.restart_loop(now);
                } else {
                    self.finish_track();
                }
            }
        }
    }

    /// Loop: reload the same handle and play from zero
    fn restart_loop(&mut self, now: f64) {
        debug!("Looping track");
        self.stop_source();

        let duration = self.transport.duration();
        self.transport.load(duration, now);
        if let Err(e) = self.start_segment() {
            warn!("Loop restart failed: {}", e);
            self.state = EngineState::Paused;
            self.output.on_play_state_changed(false);
        }
    }

    /// End of track with loop off
    fn finish_track(&mut self) {
        self.stop_source();
        self.transport.finish();
        self.state = EngineState::Ended;
        info!("Track ended at {:.3}s", self.transport.duration());
        self.output.on_play_state_changed(false);
    }

    /// Connect a fresh source at the frozen position and start ticking
    fn start_segment(&mut self) -> Result<()> {
        let Some(track) = self.track.clone() else {
            return self.reject(PlaybackError::NotLoaded);
        };

        // Sources are single-use; never leave two live
        self.stop_source();

        let now = self.clock.now();
        let offset = self.transport.elapsed(now);
        let source = match self.sink.connect(&track, offset) {
            Ok(source) => source,
            Err(e) => {
                error!("Sink refused source: {}", e);
                return self.reject(e);
            }
        };
        self.active_source = Some(source);
        self.transport.play(now)?;

        let was_playing = self.state == EngineState::Playing;
        self.state = EngineState::Playing;
        debug!("Playing from {:.3}s on {:?}", offset, source);
        if !was_playing {
            self.output.on_play_state_changed(true);
        }

        self.ticker.schedule(self.scheduler.as_mut());
        Ok(())
    }

    /// Cancel ticking, then stop the live source
    ///
    /// The tick is cancelled before anything else changes.
    fn stop_segment(&mut self) {
        self.ticker.cancel(self.scheduler.as_mut());
        self.stop_source();
    }

    fn stop_source(&mut self) {
        if let Some(source) = self.active_source.take() {
            if let Err(e) = self.sink.stop(source) {
                warn!("Failed to stop {:?}: {}", source, e);
            }
        }
    }

    fn apply_gain(&mut self, ramp: GainRamp) -> Result<()> {
        let level = self.volume.level();
        let tier = self.volume.tier();
        self.output.on_volume_changed(level);
        self.output.on_mute_state_changed(tier);

        if let Err(e) = self.sink.set_gain(self.volume.gain(), ramp) {
            return self.reject(e);
        }
        Ok(())
    }

    fn apply_pan(&mut self, value: f32) -> Result<()> {
        self.output.on_pan_changed(value);
        if let Err(e) = self.sink.set_pan(value) {
            return self.reject(e);
        }
        Ok(())
    }

    /// Report to the adapter (when the error is user-facing) and return it
    fn reject(&mut self, err: PlaybackError) -> Result<()> {
        if let Some(kind) = err.kind() {
            self.output.on_error(kind);
        }
        Err(err)
    }
}
