//! Shared test harness: manual clock, frame scheduler and recording mocks

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use trill_playback::{
    Collaborators, DecodeCompletion, DecodeRequest, DecodedAudio, Decoder, EventLog,
    FrameScheduler, GainRamp, LoadGeneration, ManualClock, PlaybackEngine, PlaybackError,
    PlaybackEvent, PlayerConfig, Sink, SourceId, TrackHandle,
};

/// Sample rate for simulated tracks; low to keep buffers tiny
pub const TEST_RATE: u32 = 100;

// ===== Sink =====

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Connect {
        source: SourceId,
        track: LoadGeneration,
        offset: f64,
    },
    Stop(SourceId),
    Gain(f32, GainRamp),
    Pan(f32),
}

#[derive(Debug, Default)]
struct SinkInner {
    calls: Vec<SinkCall>,
    live: Vec<SourceId>,
    retired: Vec<SourceId>,
    next_id: u64,
    fail_connect: bool,
}

/// Sink that records calls and tracks live sources
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn live_sources(&self) -> Vec<SourceId> {
        self.inner.lock().unwrap().live.clone()
    }

    pub fn connects(&self) -> Vec<(SourceId, LoadGeneration, f64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Connect {
                    source,
                    track,
                    offset,
                } => Some((source, track, offset)),
                _ => None,
            })
            .collect()
    }

    pub fn last_gain(&self) -> Option<(f32, GainRamp)> {
        self.calls().into_iter().rev().find_map(|call| match call {
            SinkCall::Gain(gain, ramp) => Some((gain, ramp)),
            _ => None,
        })
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.inner.lock().unwrap().fail_connect = fail;
    }
}

impl Sink for RecordingSink {
    fn connect(
        &mut self,
        track: &TrackHandle,
        offset_seconds: f64,
    ) -> trill_playback::Result<SourceId> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_connect {
            return Err(PlaybackError::Output("device unplugged".to_string()));
        }
        inner.next_id += 1;
        let source = SourceId(inner.next_id);
        inner.live.push(source);
        inner.calls.push(SinkCall::Connect {
            source,
            track: track.id(),
            offset: offset_seconds,
        });
        Ok(source)
    }

    fn stop(&mut self, source: SourceId) -> trill_playback::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        assert!(
            !inner.retired.contains(&source),
            "source {source:?} stopped twice"
        );
        inner.live.retain(|live| *live != source);
        inner.retired.push(source);
        inner.calls.push(SinkCall::Stop(source));
        Ok(())
    }

    fn set_gain(&mut self, gain: f32, ramp: GainRamp) -> trill_playback::Result<()> {
        self.inner.lock().unwrap().calls.push(SinkCall::Gain(gain, ramp));
        Ok(())
    }

    fn set_pan(&mut self, pan: f32) -> trill_playback::Result<()> {
        self.inner.lock().unwrap().calls.push(SinkCall::Pan(pan));
        Ok(())
    }
}

// ===== Decoder =====

#[derive(Debug, Default)]
struct DecoderInner {
    submitted: Vec<DecodeRequest>,
    ready: VecDeque<DecodeCompletion>,
    auto_duration: Option<f64>,
}

/// Decoder whose completions are released by the test
#[derive(Debug, Clone, Default)]
pub struct ControlledDecoder {
    inner: Arc<Mutex<DecoderInner>>,
}

impl ControlledDecoder {
    /// Complete every submission at once with silence of `duration`
    pub fn auto(duration: f64) -> Self {
        let decoder = Self::default();
        decoder.inner.lock().unwrap().auto_duration = Some(duration);
        decoder
    }

    pub fn submitted(&self) -> Vec<LoadGeneration> {
        self.inner
            .lock()
            .unwrap()
            .submitted
            .iter()
            .map(|request| request.generation)
            .collect()
    }

    /// Release a successful decode for `generation`
    pub fn finish(&self, generation: LoadGeneration, duration: f64) {
        self.inner.lock().unwrap().ready.push_back(DecodeCompletion {
            generation,
            result: Ok(DecodedAudio::silence(duration, TEST_RATE)),
        });
    }

    /// Release a failed decode for `generation`
    pub fn fail(&self, generation: LoadGeneration, message: &str) {
        self.inner.lock().unwrap().ready.push_back(DecodeCompletion {
            generation,
            result: Err(message.to_string()),
        });
    }
}

impl Decoder for ControlledDecoder {
    fn submit(&mut self, request: DecodeRequest) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(duration) = inner.auto_duration {
            inner.ready.push_back(DecodeCompletion {
                generation: request.generation,
                result: Ok(DecodedAudio::silence(duration, TEST_RATE)),
            });
        }
        inner.submitted.push(request);
    }

    fn poll(&mut self) -> Option<DecodeCompletion> {
        self.inner.lock().unwrap().ready.pop_front()
    }
}

// ===== Harness =====

pub struct Harness {
    pub engine: PlaybackEngine,
    pub clock: ManualClock,
    pub scheduler: FrameScheduler,
    pub sink: RecordingSink,
    pub decoder: ControlledDecoder,
    pub events: EventLog,
}

impl Harness {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_decoder(config, ControlledDecoder::default())
    }

    pub fn with_decoder(config: PlayerConfig, decoder: ControlledDecoder) -> Self {
        let clock = ManualClock::starting_at(100.0);
        let scheduler = FrameScheduler::new();
        let sink = RecordingSink::default();
        let events = EventLog::new();

        let engine = PlaybackEngine::new(
            config,
            Collaborators {
                clock: Box::new(clock.clone()),
                scheduler: Box::new(scheduler.clone()),
                sink: Box::new(sink.clone()),
                decoder: Box::new(decoder.clone()),
                output: Box::new(events.clone()),
            },
        );

        Self {
            engine,
            clock,
            scheduler,
            sink,
            decoder,
            events,
        }
    }

    /// Engine with a decoded track of `duration` seconds, playing (autoplay)
    pub fn playing(duration: f64) -> Self {
        Self::playing_with(duration, PlayerConfig::default())
    }

    pub fn playing_with(duration: f64, config: PlayerConfig) -> Self {
        let mut harness = Self::with_decoder(config, ControlledDecoder::auto(duration));
        harness.engine.load(b"fake audio".to_vec());
        harness.engine.on_frame();
        harness.events.drain();
        harness
    }

    /// Advance the clock and run one frame
    pub fn frame_after(&mut self, seconds: f64) {
        self.clock.advance(seconds);
        self.engine.on_frame();
    }

    /// Run frames of `step` seconds until `seconds` have passed
    pub fn run_for(&mut self, seconds: f64, step: f64) {
        let frames = (seconds / step).round() as usize;
        for _ in 0..frames {
            self.frame_after(step);
        }
    }

    pub fn position_events(&self) -> Vec<f64> {
        self.events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                PlaybackEvent::PositionUpdate(sample) => Some(sample.elapsed_seconds),
                _ => None,
            })
            .collect()
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
