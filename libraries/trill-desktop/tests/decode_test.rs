//! Decoder tests against WAV files generated in memory

use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::thread;
use std::time::{Duration, Instant};
use trill_desktop::{decode_bytes, DesktopError, SymphoniaDecoder};
use trill_playback::{
    Collaborators, DecodeCompletion, DecodeRequest, Decoder, EngineState, EventLog,
    FrameScheduler, GainRamp, Intent, ManualClock, PlaybackEngine, PlaybackEvent, PlayerConfig,
    Sink, SourceId, TrackHandle,
};

// ===== Test Helpers =====

/// Sine wave as WAV bytes
fn sine_wav(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 16384.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    bytes
}

fn wait_for(decoder: &mut SymphoniaDecoder) -> DecodeCompletion {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(completion) = decoder.poll() {
            return completion;
        }
        assert!(Instant::now() < deadline, "decoder never answered");
        thread::sleep(Duration::from_millis(5));
    }
}

/// Sink that accepts everything
struct AcceptingSink(u64);

impl Sink for AcceptingSink {
    fn connect(&mut self, _: &TrackHandle, _: f64) -> trill_playback::Result<SourceId> {
        self.0 += 1;
        Ok(SourceId(self.0))
    }

    fn stop(&mut self, _: SourceId) -> trill_playback::Result<()> {
        Ok(())
    }

    fn set_gain(&mut self, _: f32, _: GainRamp) -> trill_playback::Result<()> {
        Ok(())
    }

    fn set_pan(&mut self, _: f32) -> trill_playback::Result<()> {
        Ok(())
    }
}

// ===== Direct Decoding =====

#[test]
fn test_decode_stereo_wav() {
    let audio = decode_bytes(sine_wav(44100, 2, 1.0)).unwrap();

    assert_eq!(audio.sample_rate, 44100);
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.frames(), 44100);
    assert!((audio.duration_seconds() - 1.0).abs() < 1e-6);
    assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn test_decode_mono_duplicates_channels() {
    let audio = decode_bytes(sine_wav(8000, 1, 0.5)).unwrap();

    assert_eq!(audio.channels, 2);
    assert_eq!(audio.frames(), 4000);
    for frame in audio.samples.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
    }
    // Not silence
    assert!(audio.samples.iter().any(|s| s.abs() > 0.1));
}

#[test]
fn test_decode_truncated_header_fails() {
    let mut bytes = sine_wav(8000, 1, 0.1);
    bytes.truncate(20);

    assert!(matches!(
        decode_bytes(bytes),
        Err(DesktopError::DecodeError(_))
    ));
}

// ===== Worker =====

#[test]
fn test_worker_decodes_and_tags_generation() {
    let mut decoder = SymphoniaDecoder::new().unwrap();
    decoder.submit(DecodeRequest {
        generation: 3,
        bytes: sine_wav(22050, 2, 0.25),
    });

    let completion = wait_for(&mut decoder);
    assert_eq!(completion.generation, 3);
    let audio = completion.result.unwrap();
    assert_eq!(audio.sample_rate, 22050);
    assert!((audio.duration_seconds() - 0.25).abs() < 1e-3);
}

#[test]
fn test_worker_resamples_to_output_rate() {
    let mut decoder = SymphoniaDecoder::with_output_rate(48000).unwrap();
    decoder.submit(DecodeRequest {
        generation: 1,
        bytes: sine_wav(44100, 1, 0.5),
    });

    let audio = wait_for(&mut decoder).result.unwrap();
    assert_eq!(audio.sample_rate, 48000);
    assert_eq!(audio.channels, 2);
    assert!(
        (audio.duration_seconds() - 0.5).abs() < 0.025,
        "got {}s",
        audio.duration_seconds()
    );
    assert!(audio.samples.iter().any(|s| s.abs() > 0.1));
}

#[test]
fn test_worker_keeps_matching_rate() {
    let mut decoder = SymphoniaDecoder::with_output_rate(8000).unwrap();
    decoder.submit(DecodeRequest {
        generation: 1,
        bytes: sine_wav(8000, 2, 0.25),
    });

    let audio = wait_for(&mut decoder).result.unwrap();
    assert_eq!(audio.sample_rate, 8000);
    assert_eq!(audio.frames(), 2000);
}

#[test]
fn test_worker_answers_latest_request() {
    let mut decoder = SymphoniaDecoder::new().unwrap();
    for generation in 1..=3 {
        decoder.submit(DecodeRequest {
            generation,
            bytes: sine_wav(8000, 1, 0.1),
        });
    }

    // Older requests may be skipped, the newest one always answers
    let mut seen = Vec::new();
    while seen.last() != Some(&3) {
        seen.push(wait_for(&mut decoder).generation);
    }
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

// ===== Engine Round Trip =====

#[test]
fn test_engine_plays_decoded_wav_to_end() {
    let clock = ManualClock::default();
    let events = EventLog::new();
    let mut engine = PlaybackEngine::new(
        PlayerConfig::default(),
        Collaborators {
            clock: Box::new(clock.clone()),
            scheduler: Box::new(FrameScheduler::new()),
            sink: Box::new(AcceptingSink(0)),
            decoder: Box::new(SymphoniaDecoder::new().unwrap()),
            output: Box::new(events.clone()),
        },
    );

    engine
        .dispatch(Intent::LoadFile(sine_wav(8000, 2, 2.0)))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while engine.state() == EngineState::Empty {
        assert!(Instant::now() < deadline, "decode never landed");
        engine.on_frame();
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(engine.state(), EngineState::Playing);
    assert!(events
        .drain()
        .contains(&PlaybackEvent::DurationKnown { seconds: 2.0 }));

    for _ in 0..8 {
        clock.advance(0.25);
        engine.on_frame();
    }

    assert_eq!(engine.state(), EngineState::Ended);
    assert!((engine.elapsed() - 2.0).abs() < 1e-9);
}
