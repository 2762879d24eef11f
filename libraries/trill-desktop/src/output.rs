/// CPAL-based sink (audio thread owns the stream)
use crate::error::{DesktopError, Result};
use crate::mixer::Mixer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use trill_playback::{DecodedAudio, GainRamp, PlaybackError, Sink, SourceId, TrackHandle};

/// Commands sent to the audio thread
enum AudioCommand {
    /// Start a new source at `start_frame`
    Start {
        source: SourceId,
        audio: Arc<DecodedAudio>,
        start_frame: usize,
    },
    /// Stop a source (ignored if already replaced)
    Stop(SourceId),
    /// Gain (0.0 - 1.0), ramped over `ramp_frames`
    SetGain { gain: f32, ramp_frames: u32 },
    /// Pan (-1.0 - 1.0)
    SetPan(f32),
    /// Shutdown the audio thread
    Shutdown,
}

/// CPAL audio sink
///
/// Implements [`Sink`] on the default output device. Tracks must already be
/// interleaved stereo at [`CpalSink::sample_rate`]; pair the sink with
/// [`crate::SymphoniaDecoder::with_output_rate`] so that work happens on the
/// decode worker.
///
/// **Architecture**: A dedicated audio thread owns the CPAL `Stream`, which is
/// not `Send` on every platform. The engine side talks to it over a channel;
/// the stream callback renders from a shared [`Mixer`].
pub struct CpalSink {
    /// Channel to send commands to the audio thread
    command_tx: Sender<AudioCommand>,
    /// Sample rate of the output device
    sample_rate: u32,
    /// Next source id to hand out
    next_source: u64,
    /// Source the sink believes is live
    live: Option<SourceId>,
    /// Handle to the audio thread
    _audio_thread: Option<JoinHandle<()>>,
}

impl CpalSink {
    /// Open the default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or the stream cannot start
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DesktopError::DeviceNotFound)?;

        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate();
        let config = config.config();

        Self::with_device_and_config(device, config, sample_rate)
    }

    fn with_device_and_config(
        device: Device,
        config: StreamConfig,
        sample_rate: u32,
    ) -> Result<Self> {
        let (command_tx, command_rx) = bounded::<AudioCommand>(64);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let audio_thread = thread::Builder::new()
            .name("trill-audio".to_string())
            .spawn(move || Self::audio_thread_run(&device, &config, &command_rx, &ready_tx))
            .map_err(|e| DesktopError::ThreadError(e.to_string()))?;

        // Wait for the stream to come up
        ready_rx
            .recv()
            .map_err(|e| DesktopError::ThreadError(e.to_string()))??;

        info!("Audio output running at {} Hz", sample_rate);

        Ok(Self {
            command_tx,
            sample_rate,
            next_source: 0,
            live: None,
            _audio_thread: Some(audio_thread),
        })
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Audio thread main loop
    ///
    /// Builds the stream, reports readiness, then applies commands to the
    /// shared mixer until shutdown.
    fn audio_thread_run(
        device: &Device,
        config: &StreamConfig,
        command_rx: &Receiver<AudioCommand>,
        ready_tx: &Sender<Result<()>>,
    ) {
        let mixer = Arc::new(Mutex::new(Mixer::new(1.0)));

        let stream = match Self::build_stream(device, config, Arc::clone(&mixer)) {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to start audio stream: {}", e);
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let _ = ready_tx.send(Ok(()));

        while let Ok(cmd) = command_rx.recv() {
            let mut mixer = mixer.lock().unwrap_or_else(PoisonError::into_inner);
            match cmd {
                AudioCommand::Start {
                    source,
                    audio,
                    start_frame,
                } => mixer.start(source, audio, start_frame),
                AudioCommand::Stop(source) => {
                    if !mixer.stop(source) {
                        debug!("{:?} was no longer live", source);
                    }
                }
                AudioCommand::SetGain { gain, ramp_frames } => mixer.set_gain(gain, ramp_frames),
                AudioCommand::SetPan(value) => mixer.set_pan(value),
                AudioCommand::Shutdown => break,
            }
        }

        drop(stream);
        debug!("Audio thread exiting");
    }

    fn build_stream(
        device: &Device,
        config: &StreamConfig,
        mixer: Arc<Mutex<Mixer>>,
    ) -> Result<Stream> {
        let channels = config.channels as usize;
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mixer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .render(data, channels);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }

    fn send(&self, cmd: AudioCommand) -> trill_playback::Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| PlaybackError::from(DesktopError::ThreadError(e.to_string())))
    }

    fn ramp_frames(&self, ramp: GainRamp) -> u32 {
        match ramp {
            GainRamp::Immediate => 0,
            GainRamp::Smoothed { millis } => {
                (u64::from(millis) * u64::from(self.sample_rate) / 1000) as u32
            }
        }
    }
}

impl Sink for CpalSink {
    fn connect(
        &mut self,
        track: &TrackHandle,
        offset_seconds: f64,
    ) -> trill_playback::Result<SourceId> {
        if let Some(live) = self.live {
            return Err(PlaybackError::InvalidOperation(format!(
                "{:?} is still live",
                live
            )));
        }

        check_device_format(track.audio(), self.sample_rate)?;
        let start_frame = (offset_seconds.max(0.0) * f64::from(self.sample_rate)).round() as usize;

        self.next_source += 1;
        let source = SourceId(self.next_source);
        self.send(AudioCommand::Start {
            source,
            audio: Arc::clone(track.audio()),
            start_frame,
        })?;
        self.live = Some(source);
        Ok(source)
    }

    fn stop(&mut self, source: SourceId) -> trill_playback::Result<()> {
        if self.live != Some(source) {
            return Err(PlaybackError::InvalidOperation(format!(
                "{:?} is not live",
                source
            )));
        }
        self.live = None;
        self.send(AudioCommand::Stop(source))
    }

    fn set_gain(&mut self, gain: f32, ramp: GainRamp) -> trill_playback::Result<()> {
        if !(0.0..=1.0).contains(&gain) {
            return Err(PlaybackError::InvalidParameter(format!(
                "gain {gain} outside 0.0-1.0"
            )));
        }
        let ramp_frames = self.ramp_frames(ramp);
        self.send(AudioCommand::SetGain { gain, ramp_frames })
    }

    fn set_pan(&mut self, pan: f32) -> trill_playback::Result<()> {
        self.send(AudioCommand::SetPan(pan.clamp(-1.0, 1.0)))
    }
}

/// The mixer plays interleaved stereo at the device rate and nothing else
fn check_device_format(audio: &DecodedAudio, device_rate: u32) -> Result<()> {
    if audio.channels == 2 && audio.sample_rate == device_rate {
        Ok(())
    } else {
        Err(DesktopError::FormatMismatch {
            channels: audio.channels,
            rate: audio.sample_rate,
            device_rate,
        })
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        if self.command_tx.send(AudioCommand::Shutdown).is_err() {
            warn!("Audio thread already gone");
        }
    }
}
