/// Audio decoder implementation using Symphonia
use crate::error::{DesktopError, Result};
use crate::resample::prepare_for_device;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::io::Cursor;
use std::thread::{self, JoinHandle};
use symphonia::core::audio::{AudioBuffer, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};
use trill_playback::{DecodeCompletion, DecodeRequest, DecodedAudio, Decoder};

/// ITU-R BS.775-1 coefficient for center and surround channels (-3 dB)
const CENTER_MIX: f32 = 0.707;

/// Decoder running Symphonia on a dedicated worker thread
///
/// Supports: MP3, FLAC, OGG, WAV, AAC
///
/// `submit` never blocks; finished decodes are picked up with `poll` from
/// the host's frame loop. With an output rate set, the worker also resamples
/// each track to that rate, so the sink only has to start it.
pub struct SymphoniaDecoder {
    /// Requests to the worker
    request_tx: Sender<DecodeRequest>,
    /// Finished decodes from the worker
    completion_rx: Receiver<DecodeCompletion>,
    /// Completions produced locally when the worker is unreachable
    failed: VecDeque<DecodeCompletion>,
    /// Worker handle (dropped, not joined: a long decode must not block shutdown)
    _worker: Option<JoinHandle<()>>,
}

impl SymphoniaDecoder {
    /// Spawn a worker that keeps each track at its native rate
    pub fn new() -> Result<Self> {
        Self::spawn(None)
    }

    /// Spawn a worker that delivers interleaved stereo at `output_rate`
    pub fn with_output_rate(output_rate: u32) -> Result<Self> {
        Self::spawn(Some(output_rate))
    }

    fn spawn(output_rate: Option<u32>) -> Result<Self> {
        let (request_tx, request_rx) = unbounded::<DecodeRequest>();
        let (completion_tx, completion_rx) = unbounded::<DecodeCompletion>();

        let worker = thread::Builder::new()
            .name("trill-decoder".to_string())
            .spawn(move || Self::worker_run(output_rate, &request_rx, &completion_tx))
            .map_err(|e| DesktopError::ThreadError(e.to_string()))?;

        Ok(Self {
            request_tx,
            completion_rx,
            failed: VecDeque::new(),
            _worker: Some(worker),
        })
    }

    /// Worker main loop
    ///
    /// Only the newest queued request is decoded; older ones are superseded
    /// and the engine would drop their results anyway.
    fn worker_run(
        output_rate: Option<u32>,
        requests: &Receiver<DecodeRequest>,
        completions: &Sender<DecodeCompletion>,
    ) {
        while let Ok(mut request) = requests.recv() {
            while let Ok(newer) = requests.try_recv() {
                debug!(
                    "Skipping decode of generation {} (superseded by {})",
                    request.generation, newer.generation
                );
                request = newer;
            }

            let generation = request.generation;
            let result =
                decode_for_output(request.bytes, output_rate).map_err(|e| e.to_string());
            if completions
                .send(DecodeCompletion { generation, result })
                .is_err()
            {
                break;
            }
        }
        debug!("Decode worker exiting");
    }
}

impl Decoder for SymphoniaDecoder {
    fn submit(&mut self, request: DecodeRequest) {
        let generation = request.generation;
        if let Err(e) = self.request_tx.send(request) {
            warn!("Decode worker gone, failing generation {}", generation);
            self.failed.push_back(DecodeCompletion {
                generation,
                result: Err(DesktopError::ThreadError(e.to_string()).to_string()),
            });
        }
    }

    fn poll(&mut self) -> Option<DecodeCompletion> {
        self.failed
            .pop_front()
            .or_else(|| self.completion_rx.try_recv().ok())
    }
}

/// Decode, then resample when an output rate is given
fn decode_for_output(bytes: Vec<u8>, output_rate: Option<u32>) -> Result<DecodedAudio> {
    let audio = decode_bytes(bytes)?;
    match output_rate {
        Some(rate) if rate != audio.sample_rate || audio.channels != 2 => {
            let samples = prepare_for_device(&audio, rate)?;
            debug!("Resampled {} Hz -> {} Hz", audio.sample_rate, rate);
            Ok(DecodedAudio::new(samples, rate, 2))
        }
        _ => Ok(audio),
    }
}

/// Decode an in-memory file to interleaved stereo f32
///
/// The container is sniffed from the bytes. Multi-channel audio is downmixed
/// to stereo, mono is duplicated to both channels.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<DecodedAudio> {
    if bytes.is_empty() {
        return Err(DesktopError::DecodeError("empty input".to_string()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DesktopError::DecodeError(format!("Failed to probe input: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| DesktopError::DecodeError("No audio tracks found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DesktopError::DecodeError(format!("Failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupt packet, keep going
                warn!("Skipping malformed packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if sample_rate.is_none() {
            sample_rate = Some(spec.rate);
        }

        let mut buffer = AudioBuffer::<f32>::new(decoded.capacity() as u64, spec);
        decoded.convert(&mut buffer);
        downmix_to_stereo(&buffer, &mut samples);
    }

    let sample_rate = sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| DesktopError::DecodeError("Unknown sample rate".to_string()))?;

    if samples.is_empty() {
        return Err(DesktopError::DecodeError("No audio frames decoded".to_string()));
    }

    let audio = DecodedAudio::new(samples, sample_rate, 2);
    info!(
        "Decoded {} frames at {} Hz ({:.2}s)",
        audio.frames(),
        sample_rate,
        audio.duration_seconds()
    );
    Ok(audio)
}

/// Append `buf` to `output` as interleaved stereo
///
/// Layouts beyond stereo follow ITU-R BS.775-1:
/// - L_out = L + 0.707*C + 0.707*Ls
/// - R_out = R + 0.707*C + 0.707*Rs
///
/// For 5.1 (FL, FR, C, LFE, SL, SR) the LFE channel is dropped.
fn downmix_to_stereo(buf: &AudioBuffer<f32>, output: &mut Vec<f32>) {
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    output.reserve(frames * 2);

    match channels {
        0 => output.resize(output.len() + frames * 2, 0.0),
        1 => {
            let mono = buf.chan(0);
            for &sample in &mono[..frames] {
                let s = sample.clamp(-1.0, 1.0);
                output.push(s);
                output.push(s);
            }
        }
        _ => {
            let left = buf.chan(0);
            let right = buf.chan(1);
            let center = (channels == 3 || channels >= 5).then(|| buf.chan(2));
            let (surround_left, surround_right) = match channels {
                4 => (Some(buf.chan(2)), Some(buf.chan(3))),
                5 => (Some(buf.chan(3)), Some(buf.chan(4))),
                n if n >= 6 => (Some(buf.chan(4)), Some(buf.chan(5))),
                _ => (None, None),
            };

            for i in 0..frames {
                let c = center.map_or(0.0, |ch| ch[i] * CENTER_MIX);
                let sl = surround_left.map_or(0.0, |ch| ch[i] * CENTER_MIX);
                let sr = surround_right.map_or(0.0, |ch| ch[i] * CENTER_MIX);
                output.push((left[i] + c + sl).clamp(-1.0, 1.0));
                output.push((right[i] + c + sr).clamp(-1.0, 1.0));
            }
        }
    }
}
