//! Prepare decoded audio for the output device

use crate::error::{DesktopError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use trill_playback::DecodedAudio;

/// Interleaved stereo at `target_rate`, ready for the mixer
pub fn prepare_for_device(audio: &DecodedAudio, target_rate: u32) -> Result<Vec<f32>> {
    let stereo = to_stereo(audio);
    if audio.sample_rate == target_rate || stereo.is_empty() {
        return Ok(stereo);
    }
    resample_stereo(&stereo, audio.sample_rate, target_rate)
}

/// Mono is duplicated, channels past the second are dropped
fn to_stereo(audio: &DecodedAudio) -> Vec<f32> {
    match audio.channels {
        0 => Vec::new(),
        1 => audio.samples.iter().flat_map(|s| [*s, *s]).collect(),
        2 => audio.samples.clone(),
        n => audio
            .samples
            .chunks_exact(n as usize)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Resample interleaved stereo in one pass
fn resample_stereo(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 {
        return Err(DesktopError::ResampleError("source rate is zero".to_string()));
    }

    let frames = samples.len() / 2;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        target_rate as f64 / source_rate as f64,
        2.0,
        params,
        frames,
        2,
    )
    .map_err(|e| DesktopError::ResampleError(e.to_string()))?;

    // Deinterleave
    let mut deinterleaved = vec![Vec::with_capacity(frames); 2];
    for frame in samples.chunks_exact(2) {
        deinterleaved[0].push(frame[0]);
        deinterleaved[1].push(frame[1]);
    }

    let resampled = resampler
        .process(&deinterleaved, None)
        .map_err(|e| DesktopError::ResampleError(e.to_string()))?;

    // Interleave
    let output_frames = resampled[0].len();
    let mut interleaved = Vec::with_capacity(output_frames * 2);
    for (left, right) in resampled[0].iter().zip(&resampled[1]) {
        interleaved.push(*left);
        interleaved.push(*right);
    }

    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_stereo_is_untouched() {
        let audio = DecodedAudio::new(vec![0.1, 0.2, 0.3, 0.4], 48000, 2);
        assert_eq!(prepare_for_device(&audio, 48000).unwrap(), audio.samples);
    }

    #[test]
    fn mono_is_duplicated() {
        let audio = DecodedAudio::new(vec![0.1, 0.2], 48000, 1);
        assert_eq!(
            prepare_for_device(&audio, 48000).unwrap(),
            vec![0.1, 0.1, 0.2, 0.2]
        );
    }

    #[test]
    fn surround_keeps_front_pair() {
        let audio = DecodedAudio::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 48000, 3);
        assert_eq!(
            prepare_for_device(&audio, 48000).unwrap(),
            vec![1.0, 2.0, 4.0, 5.0]
        );
    }

    #[test]
    fn upsampling_doubles_length() {
        let frames = 22050;
        let samples: Vec<f32> = (0..frames)
            .flat_map(|i| {
                let s = (i as f32 * 440.0 * std::f32::consts::TAU / 22050.0).sin() * 0.5;
                [s, s]
            })
            .collect();
        let audio = DecodedAudio::new(samples, 22050, 2);

        let out = prepare_for_device(&audio, 44100).unwrap();
        let out_frames = out.len() / 2;
        assert!(
            (out_frames as f64 - 44100.0).abs() < 44100.0 * 0.05,
            "got {out_frames} frames"
        );
    }
}
