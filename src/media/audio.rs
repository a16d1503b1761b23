//! Audio normalization: mono, 16 kHz, 16-bit PCM WAV

use std::io::Cursor;

use ndarray::{ArrayView2, Axis, Ix1, Ix2, Ix3};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{NodeError, Result};
use crate::types::AudioContainer;

/// Sample rate expected by the vendor API for audio parts
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// MIME type of the normalized payload
pub const WAV_MIME_TYPE: &str = "audio/wav";

const RESAMPLE_CHUNK_SIZE: usize = 1024;

/// Split the waveform into per-channel sample vectors
///
/// Accepted layouts: `(samples)`, `(channels, samples)`, `(1, channels, samples)`.
pub fn split_channels(container: &AudioContainer) -> Result<Vec<Vec<f32>>> {
    let waveform = container.waveform.view();
    let shape = waveform.shape().to_vec();

    let rows = |view: ArrayView2<'_, f32>| -> Vec<Vec<f32>> {
        view.axis_iter(Axis(0)).map(|row| row.to_vec()).collect()
    };

    let channels = match shape.len() {
        1 => {
            let mono = waveform
                .into_dimensionality::<Ix1>()
                .map_err(|e| NodeError::UnsupportedAudioShape(e.to_string()))?;
            vec![mono.to_vec()]
        }
        2 => rows(
            waveform
                .into_dimensionality::<Ix2>()
                .map_err(|e| NodeError::UnsupportedAudioShape(e.to_string()))?,
        ),
        3 if shape[0] == 1 => {
            let batch = waveform
                .into_dimensionality::<Ix3>()
                .map_err(|e| NodeError::UnsupportedAudioShape(e.to_string()))?;
            rows(batch.index_axis_move(Axis(0), 0))
        }
        _ => {
            return Err(NodeError::UnsupportedAudioShape(format!(
                "expected (samples), (channels, samples) or (1, channels, samples), got {shape:?}"
            )));
        }
    };

    if channels.is_empty() {
        return Err(NodeError::UnsupportedAudioShape(format!(
            "waveform has no channels: {shape:?}"
        )));
    }
    Ok(channels)
}

/// Average all channels into one
pub fn downmix(channels: &[Vec<f32>]) -> Vec<f32> {
    match channels {
        [] => Vec::new(),
        [mono] => mono.clone(),
        _ => {
            let len = channels.iter().map(Vec::len).min().unwrap_or(0);
            let count = channels.len() as f32;
            (0..len)
                .map(|i| channels.iter().map(|c| c[i]).sum::<f32>() / count)
                .collect()
        }
    }
}

/// Resample a mono signal with a windowed-sinc interpolator
///
/// Output length is `ceil(len * to / from)`; the resampler's group delay is
/// trimmed from the front.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let parameters = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, parameters, RESAMPLE_CHUNK_SIZE, 1)
        .map_err(|e| NodeError::AudioCodec(format!("Failed to create resampler: {e}")))?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(expected + delay);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK_SIZE);
    for chunk in &mut chunks {
        let frames = resampler
            .process(&[chunk], None)
            .map_err(|e| NodeError::AudioCodec(format!("Resampling failed: {e}")))?;
        output.extend_from_slice(&frames[0]);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let frames = resampler
            .process_partial(Some(&[tail][..]), None)
            .map_err(|e| NodeError::AudioCodec(format!("Resampling failed: {e}")))?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the delay line.
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| NodeError::AudioCodec(format!("Resampling failed: {e}")))?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    Ok(output.into_iter().skip(delay).take(expected).collect())
}

/// Write mono samples as 16-bit little-endian PCM WAV
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Collapse to mono, resample to 16 kHz and serialize as WAV
pub fn normalize_audio(container: &AudioContainer) -> Result<Vec<u8>> {
    if container.sample_rate == 0 {
        return Err(NodeError::UnsupportedAudioShape(
            "sample rate must be positive".to_string(),
        ));
    }

    let channels = split_channels(container)?;
    let mono = downmix(&channels);
    let resampled = resample(&mono, container.sample_rate, TARGET_SAMPLE_RATE)?;

    tracing::debug!(
        source_channels = channels.len(),
        source_rate = container.sample_rate,
        source_samples = mono.len(),
        output_samples = resampled.len(),
        "normalized audio"
    );

    encode_wav(&resampled, TARGET_SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3, ArrayD, IxDyn};

    fn sine(len: usize, rate: u32, freq: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_stereo_44100_normalizes_to_mono_16k() {
        let len = 44_100;
        let left = sine(len, 44_100, 440.0);
        let right = sine(len, 44_100, 660.0);
        let mut stereo = Array2::<f32>::zeros((2, len));
        stereo.row_mut(0).assign(&Array1::from(left));
        stereo.row_mut(1).assign(&Array1::from(right));

        let container = AudioContainer::new(stereo.into_dyn(), 44_100);
        let wav = normalize_audio(&container).unwrap();

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        let frames = reader.duration() as i64;
        assert!((frames - 16_000).abs() <= 1, "got {frames} frames");
    }

    #[test]
    fn test_mono_16k_passes_through() {
        let samples = vec![0.0, 0.5, -0.5, 1.0];
        let container = AudioContainer::new(Array1::from(samples).into_dyn(), 16_000);
        let wav = normalize_audio(&container).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 16384, -16384, i16::MAX]);
    }

    #[test]
    fn test_batched_layout_accepted() {
        let batched = Array3::<f32>::zeros((1, 2, 100));
        let channels = split_channels(&AudioContainer::new(batched.into_dyn(), 16_000)).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].len(), 100);
    }

    #[test]
    fn test_downmix_averages_channels() {
        let mixed = downmix(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(mixed, vec![2.0, 3.0]);
    }

    #[test]
    fn test_unsupported_layouts() {
        let batch_of_two = AudioContainer::new(ArrayD::zeros(IxDyn(&[2, 2, 10])), 16_000);
        assert!(matches!(
            normalize_audio(&batch_of_two),
            Err(NodeError::UnsupportedAudioShape(_))
        ));

        let no_channels = AudioContainer::new(ArrayD::zeros(IxDyn(&[0, 10])), 16_000);
        assert!(matches!(
            normalize_audio(&no_channels),
            Err(NodeError::UnsupportedAudioShape(_))
        ));

        let zero_rate = AudioContainer::new(ArrayD::zeros(IxDyn(&[10])), 0);
        assert!(matches!(
            normalize_audio(&zero_rate),
            Err(NodeError::UnsupportedAudioShape(_))
        ));
    }

    #[test]
    fn test_resample_length() {
        let input = sine(8_000, 8_000, 100.0);
        let output = resample(&input, 8_000, 16_000).unwrap();
        assert_eq!(output.len(), 16_000);
    }
}
