use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec};

/// Scale between normalized samples and 16-bit integer amplitudes.
///
/// Loading divides by this and [`to_int16_range`] multiplies by it, so the
/// round trip recovers the exact integer amplitudes stored in the file.
pub const INT16_SCALE: f32 = 32_768.0;

/// Load a WAV file and return normalized audio samples.
///
/// What we return:
/// - A `Vec<f32>` containing audio samples normalized to `[-1.0, 1.0]`
/// - The associated `WavSpec` so callers keep the sample rate and metadata
///
/// Format requirements:
/// - Mono (1 channel)
/// - 16-bit integer PCM
///
/// Transcoded waveforms always satisfy both, since the transcoder requests
/// mono `pcm_s16le` output.
pub fn read_waveform(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to open waveform '{}'", path.display()))?;
    let spec = reader.spec();

    // We require mono audio.
    if spec.channels != 1 {
        anyhow::bail!(
            "expected mono WAV (1 channel), got {} channels in '{}'",
            spec.channels,
            path.display()
        );
    }

    // We require 16-bit integer PCM.
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        anyhow::bail!(
            "expected 16-bit integer PCM, got {}-bit {:?} in '{}'",
            spec.bits_per_sample,
            spec.sample_format,
            path.display()
        );
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i16>() {
        let pcm = sample
            .with_context(|| format!("failed to read samples from '{}'", path.display()))?;
        samples.push(pcm as f32 / INT16_SCALE);
    }

    Ok((samples, spec))
}

/// Rescale normalized samples back to the 16-bit integer amplitude range.
///
/// Filter-bank extraction consumes samples at this scale; it matches what the
/// waveform stored on disk.
pub fn to_int16_range(samples: &[f32]) -> Vec<f32> {
    samples.iter().map(|sample| sample * INT16_SCALE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn round_trips_exact_integer_amplitudes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");

        let pcm: [i16; 5] = [0, 1, -1, i16::MAX, i16::MIN];
        let mut writer = hound::WavWriter::create(&path, mono_spec(16_000))?;
        for sample in pcm {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        let (samples, spec) = read_waveform(&path)?;
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(samples.len(), pcm.len());

        let rescaled = to_int16_range(&samples);
        for (restored, original) in rescaled.iter().zip(pcm) {
            assert_eq!(*restored, original as f32);
        }
        Ok(())
    }

    #[test]
    fn rejects_stereo_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");

        let spec = WavSpec {
            channels: 2,
            ..mono_spec(16_000)
        };
        let mut writer = hound::WavWriter::create(&path, spec)?;
        writer.write_sample(0i16)?;
        writer.write_sample(0i16)?;
        writer.finalize()?;

        let err = read_waveform(&path).unwrap_err();
        assert!(err.to_string().contains("mono"));
        Ok(())
    }

    #[test]
    fn normalized_samples_stay_in_unit_range() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("extremes.wav");

        let mut writer = hound::WavWriter::create(&path, mono_spec(8_000))?;
        writer.write_sample(i16::MAX)?;
        writer.write_sample(i16::MIN)?;
        writer.finalize()?;

        let (samples, spec) = read_waveform(&path)?;
        assert_eq!(spec.sample_rate, 8_000);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        Ok(())
    }
}
