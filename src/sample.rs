//! The per-record sample artifact: what one corpus record becomes on disk.
//!
//! Samples are serialized with `bincode`. The artifact's existence doubles as
//! the pipeline's resume marker, so we write it only after every stage for the
//! record has succeeded.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fbank::FeatureMatrix;

/// One fully preprocessed corpus record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Log-mel filter-bank features, frames by mel bins.
    pub audio_features: FeatureMatrix,

    /// Sample rate of the waveform the features were extracted from, in Hz.
    pub sample_rate: u32,

    /// Token IDs of the transcript, wrapped in begin/end markers.
    pub tokens: Vec<u32>,
}

impl Sample {
    /// Serialize this sample to `path`, creating parent directories as needed.
    ///
    /// Record IDs may contain path separators, so the sample for
    /// `spk/00001` lands in a `spk/` subdirectory of the output root.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create sample directory '{}'", parent.display())
                })?;
            }
        }

        let bytes = bincode::serialize(self).context("failed to serialize sample")?;
        fs::write(path, bytes)
            .with_context(|| format!("failed to write sample '{}'", path.display()))?;
        Ok(())
    }

    /// Deserialize a sample previously written by [`Sample::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read sample '{}'", path.display()))?;
        bincode::deserialize(&bytes)
            .with_context(|| format!("failed to decode sample '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fbank::{FbankConfig, FbankExtractor};

    fn small_sample() -> Sample {
        let extractor = FbankExtractor::new(FbankConfig::default());
        let ramp: Vec<f32> = (0..480).map(|n| n as f32).collect();
        Sample {
            audio_features: extractor.extract(&ramp),
            sample_rate: 16_000,
            tokens: vec![2, 17, 3],
        }
    }

    #[test]
    fn round_trips_through_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("00001.bin");

        let sample = small_sample();
        sample.write(&path)?;
        assert_eq!(Sample::load(&path)?, sample);
        Ok(())
    }

    #[test]
    fn creates_nested_parent_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("6300370419826092098/00001.bin");

        small_sample().write(&path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn rejects_truncated_artifacts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.bin");
        fs::write(&path, [0u8, 1, 2])?;

        assert!(Sample::load(&path).is_err());
        Ok(())
    }
}
