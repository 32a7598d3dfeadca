//! High-level API for running the preprocessing pipeline.
//!
//! We expose a single entry point (`run`) that wires the lower-level pieces
//! together for every record: transcript reading and encoding, video
//! transcoding, waveform loading, and filter-bank extraction.
//!
//! The intent is:
//! - A record whose sample artifact already exists is skipped untouched.
//! - A record is processed completely or not at all; the artifact is written
//!   last, so an interrupted run resumes exactly where it stopped.
//! - The first failing record aborts the run with context naming it.
//!
//! This module is deliberately "high level": each stage stays testable in its
//! own module, and the transcoder seam lets tests run the whole pipeline
//! without ffmpeg installed.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tokenizers::Tokenizer;

use crate::fbank::{FbankConfig, FbankExtractor};
use crate::opts::Opts;
use crate::sample::Sample;
use crate::tokenizer;
use crate::transcode::Transcoder;
use crate::wav;

/// Counts reported by one pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Records turned into new sample artifacts by this run.
    pub processed: usize,

    /// Records skipped because their sample artifact already existed.
    pub skipped: usize,
}

/// Process every record in `records`, writing one sample artifact each.
///
/// Records are visited in the set's order. For each record without an
/// existing artifact we:
/// - read and encode its transcript (cheap, so transcript problems surface
///   before any transcoding work happens)
/// - transcode its video to a mono waveform next to the video file
/// - load the waveform, rescale to integer amplitudes, and extract features
/// - persist the assembled sample under the output directory
pub fn run<T: Transcoder>(
    opts: &Opts,
    records: &BTreeSet<String>,
    tokenizer: &Tokenizer,
    transcoder: &T,
) -> Result<Summary> {
    let layout = opts.layout();
    let mut summary = Summary::default();

    for id in records {
        let sample_path = layout.sample_path(id);
        if sample_path.exists() {
            tracing::debug!(record = %id, "sample exists, skipping");
            summary.skipped += 1;
            continue;
        }

        let text = layout
            .read_transcript(id)
            .with_context(|| format!("record '{id}'"))?;
        let tokens = tokenizer::encode_transcript(tokenizer, &text)
            .with_context(|| format!("record '{id}'"))?;

        let video = layout.video_path(id);
        let waveform_path = layout.waveform_path(id);
        transcoder
            .to_waveform(&video, &waveform_path)
            .with_context(|| format!("failed to transcode '{}'", video.display()))?;

        let (waveform, spec) = wav::read_waveform(&waveform_path)
            .with_context(|| format!("record '{id}'"))?;

        // Frame geometry and mel cutoffs follow the waveform's own rate.
        let extractor = FbankExtractor::new(FbankConfig {
            sample_rate: spec.sample_rate,
            num_mel_bins: opts.num_mel_bins,
            ..FbankConfig::default()
        });
        let features = extractor.extract(&wav::to_int16_range(&waveform));

        tracing::info!(
            record = %id,
            waveform_len = waveform.len(),
            sample_rate = spec.sample_rate,
            frames = features.rows(),
            bins = features.cols(),
            "processed record"
        );

        let sample = Sample {
            audio_features: features,
            sample_rate: spec.sample_rate,
            tokens,
        };
        sample.write(&sample_path)?;
        summary.processed += 1;
    }

    Ok(summary)
}
