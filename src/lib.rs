//! `melprep` — batch preprocessing for paired video/transcript speech corpora.
//!
//! This crate provides:
//! - Manifest loading and record deduplication across dataset splits
//! - Subword tokenizer training with an on-disk artifact that later runs reload
//! - Video-to-waveform transcoding through the external `ffmpeg` binary
//! - Kaldi-style log-mel filter-bank feature extraction
//! - Per-record sample persistence with skip-if-present resumability
//!
//! The crate is driven end to end by the `melprep-cli` binary, but every stage
//! is a plain library call so tests and other frontends can run them directly.

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// Corpus metadata: manifests, on-disk layout, transcripts.
pub mod corpus;
pub mod manifest;

// Tokenizer training, caching, and transcript encoding.
pub mod tokenizer;

// Audio handling: transcoding, waveform loading, feature extraction.
pub mod fbank;
pub mod transcode;
pub mod wav;

// Sample assembly and persistence.
pub mod sample;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;
