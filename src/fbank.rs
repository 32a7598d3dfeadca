//! Kaldi-style log-mel filter-bank feature extraction.
//!
//! Frames are taken wholly inside the waveform (no edge padding). Each frame
//! has its DC offset removed, is preemphasized and Povey-windowed, then goes
//! through an FFT sized to the next power of two. Triangular mel filters over
//! the power spectrum produce one energy per bin, floored and log-compressed.
//!
//! Input samples are expected at 16-bit integer amplitude scale, the same
//! convention Kaldi tooling uses. See [`crate::wav::to_int16_range`].

use std::f32::consts::PI;

use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

/// Configuration for filter-bank extraction.
#[derive(Debug, Clone)]
pub struct FbankConfig {
    /// Sample rate of the input waveform in Hz.
    pub sample_rate: u32,

    /// Analysis frame length in milliseconds.
    pub frame_length_ms: f32,

    /// Shift between successive frames in milliseconds.
    pub frame_shift_ms: f32,

    /// Number of triangular mel filters, one output column per filter.
    pub num_mel_bins: usize,

    /// Lowest band edge of the mel filters in Hz.
    pub low_freq: f32,

    /// Highest band edge of the mel filters in Hz. Zero or negative values
    /// are offsets from the Nyquist frequency.
    pub high_freq: f32,

    /// Preemphasis coefficient applied within each frame.
    pub preemphasis: f32,

    /// Whether to subtract each frame's mean before windowing.
    pub remove_dc_offset: bool,
}

impl Default for FbankConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_length_ms: 25.0,
            frame_shift_ms: 10.0,
            num_mel_bins: 80,
            low_freq: 20.0,
            high_freq: 0.0,
            preemphasis: 0.97,
            remove_dc_offset: true,
        }
    }
}

impl FbankConfig {
    /// Frame length in samples.
    pub fn frame_length(&self) -> usize {
        (self.sample_rate as f32 * self.frame_length_ms * 1e-3) as usize
    }

    /// Frame shift in samples.
    pub fn frame_shift(&self) -> usize {
        (self.sample_rate as f32 * self.frame_shift_ms * 1e-3) as usize
    }

    /// FFT size: the frame length rounded up to a power of two.
    pub fn fft_size(&self) -> usize {
        self.frame_length().next_power_of_two()
    }

    fn resolved_high_freq(&self) -> f32 {
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.high_freq > 0.0 {
            self.high_freq
        } else {
            nyquist + self.high_freq
        }
    }
}

/// Row-major matrix of per-frame features, frames by mel bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    fn with_capacity(cols: usize, rows_hint: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::with_capacity(cols * rows_hint),
        }
    }

    fn push_row(&mut self, row: &[f32]) {
        debug_assert_eq!(row.len(), self.cols);
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    /// Number of feature frames.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of mel bins per frame.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One frame's features.
    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * self.cols..(idx + 1) * self.cols]
    }

    /// The underlying row-major storage.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Extracts log-mel filter-bank features from a mono waveform.
///
/// The window and mel filters are precomputed at construction, so one
/// extractor can process any number of waveforms that share a sample rate.
#[derive(Debug)]
pub struct FbankExtractor {
    config: FbankConfig,
    window: Vec<f32>,
    filters: Vec<Vec<f32>>,
}

impl FbankExtractor {
    pub fn new(config: FbankConfig) -> Self {
        let window = povey_window(config.frame_length());
        let filters = mel_filterbank(&config);
        Self {
            config,
            window,
            filters,
        }
    }

    pub fn config(&self) -> &FbankConfig {
        &self.config
    }

    /// Extract features for `samples`.
    ///
    /// A waveform shorter than one frame produces a matrix with zero rows.
    /// Otherwise the row count is `1 + (len - frame_length) / frame_shift`.
    pub fn extract(&self, samples: &[f32]) -> FeatureMatrix {
        let frame_length = self.config.frame_length();
        let frame_shift = self.config.frame_shift();
        let fft_size = self.config.fft_size();

        let num_frames = if samples.len() < frame_length {
            0
        } else {
            1 + (samples.len() - frame_length) / frame_shift
        };

        let mut features = FeatureMatrix::with_capacity(self.config.num_mel_bins, num_frames);
        let mut frame = vec![0.0f32; frame_length];
        let mut spectrum = vec![Complex::new(0.0f32, 0.0); fft_size];
        let mut energies = vec![0.0f32; self.config.num_mel_bins];

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);

        for t in 0..num_frames {
            let start = t * frame_shift;
            frame.copy_from_slice(&samples[start..start + frame_length]);
            self.condition_frame(&mut frame);

            for (i, slot) in spectrum.iter_mut().enumerate() {
                *slot = if i < frame_length {
                    Complex::new(frame[i], 0.0)
                } else {
                    Complex::new(0.0, 0.0)
                };
            }
            fft.process(&mut spectrum);

            for (energy, filter) in energies.iter_mut().zip(&self.filters) {
                let power = spectrum
                    .iter()
                    .zip(filter.iter())
                    .map(|(c, weight)| (c.re * c.re + c.im * c.im) * weight)
                    .sum::<f32>();
                *energy = power.max(f32::EPSILON).ln();
            }
            features.push_row(&energies);
        }

        features
    }

    /// DC removal, preemphasis, and windowing, in that order.
    fn condition_frame(&self, frame: &mut [f32]) {
        if self.config.remove_dc_offset {
            let mean = frame.iter().sum::<f32>() / frame.len() as f32;
            for sample in frame.iter_mut() {
                *sample -= mean;
            }
        }

        if self.config.preemphasis != 0.0 {
            // In-place right to left so each sample sees its original neighbor.
            for i in (1..frame.len()).rev() {
                frame[i] -= self.config.preemphasis * frame[i - 1];
            }
            frame[0] -= self.config.preemphasis * frame[0];
        }

        for (sample, weight) in frame.iter_mut().zip(&self.window) {
            *sample *= weight;
        }
    }
}

/// The Kaldi "povey" window: a Hann window raised to the power 0.85.
fn povey_window(length: usize) -> Vec<f32> {
    let denom = (length - 1) as f32;
    (0..length)
        .map(|n| {
            let hann = 0.5 - 0.5 * (2.0 * PI * n as f32 / denom).cos();
            hann.powf(0.85)
        })
        .collect()
}

/// Frequency in Hz to the Kaldi mel scale.
fn mel_scale(freq: f32) -> f32 {
    1127.0 * (1.0 + freq / 700.0).ln()
}

/// Triangular mel filters over the non-negative FFT bins.
///
/// Mel band edges are spaced evenly between the configured low and high
/// cutoffs, filters `j` and `j + 1` overlapping at each interior edge. Each
/// filter row spans `fft_size / 2 + 1` columns; the Nyquist column stays zero.
fn mel_filterbank(config: &FbankConfig) -> Vec<Vec<f32>> {
    let fft_size = config.fft_size();
    let num_fft_bins = fft_size / 2;
    let fft_bin_width = config.sample_rate as f32 / fft_size as f32;

    let mel_low = mel_scale(config.low_freq);
    let mel_high = mel_scale(config.resolved_high_freq());
    let mel_delta = (mel_high - mel_low) / (config.num_mel_bins + 1) as f32;

    let mut filters = vec![vec![0.0f32; num_fft_bins + 1]; config.num_mel_bins];
    for (j, filter) in filters.iter_mut().enumerate() {
        let left = mel_low + j as f32 * mel_delta;
        let center = left + mel_delta;
        let right = center + mel_delta;

        for (k, weight) in filter.iter_mut().take(num_fft_bins).enumerate() {
            let mel = mel_scale(k as f32 * fft_bin_width);
            let up = (mel - left) / (center - left);
            let down = (right - mel) / (right - center);
            *weight = up.min(down).max(0.0);
        }
    }
    filters
}
