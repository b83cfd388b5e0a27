use std::{cmp::Ordering, f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use crate::{config::AnalysisConfig, Result, VisualiserError};

/// Summary of the analysis metadata accumulated so far.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalysisSummary {
    pub sample_rate: u32,
    pub duration_seconds: Option<f32>,
    pub peak_level: f32,
}

/// Representation of the feature set for a single timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisFrame {
    pub time: f32,
    /// Smoothed RMS level of the block, nominally in `[0, 1]`.
    pub level: f32,
    /// Byte-scaled magnitude spectrum: one value per bin, 0 at
    /// `min_decibels` and 255 at `max_decibels`.
    pub spectrum: Vec<u8>,
    /// The most recent `2 * bins` samples, oldest first, in `[-1, 1]` for
    /// normalised input.
    pub waveform: Vec<f32>,
}

/// Level meter and spectrum analyser driven by blocks of mono samples.
///
/// The spectrum is always computed over the most recent `2 * bins` samples,
/// so blocks of any length can be pushed; history before the first block is
/// treated as silence.
pub struct AnalysisEngine {
    config: AnalysisConfig,
    summary: AnalysisSummary,
    frames: Vec<AnalysisFrame>,
    processed_samples: usize,
    level: f32,
    history: Vec<f32>,
    smoothed: Vec<f32>,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl AnalysisEngine {
    /// Creates a new engine after validating `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let fft_size = config.fft_size();
        let bins = config.bins;
        Ok(Self {
            summary: AnalysisSummary {
                sample_rate: config.sample_rate,
                ..Default::default()
            },
            config,
            frames: Vec::new(),
            processed_samples: 0,
            level: 0.0,
            history: vec![0.0; fft_size],
            smoothed: vec![0.0; bins],
            fft_planner: RealFftPlanner::new(),
            fft: None,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns metadata collected so far about the analysed stream.
    pub fn summary(&self) -> &AnalysisSummary {
        &self.summary
    }

    /// Clears the accumulated state while preserving configuration.
    pub fn reset(&mut self) {
        self.summary = AnalysisSummary {
            sample_rate: self.config.sample_rate,
            ..Default::default()
        };
        self.frames.clear();
        self.processed_samples = 0;
        self.level = 0.0;
        self.history.fill(0.0);
        self.smoothed.fill(0.0);
    }

    /// Consumes audio samples and updates the tracked features.
    pub fn process_block(&mut self, samples: &[f32]) -> Result<AnalysisFrame> {
        if samples.is_empty() {
            return Err(VisualiserError::InvalidInput(
                "analysis requires at least one sample",
            ));
        }

        let block_size = samples.len();
        let sample_rate = self.config.sample_rate as f32;
        let start_time = self.processed_samples as f32 / sample_rate;
        let end_time = (self.processed_samples + block_size) as f32 / sample_rate;
        let timestamp = start_time + (end_time - start_time) * 0.5;

        let rms = compute_rms(samples);
        self.level = rms.max(self.level * self.config.level_smoothing);
        self.push_history(samples);
        let spectrum = self.compute_spectrum()?;

        self.processed_samples += block_size;
        self.summary.duration_seconds = Some(
            self.summary
                .duration_seconds
                .map(|d| d.max(end_time))
                .unwrap_or(end_time),
        );
        self.summary.peak_level = self.summary.peak_level.max(self.level);

        let frame = AnalysisFrame {
            time: timestamp,
            level: self.level,
            spectrum,
            waveform: self.history.clone(),
        };

        tracing::trace!(time = frame.time, level = frame.level, "analysed block");
        self.frames.push(frame.clone());
        Ok(frame)
    }

    /// Returns the latest frame emitted by the engine, if any.
    pub fn latest_frame(&self) -> Option<&AnalysisFrame> {
        self.frames.last()
    }

    /// Returns all recorded frames.
    pub fn frames(&self) -> &[AnalysisFrame] {
        &self.frames
    }

    /// Samples the feature set at (or before) the requested time. If no frame
    /// exists before the timestamp a silent frame is returned.
    pub fn sample_at(&self, time: f32) -> AnalysisFrame {
        match self
            .frames
            .binary_search_by(|frame| frame.time.partial_cmp(&time).unwrap_or(Ordering::Equal))
        {
            Ok(index) => self.frames[index].clone(),
            Err(0) => AnalysisFrame {
                time,
                spectrum: vec![0; self.config.bins],
                waveform: vec![0.0; self.config.fft_size()],
                ..Default::default()
            },
            Err(index) => self.frames[index - 1].clone(),
        }
    }

    fn push_history(&mut self, samples: &[f32]) {
        let size = self.history.len();
        if samples.len() >= size {
            self.history.copy_from_slice(&samples[samples.len() - size..]);
        } else {
            let keep = size - samples.len();
            self.history.copy_within(samples.len().., 0);
            self.history[keep..].copy_from_slice(samples);
        }
    }

    fn compute_spectrum(&mut self) -> Result<Vec<u8>> {
        let size = self.config.fft_size();
        let fft = prepare_fft(&mut self.fft, &mut self.fft_planner, size);

        let windowed = self.history.iter().zip(&fft.window);
        for (slot, (sample, weight)) in fft.input.iter_mut().zip(windowed) {
            *slot = sample * weight;
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        let tau = self.config.smoothing;
        let min_db = self.config.min_decibels;
        let byte_scale = 255.0 / (self.config.max_decibels - min_db);
        let norm = 1.0 / size as f32;

        let mut bytes = Vec::with_capacity(self.config.bins);
        for (bin, previous) in fft.spectrum.iter().zip(self.smoothed.iter_mut()) {
            let magnitude = bin.norm() * norm;
            let mut value = tau * *previous + (1.0 - tau) * magnitude;
            if !value.is_finite() {
                value = 0.0;
            }
            *previous = value;

            let db = if value > 0.0 {
                20.0 * value.log10()
            } else {
                f32::NEG_INFINITY
            };
            bytes.push((byte_scale * (db - min_db)).floor().clamp(0.0, 255.0) as u8);
        }

        Ok(bytes)
    }
}

fn prepare_fft<'a>(
    slot: &'a mut Option<FftResources>,
    planner: &mut RealFftPlanner<f32>,
    size: usize,
) -> &'a mut FftResources {
    if slot.as_ref().map(|fft| fft.size != size).unwrap_or(false) {
        *slot = None;
    }

    slot.get_or_insert_with(|| {
        let plan = planner.plan_fft_forward(size);
        let scratch = plan.make_scratch_vec();
        let spectrum = plan.make_output_vec();
        let input = plan.make_input_vec();
        FftResources {
            size,
            plan,
            scratch,
            spectrum,
            input,
            window: blackman_window(size),
        }
    })
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
    window: Vec<f32>,
}

impl fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("config", &self.config)
            .field("summary", &self.summary)
            .field("frames", &self.frames.len())
            .field("processed_samples", &self.processed_samples)
            .field("level", &self.level)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

fn compute_rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn blackman_window(len: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    (0..len)
        .map(|index| {
            let phase = 2.0 * PI * index as f32 / len as f32;
            A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
        })
        .collect()
}
