use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    filters::{
        color::{MAX_POSTERIZE_LEVELS, MIN_POSTERIZE_LEVELS},
        EdgeBorder,
    },
    Result, VisualiserError,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub filters: FilterConfig,
    pub reactive: ReactiveConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Parses and validates a JSON configuration document. Missing sections
    /// and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(?path, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.filters.validate()?;
        self.reactive.validate()?;
        self.analysis.validate()
    }
}

/// Parameters for the image filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Luma cutoff for the threshold filter, in `[0, 1]`.
    pub threshold_level: f32,
    /// Number of output values per channel for the posterize filter.
    pub posterize_levels: u32,
    pub edge_border: EdgeBorder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold_level: 0.3,
            posterize_levels: 4,
            edge_border: EdgeBorder::Untouched,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold_level) {
            return Err(VisualiserError::InvalidInput(
                "filters.threshold_level must lie within [0, 1]",
            ));
        }
        if !(MIN_POSTERIZE_LEVELS..=MAX_POSTERIZE_LEVELS).contains(&self.posterize_levels) {
            return Err(VisualiserError::InvalidInput(
                "filters.posterize_levels must lie within [2, 255]",
            ));
        }
        Ok(())
    }
}

/// Maps audio level to the frame transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    /// Level at which the frame reaches `max_scale`.
    pub level_ceiling: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Rotation applied per frame while a rotation key is held, in radians.
    pub rotation_step: f32,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            level_ceiling: 0.3,
            min_scale: 1.0,
            max_scale: 1.5,
            rotation_step: 0.02,
        }
    }
}

impl ReactiveConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.level_ceiling > 0.0) {
            return Err(VisualiserError::InvalidInput(
                "reactive.level_ceiling must be positive",
            ));
        }
        if !(self.min_scale <= self.max_scale) {
            return Err(VisualiserError::InvalidInput(
                "reactive.min_scale must not exceed reactive.max_scale",
            ));
        }
        if !self.rotation_step.is_finite() {
            return Err(VisualiserError::InvalidInput(
                "reactive.rotation_step must be finite",
            ));
        }
        Ok(())
    }
}

/// Configuration specific to the audio analysis subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sample_rate: u32,
    /// Number of spectrum bins; the FFT size is twice this.
    pub bins: usize,
    /// Time constant blending each spectrum with the previous one.
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
    /// Decay factor for the peak-holding level meter.
    pub level_smoothing: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            bins: 512,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            level_smoothing: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// Number of samples fed to each FFT.
    pub fn fft_size(&self) -> usize {
        self.bins * 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(VisualiserError::InvalidInput(
                "analysis.sample_rate must be positive",
            ));
        }
        if self.bins < 16 || !self.bins.is_power_of_two() {
            return Err(VisualiserError::InvalidInput(
                "analysis.bins must be a power of two of at least 16",
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) || !(0.0..1.0).contains(&self.level_smoothing) {
            return Err(VisualiserError::InvalidInput(
                "analysis smoothing factors must lie within [0, 1)",
            ));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(VisualiserError::InvalidInput(
                "analysis.min_decibels must be below analysis.max_decibels",
            ));
        }
        Ok(())
    }
}
