//! Engine configuration.
//!
//! Sampling constants differ per input source: touch screens deliver fewer,
//! coarser samples than a mouse or a high-refresh pen, so each gets its own
//! [`SamplingProfile`] preset. The algorithms themselves never branch on
//! platform.

use crate::path::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default canvas size in pixels.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1080.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1440.0;

/// Upper bound accepted for [`SamplingProfile::max_subdivision_steps`].
pub const MAX_SUBDIVISION_STEPS: usize = 1024;

/// Default eraser radius as a multiple of the brush width.
pub const DEFAULT_ERASER_RADIUS_MULTIPLIER: f64 = 2.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Unknown sampling profile: {0}")]
    UnknownProfile(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Input sampling and smoothing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingProfile {
    /// Samples closer than this to the previous one are not subdivided.
    pub min_sample_distance: f64,
    /// Spacing of interpolated points between two samples.
    pub step_size: f64,
    /// Upper bound on interpolated points per sample pair.
    pub max_subdivision_steps: usize,
    /// Moves arriving faster than this after the last accepted one are dropped.
    pub move_throttle_ms: u64,
}

impl SamplingProfile {
    /// Preset for coarse sources (touch screens, constrained devices).
    pub fn coarse() -> Self {
        Self {
            min_sample_distance: 1.0,
            step_size: 2.0,
            max_subdivision_steps: 10,
            move_throttle_ms: 16,
        }
    }

    /// Preset for fine sources (mouse, pen, high-refresh displays).
    pub fn fine() -> Self {
        Self {
            min_sample_distance: 2.0,
            step_size: 4.0,
            max_subdivision_steps: 5,
            move_throttle_ms: 8,
        }
    }

    /// Look up a preset by name.
    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "coarse" | "touch" | "mobile" => Ok(Self::coarse()),
            "fine" | "mouse" | "web" => Ok(Self::fine()),
            _ => Err(ConfigError::UnknownProfile(name.to_string())),
        }
    }

    /// Minimum interval between accepted moves.
    pub fn move_throttle(&self) -> Duration {
        Duration::from_millis(self.move_throttle_ms)
    }
}

impl Default for SamplingProfile {
    fn default() -> Self {
        Self::coarse()
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canvas size in pixels. Exports always use this size at 1:1.
    pub canvas_size: Size,
    /// Input sampling constants.
    pub sampling: SamplingProfile,
    /// Eraser radius as a multiple of the current brush width.
    pub eraser_radius_multiplier: f64,
    /// Background color of exported rasters.
    pub background: SerializableColor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_size: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            sampling: SamplingProfile::default(),
            eraser_radius_multiplier: DEFAULT_ERASER_RADIUS_MULTIPLIER,
            background: SerializableColor::white(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the given canvas size and default sampling.
    pub fn with_canvas_size(width: f64, height: f64) -> Self {
        Self {
            canvas_size: Size::new(width, height),
            ..Self::default()
        }
    }

    /// Replace the sampling profile.
    pub fn with_sampling(mut self, sampling: SamplingProfile) -> Self {
        self.sampling = sampling;
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Size { width, height } = self.canvas_size;
        if !(width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        let sampling = &self.sampling;
        if !(sampling.step_size.is_finite() && sampling.step_size > 0.0) {
            return Err(ConfigError::Invalid("step_size must be positive".to_string()));
        }
        if !(sampling.min_sample_distance.is_finite() && sampling.min_sample_distance >= 0.0) {
            return Err(ConfigError::Invalid(
                "min_sample_distance must be a non-negative number".to_string(),
            ));
        }
        if sampling.max_subdivision_steps > MAX_SUBDIVISION_STEPS {
            return Err(ConfigError::Invalid(format!(
                "max_subdivision_steps must be at most {}, got {}",
                MAX_SUBDIVISION_STEPS, sampling.max_subdivision_steps
            )));
        }
        if !(self.eraser_radius_multiplier > 1.0) {
            return Err(ConfigError::Invalid(
                "eraser_radius_multiplier must be greater than 1".to_string(),
            ));
        }
        Ok(())
    }
}
