use std::path::Path;

use serde::Deserialize;

use crate::error::VisualizerError;

/// Lower bounds (exclusive) of each named bucket. Anything at or below
/// `medium_low` is `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BucketThresholds {
    pub high: f64,
    pub medium_high: f64,
    pub medium: f64,
    pub medium_low: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium_high: 0.6,
            medium: 0.4,
            medium_low: 0.2,
        }
    }
}

impl BucketThresholds {
    pub fn validate(&self) -> Result<(), VisualizerError> {
        let bounds = [self.high, self.medium_high, self.medium, self.medium_low];
        if bounds.iter().any(|b| !(0.0..=1.0).contains(b)) {
            return Err(VisualizerError::invalid_config(format!(
                "bucket thresholds must lie in [0, 1], got {bounds:?}"
            )));
        }
        if bounds.windows(2).any(|w| w[0] <= w[1]) {
            return Err(VisualizerError::invalid_config(format!(
                "bucket thresholds must be strictly descending, got {bounds:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Digits after the decimal point for every displayed number.
    pub decimals: usize,
    pub thresholds: BucketThresholds,
    /// Class of the element wrapping the single-shot markup.
    pub container_class: String,
}

impl VisualizerConfig {
    pub const DEFAULT_DECIMALS: usize = 4;
    pub const MAX_DECIMALS: usize = 17;

    pub fn load(path: &Path) -> Result<Self, VisualizerError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| VisualizerError::io("read visualizer config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| VisualizerError::json("parse visualizer config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VisualizerError> {
        if self.decimals > Self::MAX_DECIMALS {
            return Err(VisualizerError::invalid_config(format!(
                "decimals must be at most {}, got {}",
                Self::MAX_DECIMALS,
                self.decimals
            )));
        }
        if self.container_class.trim().is_empty() {
            return Err(VisualizerError::invalid_config(
                "container_class must not be empty",
            ));
        }
        self.thresholds.validate()
    }
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            decimals: Self::DEFAULT_DECIMALS,
            thresholds: BucketThresholds::default(),
            container_class: "token-container".to_string(),
        }
    }
}

/// Top-p values must lie in (0, 1].
pub fn validate_top_p(top_p: f64) -> Result<(), VisualizerError> {
    if top_p > 0.0 && top_p <= 1.0 {
        Ok(())
    } else {
        Err(VisualizerError::invalid_config(format!(
            "top_p must lie in (0, 1], got {top_p}"
        )))
    }
}
