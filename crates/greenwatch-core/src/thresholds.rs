//! Temperature thresholds and categorization.
//!
//! # Example
//!
//! ```
//! use greenwatch_core::{TemperatureLevel, Thresholds};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.evaluate(24.0), TemperatureLevel::Normal);
//! assert_eq!(thresholds.evaluate(31.5), TemperatureLevel::Hot);
//!
//! println!("{}", thresholds.evaluate(31.5).action());
//! ```

use serde::{Deserialize, Serialize};

use greenwatch_types::Reading;

use crate::stats::PageStats;

/// Default temperature above which a reading counts as hot, in °C.
pub const DEFAULT_HOT_ABOVE: f64 = 30.0;

/// Temperature category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureLevel {
    /// At or below the hot threshold.
    Normal,
    /// Above the hot threshold.
    Hot,
}

impl TemperatureLevel {
    /// Get a human-readable description of the level.
    pub fn description(&self) -> &'static str {
        match self {
            TemperatureLevel::Normal => "Normal - within the comfortable range",
            TemperatureLevel::Hot => "Hot - above the configured limit",
        }
    }

    /// Get the suggested action for this level.
    pub fn action(&self) -> &'static str {
        match self {
            TemperatureLevel::Normal => "No action needed",
            TemperatureLevel::Hot => "Ventilate or irrigate",
        }
    }

    /// Whether this level warrants attention.
    pub fn is_alert(&self) -> bool {
        matches!(self, TemperatureLevel::Hot)
    }
}

/// Configuration for temperature thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Temperatures strictly above this are [`TemperatureLevel::Hot`], in °C.
    pub hot_above: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hot_above: DEFAULT_HOT_ABOVE,
        }
    }
}

/// Threshold evaluator for readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Create an evaluator with a custom hot limit.
    pub fn with_hot_above(hot_above: f64) -> Self {
        Self::new(ThresholdConfig { hot_above })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Categorize a temperature in °C.
    pub fn evaluate(&self, temperature: f64) -> TemperatureLevel {
        if temperature > self.config.hot_above {
            TemperatureLevel::Hot
        } else {
            TemperatureLevel::Normal
        }
    }

    /// Categorize a reading by its temperature.
    pub fn evaluate_reading(&self, reading: &Reading) -> TemperatureLevel {
        self.evaluate(reading.temperature)
    }

    /// Categorize the mean temperature of a page.
    pub fn evaluate_stats(&self, stats: &PageStats) -> TemperatureLevel {
        self.evaluate(stats.mean_temperature)
    }
}
