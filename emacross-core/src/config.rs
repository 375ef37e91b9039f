//! Strategy configuration.
//!
//! Loaded from TOML. Every key is optional and falls back to the standard
//! 5/20 crossover with a 0.75% confirmation and a 2% stop.
//!
//! ```toml
//! fast_period = 5
//! slow_period = 20
//! confirmation_percent = 0.75
//! stop_loss_percent = 2.0
//! multi_periods = [5, 8, 9, 13, 20, 21, 34, 50, 100, 200]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::indicators::{DEFAULT_FAST_PERIOD, DEFAULT_MULTI_PERIODS, DEFAULT_SLOW_PERIOD};

/// Errors from loading or validating a `StrategyConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters of the crossover strategy for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Move above the crossover price required before buying, in percent.
    pub confirmation_percent: f64,
    /// Percent-below-entry floor of the stop-loss.
    pub stop_loss_percent: f64,
    /// Periods reported by the multi-period snapshot.
    pub multi_periods: Vec<usize>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            fast_period: DEFAULT_FAST_PERIOD,
            slow_period: DEFAULT_SLOW_PERIOD,
            confirmation_percent: 0.75,
            stop_loss_percent: 2.0,
            multi_periods: DEFAULT_MULTI_PERIODS.to_vec(),
        }
    }
}

impl StrategyConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StrategyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fast_period == 0 {
            return Err(ConfigError::Invalid("fast_period must be >= 1".into()));
        }
        if self.slow_period <= self.fast_period {
            return Err(ConfigError::Invalid(format!(
                "slow_period ({}) must be > fast_period ({})",
                self.slow_period, self.fast_period
            )));
        }
        if !self.confirmation_percent.is_finite() || self.confirmation_percent < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "confirmation_percent must be a finite value >= 0, got {}",
                self.confirmation_percent
            )));
        }
        if !self.stop_loss_percent.is_finite()
            || !(0.0..100.0).contains(&self.stop_loss_percent)
        {
            return Err(ConfigError::Invalid(format!(
                "stop_loss_percent must be in [0, 100), got {}",
                self.stop_loss_percent
            )));
        }
        if self.multi_periods.is_empty() {
            return Err(ConfigError::Invalid("multi_periods must not be empty".into()));
        }
        if self.multi_periods.contains(&0) {
            return Err(ConfigError::Invalid("multi_periods must not contain 0".into()));
        }
        Ok(())
    }
}
