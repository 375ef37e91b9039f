//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = (close[t] - EMA[t-1]) * k + EMA[t-1], k = 2 / (period + 1)
//! Seed: EMA[period-1] = SMA of first `period` close values.
//! Lookback: period - 1.
//!
//! Unlike a warm-up-tolerant indicator, this one is strict: fewer closes than
//! `period` is an error, not an all-undefined series.

use thiserror::Error;

/// EMA values aligned with the input closes. `None` before the seed index.
pub type EmaSeries = Vec<Option<f64>>;

/// Errors from the EMA engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need at least {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("EMA period must be >= 1, got {0}")]
    InvalidPeriod(usize),
}

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidPeriod(period));
        }
        Ok(Self {
            period,
            name: format!("ema_{period}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Number of leading undefined values.
    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Smoothing multiplier `k = 2 / (period + 1)`.
    pub fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Compute the EMA series for `closes` (oldest first).
    pub fn compute(&self, closes: &[f64]) -> Result<EmaSeries, IndicatorError> {
        let n = closes.len();
        if n < self.period {
            return Err(IndicatorError::InsufficientData {
                required: self.period,
                available: n,
            });
        }

        let k = self.multiplier();
        let mut result = vec![None; n];

        let mut sum = 0.0;
        for &close in &closes[..self.period] {
            sum += close;
        }
        let seed = sum / self.period as f64;
        result[self.period - 1] = Some(seed);

        let mut prev = seed;
        for i in self.period..n {
            let ema = (closes[i] - prev) * k + prev;
            result[i] = Some(ema);
            prev = ema;
        }

        Ok(result)
    }
}

/// Compute the EMA of `prices` for `period`.
///
/// Fails with `InsufficientData` when `prices.len() < period`; no partial
/// result is returned.
pub fn compute_ema(prices: &[f64], period: usize) -> Result<EmaSeries, IndicatorError> {
    Ema::new(period)?.compute(prices)
}
