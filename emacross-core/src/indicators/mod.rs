//! EMA engine.
//!
//! `ema` holds the strict single-period recurrence. `snapshot` builds the two
//! most recent points the crossover detector needs, either for a fast/slow
//! pair (strict: too little history is an error) or for a set of periods
//! (lenient: a period without enough history reports `None`). `history`
//! keeps every bar's values for the same period set.

pub mod ema;
pub mod history;
pub mod snapshot;

pub use ema::{compute_ema, Ema, EmaSeries, IndicatorError};
pub use history::compute_multi_ema_series;
pub use snapshot::{
    compute_dual_ema_snapshot, compute_ema_snapshot, compute_multi_ema_snapshot, EmaPair,
    EmaPoint, EmaSnapshot, MultiEmaPoint, MultiEmaSnapshot, DEFAULT_FAST_PERIOD,
    DEFAULT_MULTI_PERIODS, DEFAULT_SLOW_PERIOD,
};

/// Create price bars from close prices for testing.
///
/// Timestamps are consecutive days starting 2024-01-02, rendered ISO-8601.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = base_date + chrono::Duration::days(i as i64);
            PriceBar::new(close, date.format("%Y-%m-%d").to_string())
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
