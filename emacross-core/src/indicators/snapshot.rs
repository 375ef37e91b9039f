//! EMA snapshots: the last two points of one or more EMA series.
//!
//! The crossover detector only ever looks at the newest bar and the one before
//! it, so snapshots carry exactly those two points plus the close and
//! timestamp of each.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ema::{compute_ema, EmaSeries, IndicatorError};
use crate::domain::bar::{closes, PriceBar};

/// Fast period of the dual snapshot.
pub const DEFAULT_FAST_PERIOD: usize = 5;

/// Slow period of the dual snapshot. Also the EMA the stop-loss trails.
pub const DEFAULT_SLOW_PERIOD: usize = 20;

/// Periods reported by the multi-period snapshot when none are given.
pub const DEFAULT_MULTI_PERIODS: [usize; 10] = [5, 8, 9, 13, 20, 21, 34, 50, 100, 200];

/// Fast and slow EMA values at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaPair {
    pub fast: f64,
    pub slow: f64,
}

impl EmaPair {
    pub fn new(fast: f64, slow: f64) -> Self {
        Self { fast, slow }
    }
}

/// Fast/slow EMA values together with the bar they were computed at.
///
/// A value is `None` where its series is not yet defined at this bar. That
/// only happens on `previous` when the history is exactly one period long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaPoint {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub close: f64,
    pub timestamp: String,
}

impl EmaPoint {
    /// A point where both EMAs are defined.
    pub fn new(ema_fast: f64, ema_slow: f64, close: f64, timestamp: impl Into<String>) -> Self {
        Self {
            ema_fast: Some(ema_fast),
            ema_slow: Some(ema_slow),
            close,
            timestamp: timestamp.into(),
        }
    }

    /// Both values, or `None` if either is undefined.
    pub fn pair(&self) -> Option<EmaPair> {
        Some(EmaPair::new(self.ema_fast?, self.ema_slow?))
    }
}

/// The two most recent fast/slow points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaSnapshot {
    pub current: EmaPoint,
    pub previous: EmaPoint,
}

/// Dual snapshot with the fixed 5/20 periods.
pub fn compute_dual_ema_snapshot(bars: &[PriceBar]) -> Result<EmaSnapshot, IndicatorError> {
    compute_ema_snapshot(bars, DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD)
}

/// Dual snapshot for arbitrary fast/slow periods.
///
/// Strict: fails with `InsufficientData` when the history is shorter than
/// either period. With exactly `max(fast, slow)` bars the longer series is
/// defined on the current bar only, so `previous` carries `None` for it and
/// no crossover can be classified on that tick.
pub fn compute_ema_snapshot(
    bars: &[PriceBar],
    fast_period: usize,
    slow_period: usize,
) -> Result<EmaSnapshot, IndicatorError> {
    let closes = closes(bars);
    let fast = compute_ema(&closes, fast_period)?;
    let slow = compute_ema(&closes, slow_period)?;

    // Both periods of 1 over a single bar: there is no previous bar at all.
    if bars.len() < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            available: bars.len(),
        });
    }

    let last = bars.len() - 1;
    let point = |i: usize| EmaPoint {
        ema_fast: fast[i],
        ema_slow: slow[i],
        close: bars[i].close,
        timestamp: bars[i].timestamp.clone(),
    };
    let current = point(last);
    let previous = point(last - 1);

    debug!(
        fast_period,
        slow_period,
        ema_fast = ?current.ema_fast,
        ema_slow = ?current.ema_slow,
        previous_defined = previous.pair().is_some(),
        timestamp = %current.timestamp,
        "computed dual EMA snapshot"
    );

    Ok(EmaSnapshot { current, previous })
}

/// One bar's values across many periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiEmaPoint {
    pub close: f64,
    pub timestamp: String,
    /// Period → EMA value; `None` where the history is too short.
    pub emas: BTreeMap<usize, Option<f64>>,
}

impl MultiEmaPoint {
    /// EMA for `period`, if it was requested and is defined at this bar.
    pub fn ema(&self, period: usize) -> Option<f64> {
        self.emas.get(&period).copied().flatten()
    }
}

/// The two most recent points for a set of EMA periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiEmaSnapshot {
    pub current: MultiEmaPoint,
    pub previous: MultiEmaPoint,
    /// Requested periods, ascending and deduplicated.
    pub periods: Vec<usize>,
}

/// Multi-period snapshot.
///
/// Degrades per period: a period with fewer than `period` closes reports
/// `None` for both points instead of failing. The only errors are a zero
/// period and fewer than two bars (there is no previous point).
pub fn compute_multi_ema_snapshot(
    bars: &[PriceBar],
    periods: &[usize],
) -> Result<MultiEmaSnapshot, IndicatorError> {
    let periods = normalize_periods(periods)?;
    if bars.len() < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            available: bars.len(),
        });
    }

    let closes = closes(bars);
    let last = bars.len() - 1;
    let prev = last - 1;

    let mut current = BTreeMap::new();
    let mut previous = BTreeMap::new();
    for &period in &periods {
        let (cur, prv) = match compute_ema(&closes, period) {
            Ok(series) => (value_at(&series, last), value_at(&series, prev)),
            Err(IndicatorError::InsufficientData { .. }) => (None, None),
            Err(e) => return Err(e),
        };
        current.insert(period, cur);
        previous.insert(period, prv);
    }

    debug!(
        bars = bars.len(),
        periods = periods.len(),
        undefined = current.values().filter(|v| v.is_none()).count(),
        "computed multi-period EMA snapshot"
    );

    Ok(MultiEmaSnapshot {
        current: MultiEmaPoint {
            close: bars[last].close,
            timestamp: bars[last].timestamp.clone(),
            emas: current,
        },
        previous: MultiEmaPoint {
            close: bars[prev].close,
            timestamp: bars[prev].timestamp.clone(),
            emas: previous,
        },
        periods,
    })
}

/// Sort and deduplicate `periods`, rejecting a zero period.
pub(crate) fn normalize_periods(periods: &[usize]) -> Result<Vec<usize>, IndicatorError> {
    if periods.contains(&0) {
        return Err(IndicatorError::InvalidPeriod(0));
    }
    Ok(periods
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}

fn value_at(series: &EmaSeries, index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}
