//! Full per-bar EMA history for a set of periods.
//!
//! Same leniency as the multi-period snapshot: a period is `None` on every bar
//! before its seed, and entirely `None` when the history never reaches it.

use std::collections::BTreeMap;

use tracing::debug;

use super::ema::{compute_ema, IndicatorError};
use super::snapshot::{normalize_periods, MultiEmaPoint};
use crate::domain::bar::{closes, PriceBar};

/// One `MultiEmaPoint` per input bar, oldest first.
///
/// Errors only on a zero period. An empty bar slice gives an empty history.
pub fn compute_multi_ema_series(
    bars: &[PriceBar],
    periods: &[usize],
) -> Result<Vec<MultiEmaPoint>, IndicatorError> {
    let periods = normalize_periods(periods)?;
    let closes = closes(bars);

    let mut series = Vec::with_capacity(periods.len());
    for &period in &periods {
        let values = match compute_ema(&closes, period) {
            Ok(values) => values,
            Err(IndicatorError::InsufficientData { .. }) => vec![None; closes.len()],
            Err(e) => return Err(e),
        };
        series.push((period, values));
    }

    debug!(bars = bars.len(), periods = periods.len(), "computed EMA history");

    Ok(bars
        .iter()
        .enumerate()
        .map(|(i, bar)| MultiEmaPoint {
            close: bar.close,
            timestamp: bar.timestamp.clone(),
            emas: series
                .iter()
                .map(|(period, values)| (*period, values[i]))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect())
}
