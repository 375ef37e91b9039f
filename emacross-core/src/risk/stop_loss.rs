//! Stop-loss: the tighter of a percent-below-entry floor and a slow-EMA floor.
//!
//! percent_stop = entry * (1 - stop_loss_percent / 100)
//! ema_stop     = slow_ema * 0.995
//! stop         = max(percent_stop, ema_stop)

use serde::{Deserialize, Serialize};

/// Fraction of the slow EMA the EMA-based floor sits at (0.5% below it).
pub const EMA_STOP_BUFFER: f64 = 0.995;

/// Both candidate floors and the chosen stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLossLevels {
    pub percent_stop: f64,
    pub ema_stop: f64,
    pub stop: f64,
}

/// Compute both floors and pick the higher one.
///
/// Inputs must be finite; there are no failure conditions.
pub fn stop_loss_levels(entry_price: f64, slow_ema: f64, stop_loss_percent: f64) -> StopLossLevels {
    let percent_stop = entry_price * (1.0 - stop_loss_percent / 100.0);
    let ema_stop = slow_ema * EMA_STOP_BUFFER;
    StopLossLevels {
        percent_stop,
        ema_stop,
        stop: percent_stop.max(ema_stop),
    }
}

/// Stop price for a long entered at `entry_price`.
pub fn compute_stop_loss(entry_price: f64, slow_ema: f64, stop_loss_percent: f64) -> f64 {
    stop_loss_levels(entry_price, slow_ema, stop_loss_percent).stop
}
