//! Confirmation state machine.
//!
//! Flat ──bullish──▶ WaitingConfirmation ──price ≥ target──▶ InPosition
//!   ▲                     │                                      │
//!   └──────bearish────────┘◀──────────────bearish────────────────┘
//!
//! Every other (state, crossover, price) combination is a `Hold` that returns
//! the state unchanged. In WaitingConfirmation a bearish crossover is checked
//! before the price target, so a reversal cancels the signal even when price
//! reached the target on the same tick.
//!
//! The machine is a pure function of its inputs plus the evaluation instant,
//! which only feeds `entry_time` on a buy.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use super::crossover::{detect_crossover, Crossover};
use crate::domain::BotState;
use crate::indicators::EmaSnapshot;

/// What the caller should do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hold,
    SignalDetected,
    SignalCancelled,
    Buy,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Hold => "hold",
            Action::SignalDetected => "signal_detected",
            Action::SignalCancelled => "signal_cancelled",
            Action::Buy => "buy",
            Action::Sell => "sell",
        };
        f.write_str(s)
    }
}

/// Diagnostic context for logging and execution hints.
///
/// Not used for control flow. Optional fields are only present on the
/// transitions that produce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDetails {
    pub crossover: Crossover,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub current_price: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    /// Distance to target as a percent of the current price, 3 decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    /// Realized P/L of the closed position in percent, 2 decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_percent: Option<f64>,
}

impl SignalDetails {
    fn new(crossover: Crossover, snapshot: &EmaSnapshot, current_price: f64) -> Self {
        Self {
            crossover,
            ema_fast: snapshot.current.ema_fast,
            ema_slow: snapshot.current.ema_slow,
            current_price,
            timestamp: snapshot.current.timestamp.clone(),
            message: None,
            target_price: None,
            remaining_percent: None,
            entry_price: None,
            profit_percent: None,
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub action: Action,
    pub new_state: BotState,
    pub details: SignalDetails,
}

/// Price the live price must reach to confirm a crossover.
pub fn target_price(crossover_price: f64, confirmation_percent: f64) -> f64 {
    crossover_price * (1.0 + confirmation_percent / 100.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Crossover of a snapshot; `None` when either point has an undefined EMA.
fn snapshot_crossover(snapshot: &EmaSnapshot) -> Crossover {
    match (snapshot.current.pair(), snapshot.previous.pair()) {
        (Some(current), Some(previous)) => detect_crossover(current, previous),
        _ => Crossover::None,
    }
}

/// Evaluate one tick, stamping a buy with the current wall-clock time.
pub fn evaluate_signal(
    snapshot: &EmaSnapshot,
    state: &BotState,
    confirmation_percent: f64,
    current_price: f64,
) -> SignalResult {
    evaluate_signal_at(
        snapshot,
        state,
        confirmation_percent,
        current_price,
        Utc::now(),
    )
}

/// Evaluate one tick with an explicit evaluation instant.
pub fn evaluate_signal_at(
    snapshot: &EmaSnapshot,
    state: &BotState,
    confirmation_percent: f64,
    current_price: f64,
    now: DateTime<Utc>,
) -> SignalResult {
    let crossover = snapshot_crossover(snapshot);
    let mut details = SignalDetails::new(crossover, snapshot, current_price);

    let (action, new_state) = match state {
        BotState::Flat if crossover == Crossover::Bullish => {
            let close = snapshot.current.close;
            details.message = Some(format!(
                "Bullish crossover detected at {close}. Waiting for +{confirmation_percent}% confirmation."
            ));
            (
                Action::SignalDetected,
                BotState::WaitingConfirmation {
                    crossover_price: close,
                    crossover_time: snapshot.current.timestamp.clone(),
                },
            )
        }

        BotState::WaitingConfirmation {
            crossover_price,
            crossover_time,
        } => {
            let target = target_price(*crossover_price, confirmation_percent);

            if crossover == Crossover::Bearish {
                details.message = Some("Bearish crossover appeared. Signal cancelled.".into());
                (Action::SignalCancelled, BotState::Flat)
            } else if current_price >= target {
                details.message = Some(format!(
                    "Price confirmed at {current_price} (target was {target:.2}). Opening long position."
                ));
                details.target_price = Some(target);
                (
                    Action::Buy,
                    BotState::InPosition {
                        crossover_price: Some(*crossover_price),
                        crossover_time: Some(crossover_time.clone()),
                        entry_price: current_price,
                        entry_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    },
                )
            } else {
                details.message = Some(format!(
                    "Waiting for confirmation. Current: {current_price}, Target: {target:.2}"
                ));
                details.target_price = Some(target);
                details.remaining_percent =
                    Some(round_to((target - current_price) / current_price * 100.0, 3));
                (Action::Hold, state.clone())
            }
        }

        BotState::InPosition { entry_price, .. } if crossover == Crossover::Bearish => {
            let profit = round_to((current_price - entry_price) / entry_price * 100.0, 2);
            details.message = Some(format!(
                "Bearish crossover detected. Closing position at {current_price}. P/L: {profit:.2}%"
            ));
            details.entry_price = Some(*entry_price);
            details.profit_percent = Some(profit);
            (Action::Sell, BotState::Flat)
        }

        _ => (Action::Hold, state.clone()),
    };

    if action != Action::Hold {
        info!(
            from = %state.status(),
            to = %new_state.status(),
            %action,
            price = current_price,
            timestamp = %details.timestamp,
            "signal transition"
        );
    }

    SignalResult {
        action,
        new_state,
        details,
    }
}
