//! Trading state for one instrument.
//!
//! `BotState` is owned by the caller and persisted externally. The signal
//! state machine takes it in and returns an updated copy; it never keeps it.
//!
//! In memory the state is a tagged enum so an inconsistent combination of
//! fields cannot be constructed. On the wire it is the flat key/value record
//! (`status`, `crossoverPrice`, `crossoverTime`, `entryPrice`, `entryTime`),
//! and deserialization rejects records that break the per-status invariants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Position status of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Flat,
    WaitingConfirmation,
    InPosition,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Flat => "flat",
            Status::WaitingConfirmation => "waiting_confirmation",
            Status::InPosition => "in_position",
        };
        f.write_str(s)
    }
}

/// Externally threaded per-instrument state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BotStateRecord", into = "BotStateRecord")]
pub enum BotState {
    /// No signal pending, no position.
    #[default]
    Flat,
    /// Bullish crossover seen; waiting for price to clear the confirmation level.
    WaitingConfirmation {
        crossover_price: f64,
        crossover_time: String,
    },
    /// Long position open. The originating crossover is kept when known.
    InPosition {
        crossover_price: Option<f64>,
        crossover_time: Option<String>,
        entry_price: f64,
        entry_time: String,
    },
}

impl BotState {
    pub fn status(&self) -> Status {
        match self {
            BotState::Flat => Status::Flat,
            BotState::WaitingConfirmation { .. } => Status::WaitingConfirmation,
            BotState::InPosition { .. } => Status::InPosition,
        }
    }

    pub fn crossover_price(&self) -> Option<f64> {
        match self {
            BotState::Flat => None,
            BotState::WaitingConfirmation {
                crossover_price, ..
            } => Some(*crossover_price),
            BotState::InPosition {
                crossover_price, ..
            } => *crossover_price,
        }
    }

    pub fn crossover_time(&self) -> Option<&str> {
        match self {
            BotState::Flat => None,
            BotState::WaitingConfirmation { crossover_time, .. } => Some(crossover_time),
            BotState::InPosition { crossover_time, .. } => crossover_time.as_deref(),
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            BotState::InPosition { entry_price, .. } => Some(*entry_price),
            _ => None,
        }
    }

    pub fn entry_time(&self) -> Option<&str> {
        match self {
            BotState::InPosition { entry_time, .. } => Some(entry_time),
            _ => None,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, BotState::Flat)
    }
}

/// A persisted record that violates the per-status invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("inconsistent {status} state: {reason}")]
    Inconsistent { status: Status, reason: &'static str },
}

/// Flat wire layout of `BotState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStateRecord {
    pub status: Status,
    #[serde(default)]
    pub crossover_price: Option<f64>,
    #[serde(default)]
    pub crossover_time: Option<String>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub entry_time: Option<String>,
}

impl TryFrom<BotStateRecord> for BotState {
    type Error = StateError;

    fn try_from(record: BotStateRecord) -> Result<Self, Self::Error> {
        let status = record.status;
        let inconsistent = move |reason: &'static str| StateError::Inconsistent { status, reason };

        match record.status {
            Status::Flat => {
                if record.crossover_price.is_some()
                    || record.crossover_time.is_some()
                    || record.entry_price.is_some()
                    || record.entry_time.is_some()
                {
                    return Err(inconsistent("all fields must be null"));
                }
                Ok(BotState::Flat)
            }
            Status::WaitingConfirmation => {
                if record.entry_price.is_some() || record.entry_time.is_some() {
                    return Err(inconsistent("entry fields must be null"));
                }
                match (record.crossover_price, record.crossover_time) {
                    (Some(crossover_price), Some(crossover_time)) => {
                        Ok(BotState::WaitingConfirmation {
                            crossover_price,
                            crossover_time,
                        })
                    }
                    _ => Err(inconsistent("crossover price and time must be set")),
                }
            }
            Status::InPosition => match (record.entry_price, record.entry_time) {
                (Some(entry_price), Some(entry_time)) => Ok(BotState::InPosition {
                    crossover_price: record.crossover_price,
                    crossover_time: record.crossover_time,
                    entry_price,
                    entry_time,
                }),
                _ => Err(inconsistent("entry price and time must be set")),
            },
        }
    }
}

impl From<BotState> for BotStateRecord {
    fn from(state: BotState) -> Self {
        let status = state.status();
        match state {
            BotState::Flat => BotStateRecord {
                status,
                crossover_price: None,
                crossover_time: None,
                entry_price: None,
                entry_time: None,
            },
            BotState::WaitingConfirmation {
                crossover_price,
                crossover_time,
            } => BotStateRecord {
                status,
                crossover_price: Some(crossover_price),
                crossover_time: Some(crossover_time),
                entry_price: None,
                entry_time: None,
            },
            BotState::InPosition {
                crossover_price,
                crossover_time,
                entry_price,
                entry_time,
            } => BotStateRecord {
                status,
                crossover_price,
                crossover_time,
                entry_price: Some(entry_price),
                entry_time: Some(entry_time),
            },
        }
    }
}
