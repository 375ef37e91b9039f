//! EMACross Core — EMA engine, crossover detection, confirmation state machine, stop-loss.
//!
//! This crate is the pure computational core of a single-instrument
//! EMA-crossover trading signal:
//! - Domain types (price bars, the externally owned `BotState`)
//! - EMA engine (strict single-period series, dual and multi-period snapshots)
//! - Crossover detector (fast vs. slow EMA across one step)
//! - Signal state machine (Flat → WaitingConfirmation → InPosition → Flat)
//! - Stop-loss calculator
//! - Bar-file loading and strategy configuration
//!
//! Nothing in here keeps state between calls. The caller reads `BotState`,
//! passes it in, and persists the returned `new_state`.

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod risk;
pub mod signals;

pub use config::{ConfigError, StrategyConfig};
pub use domain::{BarError, BotState, PriceBar, RawBar, StateError, Status};
pub use indicators::{
    compute_dual_ema_snapshot, compute_ema, compute_ema_snapshot, compute_multi_ema_series,
    compute_multi_ema_snapshot, EmaPoint, EmaSnapshot, IndicatorError, MultiEmaSnapshot,
};
pub use risk::compute_stop_loss;
pub use signals::{
    detect_crossover, evaluate_signal, evaluate_signal_at, Action, Crossover, SignalDetails,
    SignalResult,
};
