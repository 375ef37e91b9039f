//! Crossover detection and the confirmation state machine.
//!
//! `crossover` classifies one step of the fast/slow EMA relationship.
//! `machine` turns that classification, the caller's `BotState` and the live
//! price into an action and the next state.

pub mod crossover;
pub mod machine;

pub use crossover::{detect_crossover, Crossover};
pub use machine::{
    evaluate_signal, evaluate_signal_at, target_price, Action, SignalDetails, SignalResult,
};
