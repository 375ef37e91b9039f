//! Protective exits for an open position.

pub mod stop_loss;

pub use stop_loss::{compute_stop_loss, stop_loss_levels, StopLossLevels, EMA_STOP_BUFFER};
