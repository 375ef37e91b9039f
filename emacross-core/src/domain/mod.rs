//! Domain types for EMACross

pub mod bar;
pub mod state;

pub use bar::{parse_bars, BarError, CloseValue, PriceBar, RawBar};
pub use state::{BotState, StateError, Status};
