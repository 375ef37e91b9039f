//! Moving average crossover detection — golden cross and death cross.
//!
//! Bullish when fast was at-or-below slow and is now strictly above.
//! Bearish when fast was at-or-above slow and is now strictly below.
//! Leaving exact equality counts as a crossover; staying equal does not.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::indicators::EmaPair;

/// Relationship change between the fast and slow EMA across one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Crossover::Bullish => "bullish",
            Crossover::Bearish => "bearish",
            Crossover::None => "none",
        };
        f.write_str(s)
    }
}

/// Classify the step from `previous` to `current`.
///
/// NaN on either side compares false everywhere and yields `Crossover::None`.
pub fn detect_crossover(current: EmaPair, previous: EmaPair) -> Crossover {
    let was_below_or_equal = previous.fast <= previous.slow;
    let was_above_or_equal = previous.fast >= previous.slow;
    let is_above = current.fast > current.slow;
    let is_below = current.fast < current.slow;

    let crossover = if was_below_or_equal && is_above {
        Crossover::Bullish
    } else if was_above_or_equal && is_below {
        Crossover::Bearish
    } else {
        Crossover::None
    };

    debug!(
        fast = current.fast,
        slow = current.slow,
        prev_fast = previous.fast,
        prev_slow = previous.slow,
        %crossover,
        "classified EMA crossover"
    );

    crossover
}
