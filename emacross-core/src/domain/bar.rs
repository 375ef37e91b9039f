//! Price bars, the market data unit consumed by the EMA engine.
//!
//! Bars arrive from the market-data provider loosely typed: the close may be a
//! JSON number or a numeric string. `RawBar` accepts both shapes and
//! `parse_bars` is the single boundary where they become `PriceBar`s. A close
//! that does not parse to a finite number is rejected there, so NaN never
//! reaches the EMA recurrence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closing price and its timestamp.
///
/// The timestamp is an opaque, orderable token (e.g. ISO-8601). Sequences of
/// bars are ordered oldest → newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub close: f64,
    pub timestamp: String,
}

impl PriceBar {
    pub fn new(close: f64, timestamp: impl Into<String>) -> Self {
        Self {
            close,
            timestamp: timestamp.into(),
        }
    }
}

/// Closing price as delivered upstream: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CloseValue {
    Number(f64),
    Text(String),
}

/// Bar as delivered by the market-data provider.
///
/// Accepts the provider's compact field names (`c`, `t`) as well as the long
/// form (`close`, `timestamp`). Any other fields (open, high, volume, ...) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(alias = "c")]
    pub close: CloseValue,
    #[serde(alias = "t")]
    pub timestamp: String,
}

impl RawBar {
    /// Parse this bar. `index` is its position in the input sequence and is
    /// only used for error reporting.
    pub fn parse(&self, index: usize) -> Result<PriceBar, BarError> {
        let close = match &self.close {
            CloseValue::Number(v) => *v,
            CloseValue::Text(s) => s.trim().parse::<f64>().map_err(|_| BarError::Malformed {
                index,
                value: s.clone(),
            })?,
        };

        // "NaN" and "inf" parse successfully as f64; they are still not prices.
        if !close.is_finite() {
            return Err(BarError::NonFinite {
                index,
                value: close,
            });
        }

        Ok(PriceBar {
            close,
            timestamp: self.timestamp.clone(),
        })
    }
}

/// Errors raised at the bar parse boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("malformed bar at index {index}: close {value:?} is not numeric")]
    Malformed { index: usize, value: String },

    #[error("malformed bar at index {index}: close {value} is not finite")]
    NonFinite { index: usize, value: f64 },
}

/// Parse a provider bar sequence, failing on the first malformed close.
pub fn parse_bars(raw: &[RawBar]) -> Result<Vec<PriceBar>, BarError> {
    raw.iter()
        .enumerate()
        .map(|(index, bar)| bar.parse(index))
        .collect()
}

/// Extract the closing prices, preserving order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_shape_with_string_close() {
        let raw: RawBar =
            serde_json::from_str(r#"{"c":"187.42","t":"2024-03-01T15:00:00Z","v":1200}"#).unwrap();
        let bar = raw.parse(0).unwrap();
        assert_eq!(bar.close, 187.42);
        assert_eq!(bar.timestamp, "2024-03-01T15:00:00Z");
    }

    #[test]
    fn parses_long_shape_with_numeric_close() {
        let raw: RawBar =
            serde_json::from_str(r#"{"close":101.5,"timestamp":"2024-03-01"}"#).unwrap();
        assert_eq!(raw.parse(0).unwrap(), PriceBar::new(101.5, "2024-03-01"));
    }

    #[test]
    fn string_close_tolerates_whitespace() {
        let raw = RawBar {
            close: CloseValue::Text(" 42.0 ".into()),
            timestamp: "t".into(),
        };
        assert_eq!(raw.parse(0).unwrap().close, 42.0);
    }

    #[test]
    fn rejects_non_numeric_close() {
        let raw = vec![
            RawBar {
                close: CloseValue::Number(10.0),
                timestamp: "a".into(),
            },
            RawBar {
                close: CloseValue::Text("n/a".into()),
                timestamp: "b".into(),
            },
        ];
        let err = parse_bars(&raw).unwrap_err();
        assert_eq!(
            err,
            BarError::Malformed {
                index: 1,
                value: "n/a".into()
            }
        );
    }

    #[test]
    fn rejects_nan_string() {
        let raw = RawBar {
            close: CloseValue::Text("NaN".into()),
            timestamp: "a".into(),
        };
        assert!(matches!(
            raw.parse(3),
            Err(BarError::NonFinite { index: 3, .. })
        ));
    }

    #[test]
    fn parse_bars_preserves_order() {
        let raw: Vec<RawBar> = serde_json::from_str(
            r#"[{"c":1,"t":"a"},{"c":"2","t":"b"},{"c":3.5,"t":"c"}]"#,
        )
        .unwrap();
        let bars = parse_bars(&raw).unwrap();
        assert_eq!(closes(&bars), vec![1.0, 2.0, 3.5]);
        assert_eq!(bars[2].timestamp, "c");
    }
}
