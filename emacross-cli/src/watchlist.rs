//! The set of instruments evaluated by `scan`.
//!
//! ```toml
//! [[instruments]]
//! symbol = "SPY"
//! bars = "bars/spy.json"
//!
//! [[instruments]]
//! symbol = "QQQ"
//! bars = "bars/qqq.csv"
//! price = 431.2
//! ```
//!
//! Relative `bars` paths resolve against the watchlist's own directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub bars: PathBuf,
    /// Live price; the last close is used when absent.
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Watchlist {
    pub instruments: Vec<Instrument>,
}

impl Watchlist {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let watchlist: Watchlist = toml::from_str(content).context("invalid watchlist")?;
        watchlist.validate()?;
        Ok(watchlist)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read watchlist {}", path.display()))?;
        let mut watchlist = Self::from_toml_str(&content)
            .with_context(|| format!("in watchlist {}", path.display()))?;

        if let Some(base) = path.parent() {
            for instrument in &mut watchlist.instruments {
                if instrument.bars.is_relative() {
                    instrument.bars = base.join(&instrument.bars);
                }
            }
        }
        Ok(watchlist)
    }

    fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            bail!("watchlist has no instruments");
        }
        let mut seen = HashSet::new();
        for instrument in &self.instruments {
            if instrument.symbol.trim().is_empty() {
                bail!("instrument symbol must not be empty");
            }
            if !seen.insert(instrument.symbol.as_str()) {
                bail!("duplicate symbol '{}'", instrument.symbol);
            }
            if let Some(price) = instrument.price {
                if !price.is_finite() || price <= 0.0 {
                    bail!(
                        "price for '{}' must be a positive number, got {price}",
                        instrument.symbol
                    );
                }
            }
        }
        Ok(())
    }
}
