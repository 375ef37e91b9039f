//! Bar-file loading.
//!
//! Two formats, chosen by extension:
//! - `.json`: an array of bars, or the provider envelope `{ "bars": [...] }`.
//!   Each bar is `{ "c": .., "t": .. }` or `{ "close": .., "timestamp": .. }`.
//! - `.csv`: a header row with `timestamp`/`t` and `close`/`c` columns; other
//!   columns are ignored.
//!
//! Both end in `parse_bars`, so a non-numeric close fails the load with the
//! index of the offending bar.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::{parse_bars, BarError, CloseValue, PriceBar, RawBar};

/// Errors from loading a bar file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON bars in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV bars in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported bar file format: {0} (expected .json or .csv)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Bar(#[from] BarError),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BarFile {
    List(Vec<RawBar>),
    Envelope { bars: Vec<RawBar> },
}

#[derive(Deserialize)]
struct CsvRow {
    #[serde(alias = "t")]
    timestamp: String,
    #[serde(alias = "c")]
    close: String,
}

/// Parse a JSON document of raw bars.
pub fn parse_json_bars(content: &str) -> Result<Vec<RawBar>, serde_json::Error> {
    let file: BarFile = serde_json::from_str(content)?;
    Ok(match file {
        BarFile::List(bars) => bars,
        BarFile::Envelope { bars } => bars,
    })
}

/// Read raw bars from CSV with a header row.
pub fn read_csv_bars<R: Read>(reader: R) -> Result<Vec<RawBar>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<CsvRow>()
        .map(|row| {
            row.map(|r| RawBar {
                close: CloseValue::Text(r.close),
                timestamp: r.timestamp,
            })
        })
        .collect()
}

/// Load and parse a bar file.
pub fn load_bars(path: &Path) -> Result<Vec<PriceBar>, LoadError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "json" => {
            let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: display.clone(),
                source,
            })?;
            parse_json_bars(&content).map_err(|source| LoadError::Json {
                path: display.clone(),
                source,
            })?
        }
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
                path: display.clone(),
                source,
            })?;
            read_csv_bars(file).map_err(|source| LoadError::Csv {
                path: display.clone(),
                source,
            })?
        }
        _ => return Err(LoadError::UnsupportedFormat(display)),
    };

    Ok(parse_bars(&raw)?)
}
