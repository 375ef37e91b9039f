//! Bar input: reading price bars from files at the crate boundary.

pub mod load;

pub use load::{load_bars, parse_json_bars, read_csv_bars, LoadError};
