//! Per-instrument state persistence in one JSON file keyed by symbol.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use emacross_core::BotState;

/// JSON-backed map of symbol → `BotState`.
///
/// A missing file is an empty store and a missing symbol reads as `Flat`.
/// A file that exists but does not parse is an error, never an empty store.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    states: BTreeMap<String, BotState>,
}

impl StateStore {
    pub fn open(path: &Path) -> Result<Self> {
        let states = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read state file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid state file {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            states,
        })
    }

    /// Current state of `symbol`, `Flat` if it has never been evaluated.
    pub fn get(&self, symbol: &str) -> BotState {
        self.states.get(symbol).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, symbol: &str, state: BotState) {
        self.states.insert(symbol.to_string(), state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Write the store back to disk. Creates parent directories if needed.
    ///
    /// The JSON goes to a sibling temp file first and is renamed over the
    /// store, so an interrupted save leaves the previous file intact.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.states)?;
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;

        // Atomic rename
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e).with_context(|| {
                format!("failed to replace state file {}", self.path.display())
            });
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}
