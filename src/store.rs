//! Persisted scanner state
//!
//! One JSON file holding the trade book. Read once at startup, written once at
//! the end of the run. The write goes to a sibling temp file first and is
//! renamed into place, so an interrupted run never leaves a torn file behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::ScannerConfig;
use crate::trading::TradeBook;

/// Load the trade book, falling back to a fresh one when the file is missing
/// or unreadable. State problems are recovered, never fatal.
pub fn load(path: &Path, cfg: &ScannerConfig) -> TradeBook {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No state file at {}, starting fresh", path.display());
            return TradeBook::with_balance(cfg.starting_balance);
        }
        Err(e) => {
            warn!(
                "Failed to read state file {}: {} - starting fresh",
                path.display(),
                e
            );
            return TradeBook::with_balance(cfg.starting_balance);
        }
    };

    match serde_json::from_str(&raw) {
        Ok(book) => book,
        Err(e) => {
            warn!(
                "State file {} is corrupt ({}) - starting fresh",
                path.display(),
                e
            );
            TradeBook::with_balance(cfg.starting_balance)
        }
    }
}

/// Write the trade book atomically: temp file, then rename over the target.
pub fn save(path: &Path, book: &TradeBook) -> Result<()> {
    let json = serde_json::to_string_pretty(book).context("Failed to serialize state")?;

    let tmp = tmp_path(path);
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move state into {}", path.display()))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
