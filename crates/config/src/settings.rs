// Application settings
// Loaded from ~/.config/rowdeck/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Reveal and ingestion tuning. Every field has a default so a partial or
/// missing settings file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown when a dataset loads or the filters/sort change.
    pub initial_window: usize,

    /// Rows added per reveal advance.
    pub batch_size: usize,

    /// Delay before an advance applies, in milliseconds.
    pub advance_delay_ms: u64,

    /// How many rows past the viewport bottom still arm the reveal trigger.
    pub trigger_margin_rows: u16,

    /// Fraction of the sentinel that must intersect the expanded viewport.
    pub trigger_threshold: f32,

    /// Row count for the generated sample dataset.
    pub sample_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_window: 100,
            batch_size: 50,
            advance_delay_ms: 1000,
            trigger_margin_rows: 4,
            trigger_threshold: 0.1,
            sample_rows: 10_000,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rowdeck").join("settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable. A corrupt file never blocks startup.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, content).map_err(|e| e.to_string())
    }
}
