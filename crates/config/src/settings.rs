// Application settings
// Loaded from ~/.config/panelscan/settings.json

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Extraction models offered to the operator: (id, display name). The id
/// is an opaque string passed through to the provider unmodified; an id
/// outside this list still works.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gemini-flash-lite-latest", "Flash Lite (Fast)"),
    ("gemini-2.5-flash-latest", "Flash 2.5 (Precise)"),
    ("gemini-3-flash-preview", "Flash 3.0 (Preview)"),
];

pub const DEFAULT_MODEL: &str = "gemini-flash-lite-latest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sheet web-app endpoint URL (empty until the operator sets it)
    #[serde(rename = "store.url")]
    pub store_url: String,

    /// Selected extraction model id
    #[serde(rename = "extract.model")]
    pub model: String,

    /// Active standard-preset id, if one is selected
    #[serde(rename = "preset.activeId", skip_serializing_if = "Option::is_none")]
    pub active_preset_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            model: DEFAULT_MODEL.to_string(),
            active_preset_id: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("panelscan")
            .join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("settings at {} are corrupt: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk, creating parent directories as needed
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
