//! Standard-preset cache.
//!
//! In-memory list of presets plus the operator's active selection,
//! mirrored to a JSON file so a dashboard comes up with its preset picker
//! populated before the first refresh completes (or when the network is
//! down).
//!
//! Refresh replaces the list wholesale and only on success: a failed
//! refresh leaves both the list and the selection exactly as they were.
//! The active id is stored as an id, not an index, so a refresh that drops
//! the selected preset simply makes `active()` return `None`.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use panelscan_protocol::StandardPreset;

use crate::client::SheetClient;
use crate::StoreError;

#[derive(Debug, Default)]
pub struct PresetCache {
    presets: Vec<StandardPreset>,
    active_id: Option<String>,
}

impl PresetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default on-disk location for the cached list.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("panelscan")
            .join("presets.json")
    }

    pub fn presets(&self) -> &[StandardPreset] {
        &self.presets
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Select a preset by id. Unknown ids are accepted; `active()` then
    /// yields `None` until a refresh brings the preset (back) into the
    /// list.
    pub fn set_active(&mut self, id: Option<String>) {
        self.active_id = id;
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The currently selected preset, if it exists in the cached list.
    pub fn active(&self) -> Option<&StandardPreset> {
        let id = self.active_id.as_deref()?;
        self.presets.iter().find(|p| p.id == id)
    }

    /// Replace the cached list from the remote store. On failure the list
    /// and selection are left untouched. Returns the new list length.
    pub fn refresh(&mut self, client: &SheetClient) -> Result<usize, StoreError> {
        let fresh = client.list_presets()?;
        self.presets = fresh;
        Ok(self.presets.len())
    }

    /// Load the cached list from disk. Missing or unreadable cache is an
    /// empty list, not an error. Selection starts unset.
    pub fn load(path: &Path) -> Self {
        let presets = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(presets) => presets,
                Err(e) => {
                    warn!("preset cache at {} is corrupt: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            presets,
            active_id: None,
        }
    }

    /// Persist the cached list. Writes a sibling temp file and renames so
    /// a crash mid-write never leaves a truncated cache behind.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.presets)
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| StoreError::Io(e.to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn preset(id: &str, name: &str) -> StandardPreset {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "productName": name,
            "structure": "",
            "data": { "speed": 120.0 }
        }))
        .unwrap()
    }

    #[test]
    fn refresh_replaces_list_wholesale() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!([
                { "id": "2", "productName": "Film B", "structure": "", "data": {} }
            ]));
        });

        let mut cache = PresetCache::new();
        cache.presets = vec![preset("1", "Film A")];

        let n = cache.refresh(&SheetClient::new(server.base_url())).unwrap();
        assert_eq!(n, 1);
        assert_eq!(cache.presets()[0].id, "2");
    }

    #[test]
    fn failed_refresh_leaves_cache_untouched() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(500);
        });

        let mut cache = PresetCache::new();
        cache.presets = vec![preset("1", "Film A")];
        cache.set_active(Some("1".into()));

        assert!(cache.refresh(&SheetClient::new(server.base_url())).is_err());
        assert_eq!(cache.presets().len(), 1);
        assert_eq!(cache.active().unwrap().id, "1");
    }

    #[test]
    fn active_with_unknown_id_is_none() {
        let mut cache = PresetCache::new();
        cache.presets = vec![preset("1", "Film A")];
        cache.set_active(Some("gone".into()));
        assert!(cache.active().is_none());
        assert_eq!(cache.active_id(), Some("gone"));

        cache.set_active(Some("1".into()));
        assert_eq!(cache.active().unwrap().product_name, "Film A");
    }

    #[test]
    fn refresh_can_orphan_the_selection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!([]));
        });

        let mut cache = PresetCache::new();
        cache.presets = vec![preset("1", "Film A")];
        cache.set_active(Some("1".into()));

        cache.refresh(&SheetClient::new(server.base_url())).unwrap();
        // Selection survives as an id, resolves to nothing.
        assert_eq!(cache.active_id(), Some("1"));
        assert!(cache.active().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");

        let mut cache = PresetCache::new();
        cache.presets = vec![preset("1", "Film A"), preset("2", "Film B")];
        cache.save(&path).unwrap();

        let loaded = PresetCache::load(&path);
        assert_eq!(loaded.presets(), cache.presets());
        assert!(loaded.active_id().is_none());
    }

    #[test]
    fn load_missing_or_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PresetCache::load(&dir.path().join("nope.json")).is_empty());

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(PresetCache::load(&path).is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("presets.json");
        PresetCache::new().save(&path).unwrap();
        assert!(path.exists());
    }
}
