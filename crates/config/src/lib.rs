//! `panelscan-config` — Operator settings persistence.
//!
//! Loaded from ~/.config/panelscan/settings.json

mod settings;

pub use settings::{Settings, DEFAULT_MODEL, KNOWN_MODELS};
