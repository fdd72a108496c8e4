//! `panelscan-store` — Sheet endpoint client and local preset cache.
//!
//! The spreadsheet boundary is an Apps-Script-style web app: GET returns
//! the full standard-preset list, POST appends rows. Its responses on
//! writes are opaque, so submission success means "the request left", not
//! "the row landed"; the operator verifies the sheet.
//!
//! The cache keeps the last fetched preset list on disk so a dashboard can
//! come up with its preset picker populated before the first refresh
//! completes (or when the network is down).

mod cache;
mod client;

pub use cache::PresetCache;
pub use client::SheetClient;

/// Error type for sheet and cache operations.
#[derive(Debug)]
pub enum StoreError {
    /// No endpoint URL configured
    NoEndpoint,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body did not parse
    Parse(String),
    /// Local cache file I/O error
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NoEndpoint => write!(f, "Sheet endpoint URL is not configured"),
            StoreError::Network(msg) => write!(f, "Network error: {}", msg),
            StoreError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            StoreError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
