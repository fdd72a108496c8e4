//! `panelscan-extract` — Vision-model extraction adapter.
//!
//! Turns a zone photo into a [`ZoneRecord`] by calling a generateContent
//! style vision endpoint with the zone's registry instructions and a strict
//! JSON response schema. The rest of the system depends only on the
//! [`Extract`] trait, so session logic is testable without a network.
//!
//! Blocking reqwest client (no Tokio runtime required); callers that need
//! concurrency run extraction on a worker thread.

mod client;
mod schema;

pub use client::{VisionClient, API_KEY_ENV, GEMINI_API_BASE};
pub use schema::{parse_record, response_schema};

use panelscan_protocol::ZoneRecord;
use panelscan_registry::ZoneId;

/// Error type for extraction operations.
#[derive(Debug)]
pub enum ExtractError {
    /// No API key configured
    MissingApiKey,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body did not match the expected shape
    Parse(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::MissingApiKey => write!(f, "API key is missing"),
            ExtractError::Network(msg) => write!(f, "Network error: {}", msg),
            ExtractError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ExtractError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Turn a captured zone image into a record of readings.
///
/// `model` is the operator's extraction-model choice, passed through to
/// the provider unmodified.
pub trait Extract: Send + Sync {
    fn extract(
        &self,
        zone: ZoneId,
        image_jpeg: &[u8],
        model: &str,
    ) -> Result<ZoneRecord, ExtractError>;
}
