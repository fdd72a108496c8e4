//! generateContent HTTP client.
//!
//! Blocking reqwest client. One call per capture: image bytes plus the
//! zone's instructions go out, a JSON object of readings comes back. The
//! model name is chosen per call so the operator can switch models without
//! rebuilding the client.

use std::time::Duration;

use base64::Engine;
use log::debug;
use panelscan_protocol::ZoneRecord;
use panelscan_registry::{self as registry, ZoneId};

use crate::schema::{parse_record, response_schema};
use crate::{Extract, ExtractError};

/// Production endpoint base.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "PANELSCAN_GEMINI_KEY";

const USER_PROMPT: &str = "Extract data based on the provided layout instructions.";

/// Vision extraction client (blocking).
#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE.to_string())
    }

    /// Create a client from the `PANELSCAN_GEMINI_KEY` environment variable.
    pub fn from_env() -> Result<Self, ExtractError> {
        let key = std::env::var(API_KEY_ENV).map_err(|_| ExtractError::MissingApiKey)?;
        if key.is_empty() {
            return Err(ExtractError::MissingApiKey);
        }
        Ok(Self::new(key))
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("panelscan/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn request_body(&self, zone: ZoneId, image_jpeg: &[u8]) -> serde_json::Value {
        let b64 = base64::engine::general_purpose::STANDARD;
        serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": registry::describe(zone).instructions }]
            },
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": "image/jpeg",
                            "data": b64.encode(image_jpeg),
                        }
                    },
                    { "text": USER_PROMPT },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(zone),
                "temperature": 0.1,
            },
        })
    }
}

impl Extract for VisionClient {
    fn extract(
        &self,
        zone: ZoneId,
        image_jpeg: &[u8],
        model: &str,
    ) -> Result<ZoneRecord, ExtractError> {
        if self.api_key.is_empty() {
            return Err(ExtractError::MissingApiKey);
        }

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        debug!("extracting {} via {}", zone, model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(zone, image_jpeg))
            .send()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::Http(status, body));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| ExtractError::Parse(e.to_string()))?;
        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| ExtractError::Parse("no text part in response".into()))?;

        parse_record(zone, text)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
