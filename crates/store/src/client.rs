//! Sheet web-app HTTP client.
//!
//! Blocking reqwest client. Reads must bypass any intermediate cache (the
//! endpoint sits behind a CDN that caches GETs), so every fetch carries a
//! millisecond-epoch `t` query parameter.
//!
//! Writes are fire-and-forget: the web app answers POSTs with redirects
//! and opaque bodies, so only transport failures count as errors. A
//! non-success status is logged and otherwise ignored.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use panelscan_protocol::{StandardPreset, ACTION_SAVE_LOG, ACTION_SAVE_STANDARD};

use crate::StoreError;

/// Sheet endpoint client (blocking).
#[derive(Clone)]
pub struct SheetClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl SheetClient {
    pub fn new(endpoint: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("panelscan/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn require_endpoint(&self) -> Result<&str, StoreError> {
        if self.endpoint.is_empty() {
            return Err(StoreError::NoEndpoint);
        }
        Ok(&self.endpoint)
    }

    /// Fetch the full standard-preset list from the sheet.
    pub fn list_presets(&self) -> Result<Vec<StandardPreset>, StoreError> {
        let endpoint = self.require_endpoint()?;
        let bust = epoch_millis().to_string();

        let response = self
            .http
            .get(endpoint)
            .query(&[("t", bust.as_str())])
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http(status, body));
        }

        let presets: Vec<StandardPreset> = response
            .json()
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        debug!("fetched {} standard presets", presets.len());
        Ok(presets)
    }

    /// Append a new standard preset row. The sheet assigns the id.
    pub fn create_preset(&self, preset: &StandardPreset) -> Result<(), StoreError> {
        let body = serde_json::json!({
            "action": ACTION_SAVE_STANDARD,
            "productName": preset.product_name,
            "structure": preset.structure,
            "data": preset.data,
        });
        self.post_fire_and_forget(&body)
    }

    /// Append a deviation-report row. `payload` is the flat log object
    /// built by the session layer, `action` included.
    pub fn submit_log(&self, payload: &serde_json::Value) -> Result<(), StoreError> {
        debug_assert_eq!(payload["action"], ACTION_SAVE_LOG);
        self.post_fire_and_forget(payload)
    }

    /// Submit a log row from a background thread. Transport failure is
    /// logged, never surfaced; the returned handle is for tests and
    /// shutdown joins.
    pub fn submit_log_detached(&self, payload: serde_json::Value) -> thread::JoinHandle<()> {
        let client = self.clone();
        thread::spawn(move || {
            if let Err(e) = client.submit_log(&payload) {
                warn!("log submission failed: {}", e);
            }
        })
    }

    fn post_fire_and_forget(&self, body: &serde_json::Value) -> Result<(), StoreError> {
        let endpoint = self.require_endpoint()?;
        let response = self
            .http
            .post(endpoint)
            .json(body)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            warn!("sheet write returned HTTP {}", response.status().as_u16());
        }
        Ok(())
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn list_sends_cache_bust_param() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).query_param_exists("t");
            then.status(200).json_body(serde_json::json!([
                { "id": "1", "productName": "Film A", "structure": "PET/PE",
                  "data": { "speed": 100.0 } }
            ]));
        });

        let client = SheetClient::new(server.base_url());
        let presets = client.list_presets().unwrap();

        mock.assert();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].product_name, "Film A");
        assert_eq!(presets[0].standard("speed"), Some(100.0));
    }

    #[test]
    fn list_surfaces_http_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(503).body("maintenance");
        });

        let client = SheetClient::new(server.base_url());
        match client.list_presets().unwrap_err() {
            StoreError::Http(503, body) => assert_eq!(body, "maintenance"),
            other => panic!("expected Http(503), got {:?}", other),
        }
    }

    #[test]
    fn list_rejects_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("<html>sign in</html>");
        });

        let client = SheetClient::new(server.base_url());
        assert!(matches!(
            client.list_presets().unwrap_err(),
            StoreError::Parse(_)
        ));
    }

    #[test]
    fn create_preset_posts_action_and_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).json_body_includes(
                r#"{ "action": "save_standard", "productName": "Film B" }"#,
            );
            then.status(200);
        });

        let preset: StandardPreset = serde_json::from_value(serde_json::json!({
            "id": "",
            "productName": "Film B",
            "structure": "PET/AL/PE",
            "data": { "oven": 5.0 }
        }))
        .unwrap();

        let client = SheetClient::new(server.base_url());
        client.create_preset(&preset).unwrap();
        mock.assert();
    }

    #[test]
    fn writes_ignore_http_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(500);
        });

        let client = SheetClient::new(server.base_url());
        let payload = serde_json::json!({ "action": "save_log", "speed": 100.0 });
        assert!(client.submit_log(&payload).is_ok());
    }

    #[test]
    fn detached_submit_delivers_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .json_body_includes(r#"{ "action": "save_log" }"#);
            then.status(200);
        });

        let client = SheetClient::new(server.base_url());
        let handle = client.submit_log_detached(serde_json::json!({ "action": "save_log" }));
        handle.join().unwrap();
        mock.assert();
    }

    #[test]
    fn empty_endpoint_fails_before_any_request() {
        let client = SheetClient::new(String::new());
        assert!(matches!(
            client.list_presets().unwrap_err(),
            StoreError::NoEndpoint
        ));
        assert!(matches!(
            client
                .submit_log(&serde_json::json!({ "action": "save_log" }))
                .unwrap_err(),
            StoreError::NoEndpoint
        ));
    }
}
