//! Response schema construction and response-body parsing.
//!
//! The endpoint is asked for `application/json` output constrained to one
//! flat object: every registry field of the zone, numeric, nullable. `null`
//! maps to an absent reading; the model is instructed to use it for
//! unreadable displays, so it must survive the trip back.
//!
//! Parsing is strict. A missing field, an unexpected field, or a
//! non-numeric value fails the whole extraction rather than producing a
//! partially populated record that a reconciliation would silently trust.

use panelscan_protocol::ZoneRecord;
use panelscan_registry::{self as registry, ZoneId};

use crate::ExtractError;

/// Structured-output schema for a zone, in generateContent schema form.
pub fn response_schema(zone: ZoneId) -> serde_json::Value {
    let fields = registry::describe(zone).fields;
    let mut properties = serde_json::Map::new();
    for field in fields {
        properties.insert(
            field.to_string(),
            serde_json::json!({ "type": "NUMBER", "nullable": true }),
        );
    }
    serde_json::json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

/// Parse the model's JSON text into a zone record.
///
/// The body must be an object with exactly the zone's declared fields,
/// each a number or an explicit `null` (an absent reading).
pub fn parse_record(zone: ZoneId, text: &str) -> Result<ZoneRecord, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ExtractError::Parse(format!("model returned invalid JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ExtractError::Parse("model response is not a JSON object".into()))?;

    let fields = registry::describe(zone).fields;
    for key in obj.keys() {
        if !fields.contains(&key.as_str()) {
            return Err(ExtractError::Parse(format!(
                "unexpected field '{}' in {} response",
                key, zone
            )));
        }
    }

    let mut record = ZoneRecord::new(zone);
    for field in fields {
        let reading = match obj.get(*field) {
            Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(ExtractError::Parse(format!(
                    "field '{}' is not numeric: {}",
                    field, other
                )))
            }
            None => {
                return Err(ExtractError::Parse(format!(
                    "required field '{}' missing from {} response",
                    field, zone
                )))
            }
        };
        record.set(field, reading);
    }
    Ok(record)
}

// ── Tests ───────────────────────────────────────────────────────────
