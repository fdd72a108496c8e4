//! Submission payload assembly.
//!
//! The sheet expects one flat JSON object per report row: session
//! metadata, then `<field>`, `std_<field>`, `diff_<field>` for every
//! registry field across all four zones, in registry order. The sink maps
//! keys to columns positionally-by-name, so key order and uniform key
//! presence are part of the contract: an absent value serializes as the
//! empty string, never `null`, never omitted, never zero.

use log::debug;
use panelscan_protocol::{StandardPreset, ACTION_SAVE_LOG};
use panelscan_registry as registry;
use serde_json::{Map, Value};

use crate::session::{now_timestamp, Session};

/// Round to the sheet's two-decimal diff precision.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn entry(value: Option<f64>) -> Value {
    match value {
        Some(v) => Value::from(v),
        None => Value::String(String::new()),
    }
}

/// Flatten the session into a `save_log` report row.
///
/// Callable in any session state; unresolved zones contribute
/// empty-string sentinels for their fields. Gate on
/// [`Session::is_submittable`] for the operator-facing submit action.
pub fn build_payload(
    session: &Session,
    preset: Option<&StandardPreset>,
    model: &str,
) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("action".into(), Value::String(ACTION_SAVE_LOG.into()));

    let timestamp = session
        .captured_at()
        .map(str::to_string)
        .unwrap_or_else(now_timestamp);
    payload.insert("timestamp".into(), Value::String(timestamp));
    payload.insert("model".into(), Value::String(model.to_string()));
    payload.insert(
        "productName".into(),
        Value::String(preset.map(|p| p.product_name.clone()).unwrap_or_default()),
    );
    payload.insert(
        "structure".into(),
        Value::String(preset.map(|p| p.structure.clone()).unwrap_or_default()),
    );

    for (zone, field) in registry::all_fields() {
        let actual = session.zone(zone).record().and_then(|r| r.value(field));
        let standard = preset.and_then(|p| p.standard(field));
        let diff = match (actual, standard) {
            (Some(a), Some(s)) => Some(round2(a - s)),
            _ => None,
        };

        payload.insert(field.into(), entry(actual));
        payload.insert(format!("std_{}", field), entry(standard));
        payload.insert(format!("diff_{}", field), entry(diff));
    }

    debug!("assembled report payload with {} keys", payload.len());
    payload
}

// ── Tests ───────────────────────────────────────────────────────────
