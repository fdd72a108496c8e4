//! `panelscan-protocol` — Shared data-model and sheet wire types.
//!
//! The sheet boundary is an Apps-Script-style web endpoint: a GET returns
//! the standard-preset array; POST bodies carry an `action` discriminator
//! (`save_standard` to append a preset, `save_log` to append a deviation
//! report row). The wire field names (`productName`, `structure`, `data`)
//! are owned by the sheet and must not drift.
//!
//! `ZoneRecord` is the single record shape shared by extraction,
//! reconciliation, and submission: a tagged `{zone, field → value}` map
//! rather than four unrelated structs, so downstream code is written once.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use panelscan_registry::{self as registry, ZoneId};

// ── Sheet actions ───────────────────────────────────────────────────

/// POST action: append a standard preset row.
pub const ACTION_SAVE_STANDARD: &str = "save_standard";
/// POST action: append a deviation-report row.
pub const ACTION_SAVE_LOG: &str = "save_log";

// ── Zone record ─────────────────────────────────────────────────────

/// One zone's extracted readings: field key → value.
///
/// `None` means the vision model reported the field as unreadable, a
/// meaningful state distinct from `Some(0.0)`. Produced by the extraction
/// adapter; individual fields may later be corrected in place by the
/// operator via [`ZoneRecord::set`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    zone: ZoneId,
    values: BTreeMap<String, Option<f64>>,
}

impl ZoneRecord {
    /// An empty record for a zone: every registry field present, absent.
    pub fn new(zone: ZoneId) -> Self {
        let values = registry::describe(zone)
            .fields
            .iter()
            .map(|f| (f.to_string(), None))
            .collect();
        Self { zone, values }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    /// The reading for a field. `None` for absent readings and for keys
    /// the zone does not own.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }

    /// True when the field belongs to this zone but has no reading.
    pub fn is_absent(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(None))
    }

    /// Set a field value (manual operator correction). Returns `false`
    /// when the key does not belong to this zone's schema.
    pub fn set(&mut self, key: &str, value: Option<f64>) -> bool {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Fields in registry order with their readings.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        registry::describe(self.zone)
            .fields
            .iter()
            .map(move |f| (*f, self.value(f)))
    }
}

// ── Standard preset ─────────────────────────────────────────────────

/// A named reference data set of target values for one product run.
///
/// Immutable once fetched; the cache replaces the whole list on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardPreset {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "productName", default)]
    pub product_name: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub data: BTreeMap<String, f64>,
}

impl StandardPreset {
    /// The standard value for a field key, if the preset defines one.
    pub fn standard(&self, key: &str) -> Option<f64> {
        self.data.get(key).copied()
    }
}

/// Sheet rows sometimes come back with numeric ids. Accept both.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "preset id must be a string or number, got {other}"
        ))),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_all_fields_absent() {
        let rec = ZoneRecord::new(ZoneId::Zone1);
        assert_eq!(rec.entries().count(), 6);
        for (key, value) in rec.entries() {
            assert!(value.is_none());
            assert!(rec.is_absent(key));
        }
    }

    #[test]
    fn absent_is_distinct_from_zero() {
        let mut rec = ZoneRecord::new(ZoneId::Zone1);
        assert!(rec.set("speed", Some(0.0)));
        assert_eq!(rec.value("speed"), Some(0.0));
        assert!(!rec.is_absent("speed"));
        assert!(rec.is_absent("rewind"));
    }

    #[test]
    fn set_rejects_foreign_keys() {
        let mut rec = ZoneRecord::new(ZoneId::Zone3);
        assert!(rec.set("chiller_temp", Some(12.5)));
        // dryer1 belongs to zone2
        assert!(!rec.set("dryer1", Some(1.0)));
        assert_eq!(rec.value("dryer1"), None);
    }

    #[test]
    fn preset_wire_shape() {
        let json = r#"{
            "id": "p1",
            "productName": "Film A",
            "structure": "PET/AL/PE",
            "data": {"unwind2": 12.0, "infeed": 5.2}
        }"#;
        let preset: StandardPreset = serde_json::from_str(json).unwrap();
        assert_eq!(preset.product_name, "Film A");
        assert_eq!(preset.standard("unwind2"), Some(12.0));
        assert_eq!(preset.standard("oven"), None);

        let back = serde_json::to_value(&preset).unwrap();
        assert_eq!(back["productName"], "Film A");
    }

    #[test]
    fn preset_accepts_numeric_id() {
        let preset: StandardPreset =
            serde_json::from_str(r#"{"id": 7, "productName": "X", "structure": "", "data": {}}"#)
                .unwrap();
        assert_eq!(preset.id, "7");
    }
}
