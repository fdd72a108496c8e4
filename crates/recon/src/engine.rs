//! Classification rules.
//!
//! Tolerance is a single global constant applied to every field. The
//! difference is rounded to one decimal place before classification, so a
//! reading of 5.04 against a standard of 5.0 classifies as `Exact` rather
//! than `Warning`: the operator-facing number and the classification
//! always agree.

use std::collections::BTreeMap;

use panelscan_protocol::{StandardPreset, ZoneRecord};
use panelscan_registry::ZoneId;

use crate::model::{Classification, Comparison};

/// Maximum absolute (rounded) difference still considered in tolerance.
pub const TOLERANCE: f64 = 5.0;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn classify(diff: f64) -> Classification {
    if diff == 0.0 {
        Classification::Exact
    } else if diff.abs() <= TOLERANCE {
        Classification::Warning
    } else {
        Classification::OutOfTolerance
    }
}

/// Compare one field's reading against its standard value.
pub fn compare(actual: Option<f64>, standard: Option<f64>) -> Comparison {
    match (actual, standard) {
        (None, _) => Comparison {
            actual: None,
            standard,
            difference: None,
            classification: Classification::Missing,
        },
        (Some(a), None) => Comparison {
            actual: Some(a),
            standard: None,
            difference: None,
            classification: Classification::Unreferenced,
        },
        (Some(a), Some(s)) => {
            let diff = round1(a - s);
            Comparison {
                actual: Some(a),
                standard: Some(s),
                difference: Some(diff),
                classification: classify(diff),
            }
        }
    }
}

/// Reconcile a zone record against the active preset.
///
/// Every field of the zone's schema appears in the result, keyed by field
/// key. `standard: None` covers both "no preset selected" and "preset does
/// not define this field".
pub fn reconcile(
    record: &ZoneRecord,
    standard: Option<&StandardPreset>,
) -> BTreeMap<String, Comparison> {
    record
        .entries()
        .map(|(key, actual)| {
            let std_value = standard.and_then(|p| p.standard(key));
            (key.to_string(), compare(actual, std_value))
        })
        .collect()
}

/// Reconcile every resolved zone at once, flattened across zones.
///
/// Zones without a record contribute `Missing` comparisons for all their
/// fields, so the result always covers the full registry.
pub fn reconcile_all(
    records: &BTreeMap<ZoneId, ZoneRecord>,
    standard: Option<&StandardPreset>,
) -> BTreeMap<String, Comparison> {
    let mut out = BTreeMap::new();
    for zone in ZoneId::ALL {
        match records.get(&zone) {
            Some(record) => out.extend(reconcile(record, standard)),
            None => {
                let empty = ZoneRecord::new(zone);
                out.extend(reconcile(&empty, standard));
            }
        }
    }
    out
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn preset(pairs: &[(&str, f64)]) -> StandardPreset {
        let json = serde_json::json!({
            "id": "t",
            "productName": "Test",
            "structure": "",
            "data": pairs.iter().cloned().collect::<BTreeMap<_, _>>(),
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn missing_when_no_reading() {
        let cmp = compare(None, Some(5.0));
        assert_eq!(cmp.classification, Classification::Missing);
        assert_eq!(cmp.difference, None);
    }

    #[test]
    fn unreferenced_when_no_standard() {
        let cmp = compare(Some(12.0), None);
        assert_eq!(cmp.classification, Classification::Unreferenced);
        assert_eq!(cmp.difference, None);
    }

    #[test]
    fn exact_at_zero_difference() {
        let cmp = compare(Some(5.0), Some(5.0));
        assert_eq!(cmp.classification, Classification::Exact);
        assert_eq!(cmp.difference, Some(0.0));
    }

    #[test]
    fn rounding_happens_before_classification() {
        // 5.04 - 5.0 rounds to 0.0: exact, not warning.
        let cmp = compare(Some(5.04), Some(5.0));
        assert_eq!(cmp.classification, Classification::Exact);
        assert_eq!(cmp.difference, Some(0.0));
    }

    #[test]
    fn warning_within_tolerance() {
        let cmp = compare(Some(103.0), Some(100.0));
        assert_eq!(cmp.classification, Classification::Warning);
        assert_eq!(cmp.difference, Some(3.0));
    }

    #[test]
    fn boundary_is_inclusive() {
        let cmp = compare(Some(105.0), Some(100.0));
        assert_eq!(cmp.classification, Classification::Warning);
        assert_eq!(cmp.difference, Some(5.0));

        let cmp = compare(Some(105.1), Some(100.0));
        assert_eq!(cmp.classification, Classification::OutOfTolerance);
        assert_eq!(cmp.difference, Some(5.1));
    }

    #[test]
    fn negative_differences_use_magnitude() {
        let cmp = compare(Some(95.0), Some(100.0));
        assert_eq!(cmp.classification, Classification::Warning);
        assert_eq!(cmp.difference, Some(-5.0));

        let cmp = compare(Some(94.9), Some(100.0));
        assert_eq!(cmp.classification, Classification::OutOfTolerance);
    }

    #[test]
    fn zone_scenario_mixed_classifications() {
        let mut rec = ZoneRecord::new(ZoneId::Zone1);
        rec.set("unwind2", Some(12.0));
        // rewind stays absent
        rec.set("unwind1", Some(11.5));
        rec.set("infeed", Some(5.0));
        rec.set("oven", Some(5.0));
        rec.set("speed", Some(100.0));

        let std = preset(&[("unwind2", 12.0), ("rewind", 10.0), ("infeed", 5.2)]);
        let result = reconcile(&rec, Some(&std));

        assert_eq!(result["unwind2"].classification, Classification::Exact);
        assert_eq!(result["rewind"].classification, Classification::Missing);
        assert_eq!(result["unwind1"].classification, Classification::Unreferenced);
        assert_eq!(result["infeed"].classification, Classification::Warning);
        assert_eq!(result["infeed"].difference, Some(-0.2));
        assert_eq!(result["oven"].classification, Classification::Unreferenced);
        assert_eq!(result["speed"].classification, Classification::Unreferenced);
    }

    #[test]
    fn no_preset_means_everything_unreferenced_or_missing() {
        let mut rec = ZoneRecord::new(ZoneId::Zone2);
        rec.set("dryer1", Some(80.0));
        let result = reconcile(&rec, None);
        assert_eq!(result["dryer1"].classification, Classification::Unreferenced);
        assert_eq!(result["dryer2"].classification, Classification::Missing);
        assert_eq!(result["dryer3"].classification, Classification::Missing);
    }

    #[test]
    fn reconcile_all_covers_full_registry() {
        let mut records = BTreeMap::new();
        let mut rec = ZoneRecord::new(ZoneId::Zone3);
        rec.set("chiller_temp", Some(12.0));
        records.insert(ZoneId::Zone3, rec);

        let result = reconcile_all(&records, None);
        assert_eq!(result.len(), 11);
        assert_eq!(
            result["chiller_temp"].classification,
            Classification::Unreferenced
        );
        assert_eq!(result["axis_temp"].classification, Classification::Missing);
    }

    proptest! {
        #[test]
        fn classification_matches_rounded_difference(
            a in -1000.0f64..1000.0,
            s in -1000.0f64..1000.0,
        ) {
            let cmp = compare(Some(a), Some(s));
            let diff = cmp.difference.unwrap();
            // Difference carries exactly one decimal place.
            prop_assert!((diff * 10.0 - (diff * 10.0).round()).abs() < 1e-6);
            match cmp.classification {
                Classification::Exact => prop_assert_eq!(diff, 0.0),
                Classification::Warning => {
                    prop_assert!(diff != 0.0 && diff.abs() <= TOLERANCE)
                }
                Classification::OutOfTolerance => prop_assert!(diff.abs() > TOLERANCE),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
