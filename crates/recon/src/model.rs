//! Comparison outcome types.

use serde::{Deserialize, Serialize};

/// How one field's reading relates to its standard value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No reading was extracted for the field.
    Missing,
    /// A reading exists but the preset defines no standard for the field
    /// (or no preset is selected at all).
    Unreferenced,
    /// Rounded difference is exactly zero.
    Exact,
    /// Rounded difference is non-zero but within tolerance.
    Warning,
    /// Rounded difference exceeds tolerance.
    OutOfTolerance,
}

impl Classification {
    /// True for the two states an operator should act on.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Missing | Self::OutOfTolerance)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::Unreferenced => "unreferenced",
            Self::Exact => "exact",
            Self::Warning => "warning",
            Self::OutOfTolerance => "out_of_tolerance",
        };
        f.write_str(s)
    }
}

/// Comparison result for a single field.
///
/// `difference` is `actual - standard`, rounded to one decimal place. It is
/// populated only when both sides exist, matching the classification rules:
/// a `Missing` or `Unreferenced` field never carries a difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub actual: Option<f64>,
    pub standard: Option<f64>,
    pub difference: Option<f64>,
    pub classification: Classification,
}
