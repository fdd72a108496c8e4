//! `panelscan-registry` — Static zone schema registry.
//!
//! Maps each of the four capture zones to its extraction instructions, its
//! ordered set of field keys, and display labels. Pure data: no IO, no
//! failure modes, a `ZoneId` is always valid by construction.
//!
//! The instruction texts are natural-language spatial guidance for the
//! vision model (row/column disambiguation, which LED color to read). They
//! are passed opaquely to the extraction adapter and interpreted nowhere
//! else.
//!
//! # Invariant
//!
//! Field keys are globally unique across all zones. The reconciliation
//! output and the submitted report are flattened across zones, so a
//! duplicate key would silently merge two unrelated readings. Guarded by
//! [`fields_are_globally_unique`] and tests.

use serde::{Deserialize, Serialize};

// ── Zone identity ───────────────────────────────────────────────────

/// One of the four independently captured measurement zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneId {
    Zone1,
    Zone2,
    Zone3,
    Zone4,
}

impl ZoneId {
    /// All zones, in capture-tab order.
    pub const ALL: [ZoneId; 4] = [ZoneId::Zone1, ZoneId::Zone2, ZoneId::Zone3, ZoneId::Zone4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zone1 => "zone1",
            Self::Zone2 => "zone2",
            Self::Zone3 => "zone3",
            Self::Zone4 => "zone4",
        }
    }

    /// Operator-facing label for the zone.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zone1 => "Zone 1: Main machine",
            Self::Zone2 => "Zone 2: Dryer units",
            Self::Zone3 => "Zone 3: Water chiller",
            Self::Zone4 => "Zone 4: Laminating axis",
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Zone schemas ────────────────────────────────────────────────────

/// Extraction contract for one zone: the prompt sent to the vision model
/// and the ordered field keys its response must contain.
#[derive(Debug)]
pub struct ZoneSchema {
    pub instructions: &'static str,
    pub fields: &'static [&'static str],
}

const INSTRUCTIONS_ZONE_1: &str = "\
Analyze the Machine HMI Screen with strict spatial row selection:

1. TOP-LEFT GRID (Unwind/Rewind Section):
   - Structure: Columns are [Unwind 2], [Rewind], [Unwind 1].
   - Row Labels: The rows are labeled vertically as [Dan.], [Stea], [Kg].
   - **CRITICAL INSTRUCTION**: Do NOT read the values from the \"Stea\" row (2nd row).
   - **TARGET**: Read ONLY the values from the row labeled \"Kg\" (the 3rd row).
   - Extract:
     * 'unwind2': value under 'Unwind 2' column, inside 'Kg' row.
     * 'rewind': value under 'Rewind' column, inside 'Kg' row.
     * 'unwind1': value under 'Unwind 1' column, inside 'Kg' row.

2. TOP-RIGHT GRID (Tension Section):
   - Structure: Columns are [Infeed], [Oven].
   - Row Labels: [I.V], [PV. Kg], [Set Kg].
   - **TARGET**: Read ONLY the bottom row labeled \"Set Kg\".
   - Extract:
     * 'infeed': value under 'Infeed' column, row \"Set Kg\".
     * 'oven': value under 'Oven' column, row \"Set Kg\".

3. CENTER:
   - 'speed': The large digital number labeled \"Speed\" (M/Min) (usually white text on blue/black background).

Rules: Return 0 if the value is 0.0. Return null if unreadable/obscured.";

const INSTRUCTIONS_ZONE_2: &str = "\
You are reading an \"AIR DRYER SYSTEM\" panel.
There are three controllers labeled #1 UNIT, #2 UNIT, and #3 UNIT.
For each unit, extract the GREEN LED number (usually the top number in the display).
- dryer1: Green value for #1 UNIT.
- dryer2: Green value for #2 UNIT.
- dryer3: Green value for #3 UNIT.
Ignore the red numbers below the green ones.";

const INSTRUCTIONS_ZONE_3: &str = "\
You are reading a \"WATER CHILLER\" control panel.
Locate the Red LED display. It is typically under a label like \"TEMP. SWITCH\" or similar on the left side.
Extract the numeric value shown in the Red LED.
- chiller_temp: The value.";

const INSTRUCTIONS_ZONE_4: &str = "\
You are reading a Temperature Controller panel with a vertical stack of Red LED displays.
Look for the bottom-most large Red LED display.
This corresponds to the \"Outlet Temp\" or \"Set Temp\".
Extract this value.
- axis_temp: The value.";

static SCHEMA_ZONE_1: ZoneSchema = ZoneSchema {
    instructions: INSTRUCTIONS_ZONE_1,
    fields: &["unwind2", "rewind", "unwind1", "infeed", "oven", "speed"],
};

static SCHEMA_ZONE_2: ZoneSchema = ZoneSchema {
    instructions: INSTRUCTIONS_ZONE_2,
    fields: &["dryer1", "dryer2", "dryer3"],
};

static SCHEMA_ZONE_3: ZoneSchema = ZoneSchema {
    instructions: INSTRUCTIONS_ZONE_3,
    fields: &["chiller_temp"],
};

static SCHEMA_ZONE_4: ZoneSchema = ZoneSchema {
    instructions: INSTRUCTIONS_ZONE_4,
    fields: &["axis_temp"],
};

/// Extraction contract for a zone. Total: every `ZoneId` has a schema.
pub fn describe(zone: ZoneId) -> &'static ZoneSchema {
    match zone {
        ZoneId::Zone1 => &SCHEMA_ZONE_1,
        ZoneId::Zone2 => &SCHEMA_ZONE_2,
        ZoneId::Zone3 => &SCHEMA_ZONE_3,
        ZoneId::Zone4 => &SCHEMA_ZONE_4,
    }
}

// ── Field lookup ────────────────────────────────────────────────────

/// Operator-facing label for a field key. Unknown keys fall back to the
/// key itself so display code never has to handle a miss.
pub fn field_label(key: &str) -> &str {
    match key {
        "unwind2" => "Unwind 2 (Kg)",
        "rewind" => "Rewind (Kg)",
        "unwind1" => "Unwind 1 (Kg)",
        "infeed" => "Infeed (Kg)",
        "oven" => "Oven (Kg)",
        "speed" => "Speed (M/Min)",
        "dryer1" => "Dryer #1 unit",
        "dryer2" => "Dryer #2 unit",
        "dryer3" => "Dryer #3 unit",
        "chiller_temp" => "Chiller temperature",
        "axis_temp" => "Axis temperature",
        other => other,
    }
}

/// The zone that owns a field key, if any.
pub fn zone_of_field(key: &str) -> Option<ZoneId> {
    ZoneId::ALL
        .into_iter()
        .find(|z| describe(*z).fields.contains(&key))
}

/// Every field key across all zones, in zone order then registry order.
/// This is the flattening order of the submission payload.
pub fn all_fields() -> impl Iterator<Item = (ZoneId, &'static str)> {
    ZoneId::ALL
        .into_iter()
        .flat_map(|z| describe(z).fields.iter().map(move |f| (z, *f)))
}

/// Check the registry-wide invariant: no field key appears in two zones.
pub fn fields_are_globally_unique() -> bool {
    let mut seen: Vec<&str> = Vec::new();
    for (_, field) in all_fields() {
        if seen.contains(&field) {
            return false;
        }
        seen.push(field);
    }
    true
}

// ── Tests ───────────────────────────────────────────────────────────
