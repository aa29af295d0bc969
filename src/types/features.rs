//! Engineered feature types: FeatureRow and the shared ordered feature schema
//!
//! The feature schema is a single ordered list consumed by both training and
//! scoring, so the exact feature order used at training time can never drift
//! from the order used at the scoring call site.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered model feature schema. Index positions are the feature vector
/// layout for both `fit` and `predict_proba`.
pub const FEATURE_NAMES: [&str; 5] = [
    "temperature_c",
    "pressure_bar",
    "vibration_mm_s",
    "days_since_last_maintenance",
    "cumulative_operating_hours",
];

/// Number of model features
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Sentinel used for absent joined maintenance strings
pub const NONE_SENTINEL: &str = "None";

/// One engineered observation: a unit's operational reading with left-joined
/// maintenance/occurrence context and derived temporal features. Used for
/// both training and latest-snapshot scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub date: NaiveDate,

    // === Operational reading fields ===
    pub temperature_c: f64,
    pub pressure_bar: f64,
    pub vibration_mm_s: f64,
    pub operating_hours: i64,
    pub energy_kwh: i64,

    // === Left-joined maintenance context ===
    /// Maintenance type for the unit-date, or `"None"` when no event matched
    pub maintenance_type: String,
    /// Comma-joined replaced parts, or `"None"` when no event matched
    pub replaced_parts: String,
    /// Failure cause from the matched maintenance event, when known
    pub failure_cause: Option<String>,

    // === Left-joined occurrence context ===
    pub observed_part: Option<String>,
    pub observed_symptom: Option<String>,

    // === Derived features ===
    /// Training label: 1 iff ANY occurrence record matched this unit-date.
    ///
    /// Deliberately independent of the occurrence's own `failure_class`
    /// flag — every matched occurrence is a training positive, not only
    /// full stoppages.
    pub failure: u8,
    /// Calendar-day delta to the unit's previous operational reading date;
    /// `None` on the unit's first observed date.
    ///
    /// Historical name: despite "maintenance", this is the gap between
    /// consecutive *reading* dates, kept for continuity with the source
    /// datasets.
    pub days_since_last_maintenance: Option<i64>,
    /// Running sum of operating hours for the unit, ordered by date
    pub cumulative_operating_hours: i64,
}

impl FeatureRow {
    /// Raw model features in `FEATURE_NAMES` order. The nullable delta
    /// feature stays `None`-capable here; resolving it is the model's
    /// declared imputation policy, not a silent coercion at assembly time.
    pub fn raw_features(&self) -> [Option<f64>; FEATURE_COUNT] {
        [
            Some(self.temperature_c),
            Some(self.pressure_bar),
            Some(self.vibration_mm_s),
            self.days_since_last_maintenance.map(|d| d as f64),
            Some(self.cumulative_operating_hours as f64),
        ]
    }
}
