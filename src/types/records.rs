//! Source record types: EquipmentUnit, OperationalReading, MaintenanceEvent,
//! OccurrenceRecord
//!
//! Every dataset row is a fixed-schema typed record so that schema drift is
//! caught at load/validation time, not at field lookup time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observed symptom that marks a full stoppage occurrence.
pub const STOPPAGE_SYMPTOM: &str = "Stopped working";

/// One physical asset in the fleet catalog. The catalog is fixed and
/// immutable for the duration of a scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUnit {
    /// Integer equipment id
    pub id: u32,
    /// Display name (e.g. "Centrifugal Pump")
    pub name: String,
}

/// Kind of maintenance intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceType {
    Preventive,
    Corrective,
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceType::Preventive => write!(f, "Preventive"),
            MaintenanceType::Corrective => write!(f, "Corrective"),
        }
    }
}

impl FromStr for MaintenanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Preventive" => Ok(MaintenanceType::Preventive),
            "Corrective" => Ok(MaintenanceType::Corrective),
            other => Err(format!("unknown maintenance type: {other:?}")),
        }
    }
}

/// One daily operational reading for a unit.
///
/// One reading per unit per day is expected in principle, but a unit may
/// have zero or multiple source rows on a date; downstream joins tolerate
/// missing dates for any given unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalReading {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub date: NaiveDate,
    /// Temperature (°C)
    pub temperature_c: f64,
    /// Pressure (bar)
    pub pressure_bar: f64,
    /// Vibration amplitude (mm/s)
    pub vibration_mm_s: f64,
    /// Hours the unit ran that day. Signed so that out-of-domain source
    /// values are caught by validation instead of wrapping at parse time.
    pub operating_hours: i64,
    /// Energy consumption (kWh)
    pub energy_kwh: i64,
}

/// One maintenance intervention record. Zero-or-more per unit-date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub date: NaiveDate,
    pub maintenance_type: MaintenanceType,
    /// Parts replaced during the intervention
    pub replaced_parts: Vec<String>,
    /// Root cause when known; `None` for "N/A" source rows
    pub failure_cause: Option<String>,
}

/// One fault-occurrence record. Zero-or-more per unit-date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub date: NaiveDate,
    /// Component where the symptom was observed
    pub part: String,
    /// Free-text symptom (e.g. "Abnormal vibration", "Stopped working")
    pub observed_symptom: String,
    /// 1 iff the symptom indicates a full stoppage, else 0.
    ///
    /// Kept for stoppage-only consumers. The training label does NOT use
    /// this flag — any matched occurrence marks a row as a positive.
    pub failure_class: u8,
}

impl OccurrenceRecord {
    /// Stoppage classification for a symptom string.
    pub fn classify_symptom(symptom: &str) -> u8 {
        u8::from(symptom == STOPPAGE_SYMPTOM)
    }
}
