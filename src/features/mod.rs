//! Feature Builder: joins the three datasets and derives temporal features
//!
//! Operational readings are the backbone. Maintenance and occurrence rows
//! are left-joined on (equipment id, date); a unit-date with no match is
//! retained with sentinel/null context. Derived fields are computed per
//! unit over the date-sorted reading sequence:
//!
//! - `failure`: 1 iff any occurrence matched the unit-date
//! - `days_since_last_maintenance`: day delta to the previous reading
//! - `cumulative_operating_hours`: running per-unit sum
//!
//! Output order is the stable (equipment id, date) sort — deterministic
//! for fixed inputs.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::dataset::{Dataset, DatasetError};
use crate::types::{FeatureRow, MaintenanceEvent, OccurrenceRecord, NONE_SENTINEL};

/// Stateless feature builder
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Build the engineered feature set from a validated dataset.
    ///
    /// Re-checks domain invariants so callers that skip `Dataset::validate`
    /// still cannot feed out-of-domain rows into training.
    pub fn build(dataset: &Dataset) -> Result<Vec<FeatureRow>, DatasetError> {
        dataset.validate()?;

        // First matching context row per unit-date wins (stable in source
        // order), keeping exactly one engineered row per reading.
        let maintenance_by_key = index_by_key(&dataset.maintenance, |e| (e.equipment_id, e.date));
        let occurrence_by_key = index_by_key(&dataset.occurrences, |o| (o.equipment_id, o.date));

        // Stable sort: equipment id, then date. Ties keep source order.
        let mut readings: Vec<_> = dataset.operational.iter().collect();
        readings.sort_by_key(|r| (r.equipment_id, r.date));

        let mut rows = Vec::with_capacity(readings.len());
        let mut prev_date: Option<(u32, NaiveDate)> = None;
        let mut cumulative_hours: i64 = 0;

        for reading in readings {
            let key = (reading.equipment_id, reading.date);

            // Reset per-unit state at group boundaries
            let days_since_last = match prev_date {
                Some((prev_id, prev)) if prev_id == reading.equipment_id => {
                    Some((reading.date - prev).num_days())
                }
                _ => {
                    cumulative_hours = 0;
                    None
                }
            };
            prev_date = Some(key);
            cumulative_hours += reading.operating_hours;

            let maintenance = maintenance_by_key.get(&key).copied();
            let occurrence = occurrence_by_key.get(&key).copied();

            rows.push(Self::assemble_row(
                reading,
                maintenance,
                occurrence,
                days_since_last,
                cumulative_hours,
            ));
        }

        debug!(
            rows = rows.len(),
            positives = rows.iter().filter(|r| r.failure == 1).count(),
            "feature set built"
        );
        Ok(rows)
    }

    fn assemble_row(
        reading: &crate::types::OperationalReading,
        maintenance: Option<&MaintenanceEvent>,
        occurrence: Option<&OccurrenceRecord>,
        days_since_last: Option<i64>,
        cumulative_hours: i64,
    ) -> FeatureRow {
        let (maintenance_type, replaced_parts, failure_cause) = match maintenance {
            Some(event) => (
                event.maintenance_type.to_string(),
                if event.replaced_parts.is_empty() {
                    NONE_SENTINEL.to_string()
                } else {
                    event.replaced_parts.join(", ")
                },
                event.failure_cause.clone(),
            ),
            None => (NONE_SENTINEL.to_string(), NONE_SENTINEL.to_string(), None),
        };

        FeatureRow {
            equipment_id: reading.equipment_id,
            equipment_name: reading.equipment_name.clone(),
            date: reading.date,
            temperature_c: reading.temperature_c,
            pressure_bar: reading.pressure_bar,
            vibration_mm_s: reading.vibration_mm_s,
            operating_hours: reading.operating_hours,
            energy_kwh: reading.energy_kwh,
            maintenance_type,
            replaced_parts,
            failure_cause,
            observed_part: occurrence.map(|o| o.part.clone()),
            observed_symptom: occurrence.map(|o| o.observed_symptom.clone()),
            // Any matched occurrence is a positive, regardless of its own
            // failure_class flag.
            failure: u8::from(occurrence.is_some()),
            days_since_last_maintenance: days_since_last,
            cumulative_operating_hours: cumulative_hours,
        }
    }
}

/// Index rows by key, first row per key wins.
fn index_by_key<T, K: std::hash::Hash + Eq>(
    rows: &[T],
    key: impl Fn(&T) -> K,
) -> HashMap<K, &T> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        map.entry(key(row)).or_insert(row);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MaintenanceType, OperationalReading};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date")
    }

    fn reading(id: u32, day: u32, hours: i64) -> OperationalReading {
        OperationalReading {
            equipment_id: id,
            equipment_name: format!("Unit {id}"),
            date: date(day),
            temperature_c: 95.0,
            pressure_bar: 12.0,
            vibration_mm_s: 1.8,
            operating_hours: hours,
            energy_kwh: 400,
        }
    }

    fn occurrence(id: u32, day: u32, symptom: &str) -> OccurrenceRecord {
        OccurrenceRecord {
            equipment_id: id,
            equipment_name: format!("Unit {id}"),
            date: date(day),
            part: "Bearing".to_string(),
            observed_symptom: symptom.to_string(),
            failure_class: OccurrenceRecord::classify_symptom(symptom),
        }
    }

    fn maintenance(id: u32, day: u32) -> MaintenanceEvent {
        MaintenanceEvent {
            equipment_id: id,
            equipment_name: format!("Unit {id}"),
            date: date(day),
            maintenance_type: MaintenanceType::Corrective,
            replaced_parts: vec!["Bearing".to_string(), "Valve".to_string()],
            failure_cause: Some("Natural wear".to_string()),
        }
    }

    #[test]
    fn test_unmatched_rows_get_sentinels() {
        let dataset = Dataset {
            operational: vec![reading(1, 1, 20)],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].maintenance_type, "None");
        assert_eq!(rows[0].replaced_parts, "None");
        assert_eq!(rows[0].failure_cause, None);
        assert_eq!(rows[0].observed_symptom, None);
        assert_eq!(rows[0].failure, 0);
    }

    #[test]
    fn test_any_occurrence_marks_failure() {
        // A non-stoppage symptom (failure_class 0) still labels the row
        let dataset = Dataset {
            operational: vec![reading(1, 1, 20), reading(1, 2, 20)],
            occurrences: vec![occurrence(1, 2, "Pressure loss")],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows[0].failure, 0);
        assert_eq!(rows[1].failure, 1);
        assert_eq!(rows[1].observed_symptom.as_deref(), Some("Pressure loss"));
    }

    #[test]
    fn test_maintenance_join_fields() {
        let dataset = Dataset {
            operational: vec![reading(1, 1, 20)],
            maintenance: vec![maintenance(1, 1)],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows[0].maintenance_type, "Corrective");
        assert_eq!(rows[0].replaced_parts, "Bearing, Valve");
        assert_eq!(rows[0].failure_cause.as_deref(), Some("Natural wear"));
    }

    #[test]
    fn test_day_delta_per_unit() {
        // d1 < d2 < d3 with a gap: deltas are None, 1, 3
        let dataset = Dataset {
            operational: vec![reading(1, 5, 20), reading(1, 1, 20), reading(1, 2, 20)],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows[0].days_since_last_maintenance, None);
        assert_eq!(rows[1].days_since_last_maintenance, Some(1));
        assert_eq!(rows[2].days_since_last_maintenance, Some(3));
    }

    #[test]
    fn test_delta_resets_between_units() {
        let dataset = Dataset {
            operational: vec![reading(1, 1, 20), reading(1, 4, 20), reading(2, 9, 20)],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows[1].days_since_last_maintenance, Some(3));
        // First row of unit 2: no delta even though unit 1 had prior dates
        assert_eq!(rows[2].days_since_last_maintenance, None);
    }

    #[test]
    fn test_cumulative_hours_running_sum() {
        let dataset = Dataset {
            operational: vec![
                reading(1, 1, 16),
                reading(1, 2, 20),
                reading(1, 3, 24),
                reading(2, 1, 10),
            ],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        let unit1: Vec<i64> = rows
            .iter()
            .filter(|r| r.equipment_id == 1)
            .map(|r| r.cumulative_operating_hours)
            .collect();
        assert_eq!(unit1, vec![16, 36, 60]);
        // Non-decreasing across sorted dates
        assert!(unit1.windows(2).all(|w| w[0] <= w[1]));
        // Unit 2 restarts its own sum
        assert_eq!(rows[3].cumulative_operating_hours, 10);
    }

    #[test]
    fn test_output_is_sorted_and_deterministic() {
        let dataset = Dataset {
            operational: vec![reading(2, 1, 8), reading(1, 2, 8), reading(1, 1, 8)],
            ..Default::default()
        };
        let rows_a = FeatureBuilder::build(&dataset).expect("build");
        let rows_b = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(rows_a, rows_b);
        let keys: Vec<(u32, NaiveDate)> =
            rows_a.iter().map(|r| (r.equipment_id, r.date)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_first_context_row_wins_on_duplicates() {
        let mut second = occurrence(1, 1, "Fluid leakage");
        second.part = "Valve".to_string();
        let dataset = Dataset {
            operational: vec![reading(1, 1, 20)],
            occurrences: vec![occurrence(1, 1, "Abnormal vibration"), second],
            ..Default::default()
        };
        let rows = FeatureBuilder::build(&dataset).expect("build");
        assert_eq!(
            rows[0].observed_symptom.as_deref(),
            Some("Abnormal vibration")
        );
    }
}
