//! CSV Workbook Record Store
//!
//! Loads the three datasets from a directory of CSV files — the on-disk
//! stand-in for the original spreadsheet workbook (one sheet per dataset):
//!
//! - `operational.csv`  → "Operational Data"
//! - `maintenance.csv`  → "Maintenance Data"
//! - `occurrences.csv`  → "Occurrence Records"
//!
//! Column headers mirror the workbook sheets ("Equipment ID", "Date",
//! "Vibration (mm/s)", ...). Parsing is quote-aware so comma-joined part
//! lists survive a round trip. A missing required column is a schema
//! error; an unparseable date or numeric is a data-integrity error.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use super::{
    Dataset, DatasetError, RecordStore, MAINTENANCE_DATASET, OCCURRENCE_DATASET,
    OPERATIONAL_DATASET,
};
use crate::types::{MaintenanceEvent, MaintenanceType, OccurrenceRecord, OperationalReading};

// ============================================================================
// Column Names (workbook schema)
// ============================================================================

const COL_DATE: &str = "Date";
const COL_EQUIPMENT_ID: &str = "Equipment ID";
const COL_EQUIPMENT: &str = "Equipment";
const COL_TEMPERATURE: &str = "Temperature (C)";
const COL_PRESSURE: &str = "Pressure (bar)";
const COL_VIBRATION: &str = "Vibration (mm/s)";
const COL_OPERATING_HOURS: &str = "Operating Hours";
const COL_ENERGY: &str = "Energy Consumption (kWh)";
const COL_MAINTENANCE_TYPE: &str = "Maintenance Type";
const COL_REPLACED_PARTS: &str = "Replaced Parts";
const COL_FAILURE_CAUSE: &str = "Failure Cause";
const COL_PART: &str = "Part";
const COL_SYMPTOM: &str = "Observed Symptom";
const COL_FAILURE_CLASS: &str = "Failure Class";

/// Date format used in the workbook CSVs
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Check for escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.clone());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Quote a field for CSV output when it contains commas or quotes.
fn csv_quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Maps workbook column names to field indices for one CSV file.
struct ColumnMap {
    dataset: &'static str,
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_header(dataset: &'static str, header: &str) -> Self {
        let indices = csv_split(header)
            .into_iter()
            .enumerate()
            .map(|(idx, col)| (col.trim().to_string(), idx))
            .collect();
        Self { dataset, indices }
    }

    /// Index of a required column, or a schema error naming it.
    fn require(&self, column: &str) -> Result<usize, DatasetError> {
        self.indices
            .get(column)
            .copied()
            .ok_or_else(|| DatasetError::Schema {
                dataset: self.dataset,
                column: column.to_string(),
            })
    }

    /// Field value at a required column for one data row.
    fn field<'a>(
        &self,
        fields: &'a [String],
        column: &str,
        line_no: usize,
    ) -> Result<&'a str, DatasetError> {
        let idx = self.require(column)?;
        fields
            .get(idx)
            .map(|s| s.trim())
            .ok_or_else(|| DatasetError::DataIntegrity {
                dataset: self.dataset,
                message: format!("line {line_no}: row has no field for column '{column}'"),
            })
    }
}

// ============================================================================
// Typed Field Parsers
// ============================================================================

fn integrity(dataset: &'static str, line_no: usize, what: &str, raw: &str) -> DatasetError {
    DatasetError::DataIntegrity {
        dataset,
        message: format!("line {line_no}: unparseable {what}: {raw:?}"),
    }
}

fn parse_date(
    dataset: &'static str,
    raw: &str,
    line_no: usize,
) -> Result<NaiveDate, DatasetError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| integrity(dataset, line_no, "calendar date", raw))
}

fn parse_u32(dataset: &'static str, raw: &str, line_no: usize) -> Result<u32, DatasetError> {
    raw.parse()
        .map_err(|_| integrity(dataset, line_no, "integer", raw))
}

fn parse_i64(dataset: &'static str, raw: &str, line_no: usize) -> Result<i64, DatasetError> {
    raw.parse()
        .map_err(|_| integrity(dataset, line_no, "integer", raw))
}

fn parse_f64(dataset: &'static str, raw: &str, line_no: usize) -> Result<f64, DatasetError> {
    raw.parse()
        .map_err(|_| integrity(dataset, line_no, "number", raw))
}

// ============================================================================
// Workbook Adapter
// ============================================================================

/// CSV workbook directory adapter.
///
/// ```ignore
/// use vigil_pdm::dataset::{CsvWorkbook, RecordStore};
///
/// let store = CsvWorkbook::new("data/fleet");
/// let dataset = store.load()?;
/// ```
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    /// File name of the operational readings CSV
    pub const OPERATIONAL_FILE: &'static str = "operational.csv";
    /// File name of the maintenance events CSV
    pub const MAINTENANCE_FILE: &'static str = "maintenance.csv";
    /// File name of the occurrence records CSV
    pub const OCCURRENCE_FILE: &'static str = "occurrences.csv";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Non-empty data lines of one workbook file, paired with the header map.
    fn read_rows(
        &self,
        file: &str,
        dataset: &'static str,
    ) -> Result<(ColumnMap, Vec<(usize, Vec<String>)>), DatasetError> {
        let path = self.dir.join(file);
        let content = fs::read_to_string(&path)?;
        let mut lines = content.lines().enumerate();

        let Some((_, header)) = lines.next() else {
            return Err(DatasetError::DataIntegrity {
                dataset,
                message: format!("{} is empty (no header row)", path.display()),
            });
        };
        let map = ColumnMap::from_header(dataset, header);

        let rows = lines
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, csv_split(line)))
            .collect();
        Ok((map, rows))
    }

    fn load_operational(&self) -> Result<Vec<OperationalReading>, DatasetError> {
        let ds = OPERATIONAL_DATASET;
        let (map, rows) = self.read_rows(Self::OPERATIONAL_FILE, ds)?;
        // Validate the full schema up front so a missing column is reported
        // even for an empty file.
        for col in [
            COL_DATE,
            COL_EQUIPMENT_ID,
            COL_EQUIPMENT,
            COL_TEMPERATURE,
            COL_PRESSURE,
            COL_VIBRATION,
            COL_OPERATING_HOURS,
            COL_ENERGY,
        ] {
            map.require(col)?;
        }

        let mut readings = Vec::with_capacity(rows.len());
        for (line_no, fields) in rows {
            readings.push(OperationalReading {
                date: parse_date(ds, map.field(&fields, COL_DATE, line_no)?, line_no)?,
                equipment_id: parse_u32(
                    ds,
                    map.field(&fields, COL_EQUIPMENT_ID, line_no)?,
                    line_no,
                )?,
                equipment_name: map.field(&fields, COL_EQUIPMENT, line_no)?.to_string(),
                temperature_c: parse_f64(
                    ds,
                    map.field(&fields, COL_TEMPERATURE, line_no)?,
                    line_no,
                )?,
                pressure_bar: parse_f64(ds, map.field(&fields, COL_PRESSURE, line_no)?, line_no)?,
                vibration_mm_s: parse_f64(
                    ds,
                    map.field(&fields, COL_VIBRATION, line_no)?,
                    line_no,
                )?,
                operating_hours: parse_i64(
                    ds,
                    map.field(&fields, COL_OPERATING_HOURS, line_no)?,
                    line_no,
                )?,
                energy_kwh: parse_i64(ds, map.field(&fields, COL_ENERGY, line_no)?, line_no)?,
            });
        }
        Ok(readings)
    }

    fn load_maintenance(&self) -> Result<Vec<MaintenanceEvent>, DatasetError> {
        let ds = MAINTENANCE_DATASET;
        let (map, rows) = self.read_rows(Self::MAINTENANCE_FILE, ds)?;
        for col in [
            COL_DATE,
            COL_EQUIPMENT_ID,
            COL_EQUIPMENT,
            COL_MAINTENANCE_TYPE,
            COL_REPLACED_PARTS,
            COL_FAILURE_CAUSE,
        ] {
            map.require(col)?;
        }

        let mut events = Vec::with_capacity(rows.len());
        for (line_no, fields) in rows {
            let raw_type = map.field(&fields, COL_MAINTENANCE_TYPE, line_no)?;
            let maintenance_type: MaintenanceType = raw_type
                .parse()
                .map_err(|_| integrity(ds, line_no, "maintenance type", raw_type))?;

            let raw_parts = map.field(&fields, COL_REPLACED_PARTS, line_no)?;
            let replaced_parts = raw_parts
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();

            let raw_cause = map.field(&fields, COL_FAILURE_CAUSE, line_no)?;
            let failure_cause = match raw_cause {
                "" | "N/A" => None,
                cause => Some(cause.to_string()),
            };

            events.push(MaintenanceEvent {
                date: parse_date(ds, map.field(&fields, COL_DATE, line_no)?, line_no)?,
                equipment_id: parse_u32(
                    ds,
                    map.field(&fields, COL_EQUIPMENT_ID, line_no)?,
                    line_no,
                )?,
                equipment_name: map.field(&fields, COL_EQUIPMENT, line_no)?.to_string(),
                maintenance_type,
                replaced_parts,
                failure_cause,
            });
        }
        Ok(events)
    }

    fn load_occurrences(&self) -> Result<Vec<OccurrenceRecord>, DatasetError> {
        let ds = OCCURRENCE_DATASET;
        let (map, rows) = self.read_rows(Self::OCCURRENCE_FILE, ds)?;
        for col in [
            COL_DATE,
            COL_EQUIPMENT_ID,
            COL_EQUIPMENT,
            COL_PART,
            COL_SYMPTOM,
            COL_FAILURE_CLASS,
        ] {
            map.require(col)?;
        }

        let mut records = Vec::with_capacity(rows.len());
        for (line_no, fields) in rows {
            let raw_class = map.field(&fields, COL_FAILURE_CLASS, line_no)?;
            let failure_class = raw_class
                .parse::<u8>()
                .map_err(|_| integrity(ds, line_no, "failure class", raw_class))?;

            records.push(OccurrenceRecord {
                date: parse_date(ds, map.field(&fields, COL_DATE, line_no)?, line_no)?,
                equipment_id: parse_u32(
                    ds,
                    map.field(&fields, COL_EQUIPMENT_ID, line_no)?,
                    line_no,
                )?,
                equipment_name: map.field(&fields, COL_EQUIPMENT, line_no)?.to_string(),
                part: map.field(&fields, COL_PART, line_no)?.to_string(),
                observed_symptom: map.field(&fields, COL_SYMPTOM, line_no)?.to_string(),
                failure_class,
            });
        }
        Ok(records)
    }

    /// Write a dataset to the workbook directory (creates it if needed).
    /// Produces files that `load()` reads back identically.
    pub fn write(&self, dataset: &Dataset) -> Result<(), DatasetError> {
        fs::create_dir_all(&self.dir)?;

        let mut op = fs::File::create(self.dir.join(Self::OPERATIONAL_FILE))?;
        writeln!(
            op,
            "{COL_DATE},{COL_EQUIPMENT_ID},{COL_EQUIPMENT},{COL_TEMPERATURE},{COL_PRESSURE},{COL_VIBRATION},{COL_OPERATING_HOURS},{COL_ENERGY}"
        )?;
        for r in &dataset.operational {
            writeln!(
                op,
                "{},{},{},{},{},{},{},{}",
                r.date.format(DATE_FORMAT),
                r.equipment_id,
                csv_quote(&r.equipment_name),
                r.temperature_c,
                r.pressure_bar,
                r.vibration_mm_s,
                r.operating_hours,
                r.energy_kwh
            )?;
        }

        let mut mt = fs::File::create(self.dir.join(Self::MAINTENANCE_FILE))?;
        writeln!(
            mt,
            "{COL_DATE},{COL_EQUIPMENT_ID},{COL_EQUIPMENT},{COL_MAINTENANCE_TYPE},{COL_REPLACED_PARTS},{COL_FAILURE_CAUSE}"
        )?;
        for e in &dataset.maintenance {
            writeln!(
                mt,
                "{},{},{},{},{},{}",
                e.date.format(DATE_FORMAT),
                e.equipment_id,
                csv_quote(&e.equipment_name),
                e.maintenance_type,
                csv_quote(&e.replaced_parts.join(", ")),
                csv_quote(e.failure_cause.as_deref().unwrap_or("N/A"))
            )?;
        }

        let mut oc = fs::File::create(self.dir.join(Self::OCCURRENCE_FILE))?;
        writeln!(
            oc,
            "{COL_DATE},{COL_EQUIPMENT_ID},{COL_EQUIPMENT},{COL_PART},{COL_SYMPTOM},{COL_FAILURE_CLASS}"
        )?;
        for o in &dataset.occurrences {
            writeln!(
                oc,
                "{},{},{},{},{},{}",
                o.date.format(DATE_FORMAT),
                o.equipment_id,
                csv_quote(&o.equipment_name),
                csv_quote(&o.part),
                csv_quote(&o.observed_symptom),
                o.failure_class
            )?;
        }

        Ok(())
    }
}

impl RecordStore for CsvWorkbook {
    fn load(&self) -> Result<Dataset, DatasetError> {
        let dataset = Dataset {
            operational: self.load_operational()?,
            maintenance: self.load_maintenance()?,
            occurrences: self.load_occurrences()?,
        };
        dataset.validate()?;
        debug!(
            operational = dataset.operational.len(),
            maintenance = dataset.maintenance.len(),
            occurrences = dataset.occurrences.len(),
            "loaded CSV workbook from {}",
            self.dir.display()
        );
        Ok(dataset)
    }
}
