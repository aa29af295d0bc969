//! Record store layer: typed datasets and the swappable storage backend
//!
//! The core pipeline only requires a loader that yields the three row-sets
//! ("Operational Data", "Maintenance Data", "Occurrence Records") as typed
//! records. `RecordStore` is the seam; `CsvWorkbook` is the reference
//! on-disk adapter, and an in-memory `Dataset` satisfies the trait directly
//! for tests and the fleet simulator.

mod csv_store;

pub use csv_store::CsvWorkbook;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MaintenanceEvent, OccurrenceRecord, OperationalReading};

/// Logical name of the operational readings dataset
pub const OPERATIONAL_DATASET: &str = "Operational Data";
/// Logical name of the maintenance events dataset
pub const MAINTENANCE_DATASET: &str = "Maintenance Data";
/// Logical name of the fault occurrence dataset
pub const OCCURRENCE_DATASET: &str = "Occurrence Records";

/// Record store errors. All are unrecoverable for the current run: a
/// partially loaded dataset would silently corrupt training downstream.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{dataset}: missing required column '{column}'")]
    Schema {
        dataset: &'static str,
        column: String,
    },

    #[error("{dataset}: {message}")]
    DataIntegrity {
        dataset: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The three source row-sets for one scan run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub operational: Vec<OperationalReading>,
    pub maintenance: Vec<MaintenanceEvent>,
    pub occurrences: Vec<OccurrenceRecord>,
}

impl Dataset {
    /// Domain validation over already-typed rows. Parse-level problems are
    /// the adapter's responsibility; this catches values that parsed but
    /// are out of domain.
    pub fn validate(&self) -> Result<(), DatasetError> {
        for r in &self.operational {
            if r.operating_hours < 0 {
                return Err(DatasetError::DataIntegrity {
                    dataset: OPERATIONAL_DATASET,
                    message: format!(
                        "negative operating hours ({}) for equipment {} on {}",
                        r.operating_hours, r.equipment_id, r.date
                    ),
                });
            }
            if !(r.temperature_c.is_finite()
                && r.pressure_bar.is_finite()
                && r.vibration_mm_s.is_finite())
            {
                return Err(DatasetError::DataIntegrity {
                    dataset: OPERATIONAL_DATASET,
                    message: format!(
                        "non-finite sensor reading for equipment {} on {}",
                        r.equipment_id, r.date
                    ),
                });
            }
        }
        for o in &self.occurrences {
            if o.failure_class > 1 {
                return Err(DatasetError::DataIntegrity {
                    dataset: OCCURRENCE_DATASET,
                    message: format!(
                        "failure class must be 0 or 1, got {} for equipment {} on {}",
                        o.failure_class, o.equipment_id, o.date
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Swappable record store backend.
///
/// Implementations yield a complete, validated snapshot; the pipeline
/// never sees partial data.
pub trait RecordStore {
    fn load(&self) -> Result<Dataset, DatasetError>;
}

impl RecordStore for Dataset {
    fn load(&self) -> Result<Dataset, DatasetError> {
        self.validate()?;
        Ok(self.clone())
    }
}
