//! VIGIL-PdM: Predictive Maintenance Operational Intelligence
//!
//! Estimates near-term failure risk for industrial equipment from
//! historical operating, maintenance, and fault-occurrence records, and
//! emits threshold-driven maintenance alerts and recommendations.
//!
//! ## Architecture
//!
//! - **Record Store**: swappable backend yielding the three typed datasets
//! - **Feature Builder**: per-unit joins + temporal/cumulative features
//! - **Risk Model**: seeded, class-weighted random forest classifier
//! - **Alert Engine**: deterministic threshold rules → alerts/recommendations
//! - **Pipeline**: pure `run_scan(dataset, config) -> ScanReport`

pub mod config;
pub mod types;
pub mod dataset;
pub mod features;
pub mod model;
pub mod engine;
pub mod pipeline;
pub mod sim;

// Re-export the scan entrypoint and its error
pub use pipeline::{run_scan, ScanError};

// Re-export commonly used types
pub use types::{
    Alert, ClassMetrics, ClassificationReport, FeatureRow, Priority, Recommendation, ScanReport,
};

// Re-export configuration
pub use config::ScanConfig;

// Re-export record store components
pub use dataset::{CsvWorkbook, Dataset, DatasetError, RecordStore};

// Re-export model components
pub use model::{ModelError, RandomForest, RiskClassifier};
