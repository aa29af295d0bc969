//! Shared data structures for the predictive maintenance pipeline
//!
//! - Source records: typed rows for the three input datasets
//! - Engineered features: FeatureRow + the shared ordered feature schema
//! - Evaluation: held-out classification report
//! - Advisory outputs: Alert, Recommendation, ScanReport

mod records;
mod features;
mod ml;
mod advisory;

pub use records::*;
pub use features::*;
pub use ml::*;
pub use advisory::*;
