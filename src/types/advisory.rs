//! Advisory output types: Alert, Recommendation, Priority, ScanReport
//!
//! These are transient output records, regenerated on every scan and
//! discarded after presentation. They are structured (not pre-formatted
//! strings) so a console renderer, a GUI, or a machine consumer can each
//! format them independently.

use serde::{Deserialize, Serialize};

use super::ClassificationReport;

/// Recommendation priority tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// High-urgency notification, emitted only above the critical probability
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub equipment_id: u32,
    pub equipment_name: String,
    /// Raw failure probability in [0,1]
    pub probability: f64,
    /// Probability formatted to the nearest whole percent (e.g. "87%")
    pub probability_pct: String,
    /// Human-readable alert lines, including the expected symptom
    /// ("Unknown" when no occurrence context joined)
    pub messages: Vec<String>,
}

/// Tiered maintenance action suggestion. A superset of alert-triggering
/// conditions plus the lower-urgency Medium tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub equipment_id: u32,
    pub equipment_name: String,
    /// Recommended action lines
    pub actions: Vec<String>,
    pub priority: Priority,
}

/// Complete output of one scan run: either this whole report is produced
/// or the run fails with a single terminating error — there is no partial
/// display mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Critical alerts, ordered by equipment id
    pub alerts: Vec<Alert>,
    /// Maintenance recommendations, ordered by equipment id
    pub recommendations: Vec<Recommendation>,
    /// Number of units scored (== distinct ids in the latest-row set)
    pub units_scored: usize,
    /// Held-out evaluation of the trained model; `None` when the dataset
    /// was too small to reserve a held-out split
    pub evaluation: Option<ClassificationReport>,
}
