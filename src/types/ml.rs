//! Model evaluation types: per-class metrics and the held-out report
//!
//! Evaluation is computable on demand from the held-out split; it rides on
//! the scan report for validation but is not part of the alerting contract.

use serde::{Deserialize, Serialize};

/// Precision/recall/F1 for a single class of the binary target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// TP / (TP + FP); 0.0 when nothing was predicted as this class
    pub precision: f64,
    /// TP / (TP + FN); 0.0 when the class has no true members
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0.0 when both are 0
    pub f1: f64,
    /// Number of held-out rows with this true class
    pub support: usize,
}

impl ClassMetrics {
    /// Build metrics from confusion-matrix counts for one class.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize, support: usize) -> Self {
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support,
        }
    }
}

/// Held-out evaluation of the trained risk classifier at the 0.5 cutoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Metrics for the no-failure class (0)
    pub no_failure: ClassMetrics,
    /// Metrics for the failure class (1)
    pub failure: ClassMetrics,
    /// Overall accuracy on the held-out split
    pub accuracy: f64,
    /// Held-out row count
    pub n_samples: usize,
}
