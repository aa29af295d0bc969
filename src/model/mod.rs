//! Risk Model: classifier contract, imputation policy, and split
//!
//! The classifier is polymorphic over implementation: anything probabilistic
//! that can train class-weighted satisfies `RiskClassifier`. The reference
//! implementation is the seeded random forest in `forest`.
//!
//! ## Imputation policy (declared, not silent)
//!
//! The forest does not accept NaN. The nullable
//! `days_since_last_maintenance` feature is imputed with the per-unit
//! median of observed deltas, falling back to the global median, falling
//! back to 0.0 when no unit has two readings. The same `Imputer` instance
//! is used to assemble training and scoring vectors.

mod tree;
mod forest;
pub mod metrics;

pub use forest::RandomForest;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{FeatureRow, FEATURE_COUNT};

/// Risk model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("predict called before the model was trained")]
    Untrained,

    #[error("feature vector shape mismatch: expected {expected}, got {got}")]
    FeatureShape { expected: usize, got: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,
}

/// Probabilistic binary classifier contract.
///
/// `fit` consumes vectors laid out per `types::FEATURE_NAMES`;
/// `predict_proba` returns the failure-class probability in [0,1] and is a
/// pure function of the trained artifact and its input.
pub trait RiskClassifier: Send + Sync {
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<(), ModelError>;
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError>;
}

// ============================================================================
// Imputation
// ============================================================================

/// Median-based imputer for the nullable day-delta feature.
#[derive(Debug, Clone, Default)]
pub struct Imputer {
    per_unit: HashMap<u32, f64>,
    global: f64,
}

impl Imputer {
    /// Learn imputation values from the engineered rows.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let mut by_unit: HashMap<u32, Vec<f64>> = HashMap::new();
        let mut all = Vec::new();
        for row in rows {
            if let Some(delta) = row.days_since_last_maintenance {
                by_unit.entry(row.equipment_id).or_default().push(delta as f64);
                all.push(delta as f64);
            }
        }

        let global = median(&mut all).unwrap_or(0.0);
        let per_unit = by_unit
            .into_iter()
            .filter_map(|(id, mut deltas)| median(&mut deltas).map(|m| (id, m)))
            .collect();
        Self { per_unit, global }
    }

    /// Fill value for a unit's missing day delta.
    pub fn fill(&self, equipment_id: u32) -> f64 {
        self.per_unit.get(&equipment_id).copied().unwrap_or(self.global)
    }

    /// Dense feature vector for a row, with the declared imputation applied.
    pub fn vector(&self, row: &FeatureRow) -> Vec<f64> {
        let fill = self.fill(row.equipment_id);
        row.raw_features()
            .into_iter()
            .map(|v| v.unwrap_or(fill))
            .collect()
    }

    /// Training matrix and label vector for the full row set.
    pub fn matrix(&self, rows: &[FeatureRow]) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x = rows.iter().map(|r| self.vector(r)).collect();
        let y = rows.iter().map(|r| r.failure).collect();
        (x, y)
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

// ============================================================================
// Train/Test Split
// ============================================================================

/// Seeded shuffle split: returns (train, test) row indices. The test side
/// gets `floor(n * test_fraction)` rows and may be empty for tiny inputs;
/// callers treat an empty test side as "no held-out evaluation".
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction.clamp(0.0, 0.5)).floor() as usize;
    let test = indices.split_off(n - n_test);
    (indices, test)
}

/// Width guard used by scoring call sites.
pub fn check_vector_width(features: &[f64]) -> Result<(), ModelError> {
    if features.len() == FEATURE_COUNT {
        Ok(())
    } else {
        Err(ModelError::FeatureShape {
            expected: FEATURE_COUNT,
            got: features.len(),
        })
    }
}
