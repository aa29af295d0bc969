//! Pipeline Coordinator — synchronous scan sequence
//!
//! ```text
//! PHASE 1: Load + validate (record store)
//! PHASE 2: Feature engineering (joins + derived fields)
//! PHASE 3: Model training (seeded split, class-weighted forest)
//! PHASE 4: Held-out evaluation (when a test split exists)
//! PHASE 5: Latest-snapshot scoring (every unit, no silent drops)
//! PHASE 6: Rule layer (alerts + recommendations)
//! ```
//!
//! `run_scan` is a pure function of (dataset, config): repeated runs with
//! identical inputs and an identical seed produce identical reports. Any
//! stage error aborts the run with its specific kind — no partial results
//! reach the presentation layer.

use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use crate::config::ScanConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::engine::{AlertEngine, EngineError};
use crate::features::FeatureBuilder;
use crate::model::{
    check_vector_width, metrics, Imputer, ModelError, RandomForest, RiskClassifier,
    train_test_split,
};
use crate::types::ScanReport;

/// Terminating scan errors, one per failing stage
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Run one complete scan over the dataset.
pub fn run_scan(dataset: &Dataset, config: &ScanConfig) -> Result<ScanReport, ScanError> {
    // PHASE 1-2: validate + engineer features
    let rows = FeatureBuilder::build(dataset)?;
    info!(rows = rows.len(), "feature engineering complete");

    // PHASE 3: seeded split, class-weighted training
    let imputer = Imputer::fit(&rows);
    let (x, y) = imputer.matrix(&rows);
    let (train_idx, test_idx) = train_test_split(x.len(), config.test_fraction, config.seed);

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<u8> = train_idx.iter().map(|&i| y[i]).collect();

    let mut model = RandomForest::new(config.n_trees, config.max_depth)
        .with_seed(config.seed)
        .with_sample_ratio(config.sample_ratio)
        .with_min_samples_split(config.min_samples_split);
    model.fit(&x_train, &y_train)?;
    info!(
        train_rows = x_train.len(),
        trees = model.n_trees(),
        "risk model trained"
    );

    // PHASE 4: held-out evaluation when a test split exists
    let evaluation = if test_idx.is_empty() {
        None
    } else {
        let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
        let y_test: Vec<u8> = test_idx.iter().map(|&i| y[i]).collect();
        let report = metrics::evaluate(&model, &x_test, &y_test)?;
        info!(
            test_rows = report.n_samples,
            accuracy = report.accuracy,
            "held-out evaluation complete"
        );
        Some(report)
    };

    // PHASE 5: score the latest snapshot of every unit
    let latest = AlertEngine::latest_per_unit(&rows);
    let mut scores: HashMap<u32, f64> = HashMap::with_capacity(latest.len());
    for row in &latest {
        let vector = imputer.vector(row);
        check_vector_width(&vector)?;
        let probability = model.predict_proba(&vector)?;
        scores.insert(row.equipment_id, probability);
    }
    info!(units = scores.len(), "latest snapshots scored");

    // PHASE 6: rule layer
    let (alerts, recommendations) = AlertEngine::generate(&latest, &scores, config)?;
    info!(
        alerts = alerts.len(),
        recommendations = recommendations.len(),
        "scan complete"
    );

    Ok(ScanReport {
        alerts,
        recommendations,
        units_scored: scores.len(),
        evaluation,
    })
}
