//! Held-out evaluation of a trained risk classifier
//!
//! Not part of the runtime alerting contract; computed on demand for
//! validation and carried on the scan report.

use crate::types::{ClassMetrics, ClassificationReport};

use super::{ModelError, RiskClassifier};

/// Probability cutoff for the evaluation confusion matrix
const DECISION_CUTOFF: f64 = 0.5;

/// Score every held-out row and build the per-class report.
pub fn evaluate(
    model: &dyn RiskClassifier,
    x_test: &[Vec<f64>],
    y_test: &[u8],
) -> Result<ClassificationReport, ModelError> {
    let mut predictions = Vec::with_capacity(x_test.len());
    for features in x_test {
        let p = model.predict_proba(features)?;
        predictions.push(u8::from(p > DECISION_CUTOFF));
    }
    Ok(report_from_predictions(&predictions, y_test))
}

/// Confusion-matrix report from hard predictions.
pub fn report_from_predictions(predicted: &[u8], truth: &[u8]) -> ClassificationReport {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fn_ = 0usize;
    for (&pred, &actual) in predicted.iter().zip(truth.iter()) {
        match (pred, actual) {
            (1, 1) => tp += 1,
            (1, 0) => fp += 1,
            (0, 0) => tn += 1,
            _ => fn_ += 1,
        }
    }

    let n_samples = truth.len();
    let support_pos = tp + fn_;
    let support_neg = tn + fp;
    ClassificationReport {
        // For class 0 the roles flip: a true negative is its true positive
        no_failure: ClassMetrics::from_counts(tn, fn_, fp, support_neg),
        failure: ClassMetrics::from_counts(tp, fp, fn_, support_pos),
        accuracy: if n_samples > 0 {
            (tp + tn) as f64 / n_samples as f64
        } else {
            0.0
        },
        n_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RandomForest, RiskClassifier};

    #[test]
    fn test_perfect_predictions() {
        let predicted = vec![1, 0, 1, 0];
        let truth = vec![1, 0, 1, 0];
        let report = report_from_predictions(&predicted, &truth);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.failure.f1, 1.0);
        assert_eq!(report.no_failure.f1, 1.0);
        assert_eq!(report.failure.support, 2);
    }

    #[test]
    fn test_mixed_predictions() {
        // tp=1 fp=1 tn=1 fn=1
        let predicted = vec![1, 1, 0, 0];
        let truth = vec![1, 0, 0, 1];
        let report = report_from_predictions(&predicted, &truth);
        assert!((report.accuracy - 0.5).abs() < 1e-12);
        assert!((report.failure.precision - 0.5).abs() < 1e-12);
        assert!((report.failure.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_on_separable_set() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let jitter = (i % 5) as f64 * 0.02;
            x.push(vec![95.0, 12.0, 1.2 + jitter, 1.0, 100.0]);
            y.push(0u8);
            x.push(vec![95.0, 12.0, 2.9 + jitter, 1.0, 100.0]);
            y.push(1u8);
        }
        let mut forest = RandomForest::new(30, 6).with_seed(42);
        forest.fit(&x, &y).expect("fit");

        let report = evaluate(&forest, &x, &y).expect("evaluate");
        assert!(report.accuracy > 0.95, "accuracy {}", report.accuracy);
        assert!(report.failure.recall > 0.95);
    }
}
