//! Random forest risk classifier
//!
//! Bagged ensemble of weighted CART trees with class-balanced sample
//! weights, sqrt-feature subspacing, and fully seeded randomness. Tree
//! construction is parallelized with rayon; per-tree seeds are derived
//! from the root seed, so parallelism never changes the result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use super::tree::DecisionTree;
use super::{ModelError, RiskClassifier};

/// Odd 64-bit constant for per-tree seed derivation (splitmix64 increment)
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random forest ensemble
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_trees: usize,
    max_depth: usize,
    min_samples_split: usize,
    /// Bootstrap sample ratio per tree
    sample_ratio: f64,
    seed: u64,
    /// Feature count locked in at fit time
    n_features: Option<usize>,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_trees: n_trees.max(1),
            max_depth,
            min_samples_split: 2,
            sample_ratio: 0.8,
            seed: 42,
            n_features: None,
        }
    }

    /// Set the root random seed (bagging + feature subspacing)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set bootstrap sample ratio
    pub fn with_sample_ratio(mut self, ratio: f64) -> Self {
        self.sample_ratio = ratio.clamp(0.1, 1.0);
        self
    }

    pub fn with_min_samples_split(mut self, min: usize) -> Self {
        self.min_samples_split = min.max(2);
        self
    }

    /// Balanced class weights `w_c = n / (2 * n_c)` so the minority class
    /// is not dominated in a typically imbalanced dataset. When a class is
    /// absent every sample gets weight 1.0 and trees collapse to a
    /// constant leaf.
    fn balanced_weights(y: &[u8]) -> Vec<f64> {
        let n = y.len() as f64;
        let n_pos = y.iter().filter(|&&label| label == 1).count() as f64;
        let n_neg = n - n_pos;
        if n_pos == 0.0 || n_neg == 0.0 {
            return vec![1.0; y.len()];
        }
        let w_pos = n / (2.0 * n_pos);
        let w_neg = n / (2.0 * n_neg);
        y.iter()
            .map(|&label| if label == 1 { w_pos } else { w_neg })
            .collect()
    }

    /// Aggregated feature importances (mean impurity decrease per tree),
    /// normalized to sum to 1 when any split happened. Diagnostic only.
    pub fn feature_importances(&self) -> Vec<f64> {
        let Some(n_features) = self.n_features else {
            return Vec::new();
        };
        let mut importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                importances[i] += imp;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        importances
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100, 10)
    }
}

impl RiskClassifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<(), ModelError> {
        if x.is_empty() || y.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let n_features = x[0].len();
        if let Some(bad) = x.iter().find(|row| row.len() != n_features) {
            return Err(ModelError::FeatureShape {
                expected: n_features,
                got: bad.len(),
            });
        }
        if x.len() != y.len() {
            return Err(ModelError::FeatureShape {
                expected: x.len(),
                got: y.len(),
            });
        }

        let weights = Self::balanced_weights(y);
        let n = x.len();
        let sample_size = ((n as f64 * self.sample_ratio).ceil() as usize).clamp(1, n);
        // sqrt-feature subspace, the usual forest default
        let n_sub_features = (n_features as f64).sqrt().ceil() as usize;

        let (max_depth, min_split, seed) = (self.max_depth, self.min_samples_split, self.seed);
        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let tree_seed = seed.wrapping_add(tree_idx as u64).wrapping_mul(SEED_STRIDE);
                let mut rng = StdRng::seed_from_u64(tree_seed);

                let bootstrap: Vec<usize> =
                    (0..sample_size).map(|_| rng.gen_range(0..n)).collect();

                let mut tree = DecisionTree::new(max_depth, min_split);
                tree.fit(x, y, &weights, &bootstrap, n_sub_features, &mut rng);
                tree
            })
            .collect();

        self.n_features = Some(n_features);
        debug!(
            trees = self.trees.len(),
            samples = n,
            positives = y.iter().filter(|&&l| l == 1).count(),
            "random forest trained"
        );
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        let n_features = self.n_features.ok_or(ModelError::Untrained)?;
        if features.len() != n_features {
            return Err(ModelError::FeatureShape {
                expected: n_features,
                got: features.len(),
            });
        }

        let probs: Vec<f64> = self
            .trees
            .iter()
            .filter_map(|t| t.predict_proba(features))
            .collect();
        if probs.is_empty() {
            return Err(ModelError::Untrained);
        }
        Ok(probs.iter().sum::<f64>() / probs.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vibration-separable toy set: positives sit above 2.5 mm/s. Every
    /// other feature has the same distribution in both classes, so
    /// vibration is the only separating signal.
    fn toy_data(n_per_class: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..n_per_class {
            let jitter = (i % 7) as f64 * 0.01;
            x.push(vec![95.0 + jitter, 12.0, 1.2 + jitter, 1.0, 100.0 + i as f64]);
            y.push(0);
            x.push(vec![95.0 + jitter, 12.0, 2.9 + jitter, 1.0, 100.0 + i as f64]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_predict_before_fit_is_untrained() {
        let forest = RandomForest::new(10, 4);
        let err = forest
            .predict_proba(&[0.0; 5])
            .expect_err("must be untrained");
        assert!(matches!(err, ModelError::Untrained));
    }

    #[test]
    fn test_feature_shape_mismatch_rejected() {
        let (x, y) = toy_data(20);
        let mut forest = RandomForest::new(10, 4);
        forest.fit(&x, &y).expect("fit");
        let err = forest
            .predict_proba(&[1.0, 2.0])
            .expect_err("wrong width must fail");
        assert!(matches!(
            err,
            ModelError::FeatureShape {
                expected: 5,
                got: 2
            }
        ));
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let mut forest = RandomForest::new(10, 4);
        assert!(matches!(
            forest.fit(&[], &[]),
            Err(ModelError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_separable_classes_score_apart() {
        let (x, y) = toy_data(30);
        let mut forest = RandomForest::new(40, 6).with_seed(42);
        forest.fit(&x, &y).expect("fit");

        let p_healthy = forest
            .predict_proba(&[95.0, 12.0, 1.2, 1.0, 110.0])
            .expect("score");
        let p_failing = forest
            .predict_proba(&[95.0, 12.0, 2.9, 1.0, 110.0])
            .expect("score");
        assert!(p_failing > 0.7, "failing unit should score high: {p_failing}");
        assert!(p_healthy < 0.3, "healthy unit should score low: {p_healthy}");
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let (x, y) = toy_data(25);
        let probe = [95.5, 12.0, 2.0, 1.0, 115.0];

        let mut a = RandomForest::new(30, 6).with_seed(7);
        a.fit(&x, &y).expect("fit");
        let mut b = RandomForest::new(30, 6).with_seed(7);
        b.fit(&x, &y).expect("fit");

        let pa = a.predict_proba(&probe).expect("score");
        let pb = b.predict_proba(&probe).expect("score");
        assert!((pa - pb).abs() == 0.0, "same seed must reproduce: {pa} vs {pb}");
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let (x, y) = toy_data(15);
        let mut forest = RandomForest::new(20, 5);
        forest.fit(&x, &y).expect("fit");
        for row in &x {
            let p = forest.predict_proba(row).expect("score");
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_single_class_collapses_to_constant() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64; 5]).collect();
        let y = vec![0u8; 10];
        let mut forest = RandomForest::new(10, 4);
        forest.fit(&x, &y).expect("fit");
        let p = forest.predict_proba(&[3.0; 5]).expect("score");
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_importances_favor_vibration() {
        let (x, y) = toy_data(40);
        let mut forest = RandomForest::new(40, 6).with_seed(11);
        forest.fit(&x, &y).expect("fit");
        let imp = forest.feature_importances();
        assert_eq!(imp.len(), 5);
        // Vibration (index 2) carries the separation
        let max_idx = imp
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(max_idx, Some(2));
    }
}
