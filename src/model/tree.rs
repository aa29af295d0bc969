//! Weighted CART decision tree for binary classification
//!
//! Splits minimize weighted gini impurity; class-imbalance correction
//! arrives as per-sample weights, so minority-class rows pull on every
//! split decision and leaf distribution.

use rand::rngs::StdRng;
use rand::Rng;

/// Tree node: internal binary split or probability leaf
#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        /// Weighted fraction of failure-class samples at the leaf
        prob: f64,
    },
}

/// One CART tree over dense feature vectors
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Option<Node>,
    max_depth: usize,
    min_samples_split: usize,
    /// Per-split impurity decrease, accumulated per feature
    importances: Vec<f64>,
}

/// Borrowed training set shared by all split computations
struct TrainSet<'a> {
    x: &'a [Vec<f64>],
    y: &'a [u8],
    weights: &'a [f64],
    n_sub_features: usize,
}

impl DecisionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            root: None,
            max_depth,
            min_samples_split: min_samples_split.max(2),
            importances: Vec::new(),
        }
    }

    /// Fit on the rows selected by `indices` (bootstrap sample), with
    /// per-sample weights. `n_sub_features` features are considered per
    /// split (random subspace), drawn from `rng`.
    pub fn fit(
        &mut self,
        x: &[Vec<f64>],
        y: &[u8],
        weights: &[f64],
        indices: &[usize],
        n_sub_features: usize,
        rng: &mut StdRng,
    ) {
        let n_features = x.first().map_or(0, Vec::len);
        self.importances = vec![0.0; n_features];
        let set = TrainSet {
            x,
            y,
            weights,
            n_sub_features: n_sub_features.clamp(1, n_features.max(1)),
        };
        let mut owned = indices.to_vec();
        self.root = Some(self.build(&set, &mut owned, 0, rng));
    }

    /// Probability of the failure class, or None when unfitted.
    pub fn predict_proba(&self, features: &[f64]) -> Option<f64> {
        let mut node = self.root.as_ref()?;
        loop {
            match node {
                Node::Leaf { prob } => return Some(*prob),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Accumulated impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    fn build(
        &mut self,
        set: &TrainSet<'_>,
        indices: &mut [usize],
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let (w_total, w_pos) = weighted_counts(set, indices);
        let leaf = Node::Leaf {
            prob: if w_total > 0.0 { w_pos / w_total } else { 0.0 },
        };

        let node_gini = gini(w_total, w_pos);
        if depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || node_gini == 0.0
        {
            return leaf;
        }

        let Some(split) = self.best_split(set, indices, node_gini, w_total, rng) else {
            return leaf;
        };

        self.importances[split.feature] += split.impurity_decrease;

        // Partition in place: left block holds values <= threshold
        let mid = partition(set.x, indices, split.feature, split.threshold);
        if mid == 0 || mid == indices.len() {
            return leaf;
        }
        let (left_idx, right_idx) = indices.split_at_mut(mid);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(set, left_idx, depth + 1, rng)),
            right: Box::new(self.build(set, right_idx, depth + 1, rng)),
        }
    }

    fn best_split(
        &self,
        set: &TrainSet<'_>,
        indices: &[usize],
        node_gini: f64,
        w_total: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n_features = set.x.first().map_or(0, Vec::len);
        let candidates = sample_features(n_features, set.n_sub_features, rng);
        let w_pos_total = weighted_pos(set, indices);

        let mut best: Option<BestSplit> = None;
        for feature in candidates {
            // Sort samples by this feature's value, then sweep thresholds
            let mut ordered: Vec<(f64, u8, f64)> = indices
                .iter()
                .map(|&i| (set.x[i][feature], set.y[i], set.weights[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut wl = 0.0;
            let mut wl_pos = 0.0;
            for window in 0..ordered.len() - 1 {
                let (value, label, weight) = ordered[window];
                wl += weight;
                if label == 1 {
                    wl_pos += weight;
                }

                let next_value = ordered[window + 1].0;
                if next_value <= value {
                    continue; // no threshold between equal values
                }

                let wr = w_total - wl;
                let wr_pos = w_pos_total - wl_pos;
                let child_gini = (wl * gini(wl, wl_pos) + wr * gini(wr, wr_pos)) / w_total;
                let decrease = node_gini - child_gini;

                if decrease > best.as_ref().map_or(1e-12, |b| b.impurity_decrease) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (value + next_value) / 2.0,
                        impurity_decrease: decrease,
                    });
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity_decrease: f64,
}

fn weighted_counts(set: &TrainSet<'_>, indices: &[usize]) -> (f64, f64) {
    let mut total = 0.0;
    let mut pos = 0.0;
    for &i in indices {
        total += set.weights[i];
        if set.y[i] == 1 {
            pos += set.weights[i];
        }
    }
    (total, pos)
}

fn weighted_pos(set: &TrainSet<'_>, indices: &[usize]) -> f64 {
    indices
        .iter()
        .filter(|&&i| set.y[i] == 1)
        .map(|&i| set.weights[i])
        .sum()
}

/// Binary gini impurity from weighted totals
fn gini(w_total: f64, w_pos: f64) -> f64 {
    if w_total <= 0.0 {
        return 0.0;
    }
    let p = w_pos / w_total;
    2.0 * p * (1.0 - p)
}

/// Stable in-place partition; returns the size of the <= block.
fn partition(x: &[Vec<f64>], indices: &mut [usize], feature: usize, threshold: f64) -> usize {
    indices.sort_by(|&a, &b| {
        let left_a = x[a][feature] <= threshold;
        let left_b = x[b][feature] <= threshold;
        left_b.cmp(&left_a)
    });
    indices
        .iter()
        .take_while(|&&i| x[i][feature] <= threshold)
        .count()
}

/// Draw `k` distinct feature indices (partial Fisher-Yates).
fn sample_features(n_features: usize, k: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n_features).collect();
    let k = k.min(n_features);
    for i in 0..k {
        let j = rng.gen_range(i..n_features);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fit_tree(x: &[Vec<f64>], y: &[u8]) -> DecisionTree {
        let weights = vec![1.0; y.len()];
        let indices: Vec<usize> = (0..y.len()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = DecisionTree::new(5, 2);
        tree.fit(x, y, &weights, &indices, x[0].len(), &mut rng);
        tree
    }

    #[test]
    fn test_separable_data_splits_cleanly() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![if i < 10 { 1.0 } else { 3.0 }, 0.5])
            .collect();
        let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
        let tree = fit_tree(&x, &y);

        let low = tree.predict_proba(&[1.0, 0.5]).expect("fitted");
        let high = tree.predict_proba(&[3.0, 0.5]).expect("fitted");
        assert!(low < 0.1, "low side should be near 0, got {low}");
        assert!(high > 0.9, "high side should be near 1, got {high}");
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0, 0, 0];
        let tree = fit_tree(&x, &y);
        assert_eq!(tree.predict_proba(&[2.0]), Some(0.0));
    }

    #[test]
    fn test_unfitted_returns_none() {
        let tree = DecisionTree::new(3, 2);
        assert_eq!(tree.predict_proba(&[1.0]), None);
    }

    #[test]
    fn test_sample_weights_shift_leaf_probability() {
        // One positive among three, but weighted as heavily as both negatives
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![1, 0, 0];
        let weights = vec![2.0, 1.0, 1.0];
        let indices = vec![0, 1, 2];
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = DecisionTree::new(3, 2);
        tree.fit(&x, &y, &weights, &indices, 1, &mut rng);

        let p = tree.predict_proba(&[1.0]).expect("fitted");
        assert!((p - 0.5).abs() < 1e-12, "weighted prob should be 0.5, got {p}");
    }

    #[test]
    fn test_importances_track_split_feature() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![0.0, if i < 10 { 1.0 } else { 3.0 }])
            .collect();
        let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
        let tree = fit_tree(&x, &y);
        let imp = tree.feature_importances();
        assert!(imp[1] > imp[0]);
    }
}
