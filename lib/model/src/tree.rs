//! CART decision tree for classification
//!
//! Splits minimize weighted Gini impurity. Candidate thresholds are midpoints
//! between consecutive distinct feature values. When `max_features` is set,
//! each split considers a random subset of the features, which is what the
//! random forest relies on for decorrelated trees.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use trailrec_core::Vector;

/// A node in a decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TreeNode {
    /// Internal node; samples with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf with the predicted class index
    Leaf { class: usize, samples: usize },
}

impl TreeNode {
    /// Leaves have depth 0
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// A fitted classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    root: TreeNode,
    n_features: usize,
}

impl DecisionTree {
    /// Grow a tree on the rows at `indices`.
    ///
    /// `labels` are class indices below `n_classes`; `indices` may repeat
    /// rows (bootstrap samples).
    pub fn fit(
        rows: &[Vector],
        labels: &[usize],
        n_classes: usize,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = rows.first().map(Vector::dim).unwrap_or(0);
        let builder = Builder {
            rows,
            labels,
            n_classes,
            n_features,
            params,
        };
        let root = builder.build(indices.to_vec(), 0, rng);
        Self { root, n_features }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Class index predicted for one sample
    pub fn predict_one(&self, x: &[f32]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { class, .. } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

struct Builder<'a> {
    rows: &'a [Vector],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
    params: &'a TreeParams,
}

struct Split {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

impl<'a> Builder<'a> {
    fn build(&self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let counts = self.class_counts(&indices);
        let leaf = TreeNode::Leaf {
            class: majority_class(&counts),
            samples: indices.len(),
        };

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || indices.len() < self.params.min_samples_split.max(2) {
            return leaf;
        }

        let parent_impurity = gini(&counts, indices.len());
        let Some(split) = self.best_split(&indices, rng) else {
            return leaf;
        };
        if split.impurity >= parent_impurity {
            return leaf;
        }

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.rows[i].as_slice()[split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return leaf;
        }

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                let mut picked = sample(rng, self.n_features, k.max(1)).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<Split> {
        let mut best: Option<Split> = None;
        for feature in self.candidate_features(rng) {
            if let Some(split) = self.best_split_for_feature(indices, feature) {
                if best.as_ref().map_or(true, |b| split.impurity < b.impurity) {
                    best = Some(split);
                }
            }
        }
        best
    }

    /// Sweep the sorted feature values, moving one sample at a time from the
    /// right partition to the left one
    fn best_split_for_feature(&self, indices: &[usize], feature: usize) -> Option<Split> {
        let mut values: Vec<(f32, usize)> = indices
            .iter()
            .map(|&i| (self.rows[i].as_slice()[feature], self.labels[i]))
            .collect();
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let n = values.len();
        let mut left = vec![0usize; self.n_classes];
        let mut right = vec![0usize; self.n_classes];
        for &(_, label) in &values {
            right[label] += 1;
        }

        let mut best: Option<Split> = None;
        for i in 0..n - 1 {
            let (value, label) = values[i];
            left[label] += 1;
            right[label] -= 1;

            let next = values[i + 1].0;
            if next <= value {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(Split {
                    feature,
                    threshold: value + (next - value) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

/// Gini impurity: 1 - Σ p_i²
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lowest class index
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rows(values: &[[f32; 2]]) -> Vec<Vector> {
        values.iter().map(|v| Vector::from_slice(v)).collect()
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_majority_ties_to_lowest() {
        assert_eq!(majority_class(&[2, 3, 3]), 1);
        assert_eq!(majority_class(&[0, 0]), 0);
    }

    #[test]
    fn test_separable_data_fits_exactly() {
        let x = rows(&[[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [8.0, 1.0], [9.0, 0.0], [10.0, 1.0]]);
        let y = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &indices, &TreeParams::default(), &mut rng);

        for (row, label) in x.iter().zip(&y) {
            assert_eq!(tree.predict_one(row.as_slice()), *label);
        }
        assert_eq!(tree.depth(), 1);
        match tree.root() {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 5.5).abs() < 1e-6);
            }
            TreeNode::Leaf { .. } => panic!("expected a split"),
        }
    }

    #[test]
    fn test_max_depth_zero_is_leaf() {
        let x = rows(&[[1.0, 0.0], [2.0, 1.0], [3.0, 1.0]]);
        let y = vec![0, 1, 1];
        let params = TreeParams {
            max_depth: Some(0),
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &[0, 1, 2], &params, &mut rng);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_one(&[1.0, 0.0]), 1);
    }

    #[test]
    fn test_constant_features_give_leaf() {
        let x = rows(&[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]);
        let y = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, 2, &[0, 1, 2], &TreeParams::default(), &mut rng);
        assert_eq!(tree.root(), &TreeNode::Leaf { class: 1, samples: 3 });
    }
}
