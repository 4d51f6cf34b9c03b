//! Random forest classifier
//!
//! Bagged CART trees with per-split feature subsampling. Every tree gets its
//! own seed derived from `random_state`, so training is reproducible even
//! though trees are grown in parallel.

use crate::tree::{majority_class, DecisionTree, TreeParams};
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trailrec_core::{Error, Result, Vector};

/// Hyperparameters for [`RandomForest::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` uses `floor(sqrt(n_features))`
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            bootstrap: true,
            random_state: 0,
        }
    }
}

impl ForestParams {
    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::Configuration(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(Error::Configuration(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        let default_features = ((n_features as f64).sqrt().floor() as usize).max(1);
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: Some(self.max_features.unwrap_or(default_features)),
        }
    }
}

/// A fitted random forest over string class labels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    classes: Vec<String>,
    n_features: usize,
}

impl RandomForest {
    /// Train on feature rows and their labels.
    ///
    /// Classes are the sorted distinct labels; votes are tallied by class
    /// index so ties resolve to the lexicographically smallest label.
    pub fn fit(rows: &[Vector], labels: &[String], params: &ForestParams) -> Result<Self> {
        params.validate()?;

        if rows.is_empty() {
            return Err(Error::Configuration(
                "cannot train on an empty feature table".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(Error::Configuration(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let n_features = rows[0].dim();
        if let Some(row) = rows.iter().find(|r| r.dim() != n_features) {
            return Err(Error::DimensionMismatch {
                expected: n_features,
                actual: row.dim(),
            });
        }

        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        let class_index: AHashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let y: Vec<usize> = labels.iter().map(|l| class_index[l.as_str()]).collect();

        let tree_params = params.tree_params(n_features);
        let n_samples = rows.len();

        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.random_state.wrapping_add(t as u64));
                let indices: Vec<usize> = if params.bootstrap {
                    (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let tree = DecisionTree::fit(rows, &y, classes.len(), &indices, &tree_params, &mut rng);
                debug!(tree = t, depth = tree.depth(), "Tree grown");
                tree
            })
            .collect();

        info!(
            trees = trees.len(),
            samples = n_samples,
            features = n_features,
            classes = classes.len(),
            "Random forest trained"
        );

        Ok(Self {
            trees,
            classes,
            n_features,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Votes per class, in [`classes`](Self::classes) order
    pub fn votes(&self, x: &[f32]) -> Result<Vec<usize>> {
        if x.len() != self.n_features {
            return Err(Error::DimensionMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }
        let mut counts = vec![0usize; self.classes.len()];
        for tree in &self.trees {
            counts[tree.predict_one(x)] += 1;
        }
        Ok(counts)
    }

    /// Majority-vote label for one sample
    pub fn predict(&self, x: &[f32]) -> Result<&str> {
        let votes = self.votes(x)?;
        Ok(&self.classes[majority_class(&votes)])
    }

    /// Labels for many samples
    pub fn predict_batch(&self, rows: &[Vector]) -> Result<Vec<String>> {
        rows.par_iter()
            .map(|row| self.predict(row.as_slice()).map(str::to_string))
            .collect()
    }
}
