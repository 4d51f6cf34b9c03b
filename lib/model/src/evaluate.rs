//! Train/test splitting and evaluation metrics

use crate::forest::{ForestParams, RandomForest};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, info};
use trailrec_core::{Error, FeatureTable, Result};

/// Shuffle `0..n` with `seed` and cut it into train and test indices.
///
/// The test part holds `ceil(n * test_size)` indices; both parts are
/// non-empty.
pub fn train_test_split(n: usize, test_size: f32, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::Configuration(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let n_test = (n as f64 * f64::from(test_size)).ceil() as usize;
    if n < 2 || n_test == 0 || n_test >= n {
        return Err(Error::Configuration(format!(
            "cannot split {} rows with test_size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices.split_off(n - n_test);
    Ok((indices, test))
}

/// Fraction of positions where the labels agree
pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f32 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f32 / y_true.len() as f32
}

/// Rows are true labels, columns predicted labels, both in `labels` order.
/// Pairs involving a label outside `labels` are not counted.
pub fn confusion_matrix(y_true: &[String], y_pred: &[String], labels: &[String]) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; labels.len()]; labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        let ti = labels.iter().position(|l| l == t);
        let pi = labels.iter().position(|l| l == p);
        if let (Some(ti), Some(pi)) = (ti, pi) {
            matrix[ti][pi] += 1;
        }
    }
    matrix
}

/// Assign each row to one of `k` folds, stratified by label.
///
/// Classes are numbered by first appearance. Rows of each class keep their
/// order and fill folds front to back, with per-fold class counts dealt
/// round-robin over the label-sorted rows, so every fold gets a near-equal
/// share of each class.
pub fn stratified_folds(labels: &[String], k: usize) -> Vec<usize> {
    let mut classes: Vec<&String> = Vec::new();
    let encoded: Vec<usize> = labels
        .iter()
        .map(|label| match classes.iter().position(|c| *c == label) {
            Some(i) => i,
            None => {
                classes.push(label);
                classes.len() - 1
            }
        })
        .collect();

    let mut sorted = encoded.clone();
    sorted.sort_unstable();
    let mut allocation = vec![vec![0usize; classes.len()]; k];
    for (i, class) in sorted.iter().enumerate() {
        allocation[i % k][*class] += 1;
    }

    let mut folds = vec![0usize; labels.len()];
    for class in 0..classes.len() {
        let assignment = (0..k).flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][class]));
        let rows = encoded.iter().enumerate().filter(|(_, c)| **c == class).map(|(row, _)| row);
        for (row, fold) in rows.zip(assignment) {
            folds[row] = fold;
        }
    }
    folds
}

/// Accuracy of a fresh forest on each of `k` label-stratified folds
pub fn cross_val_score(table: &FeatureTable, k: usize, params: &ForestParams) -> Result<Vec<f32>> {
    let n = table.len();
    if k < 2 || k > n {
        return Err(Error::Configuration(format!(
            "cannot run {}-fold cross validation on {} rows",
            k, n
        )));
    }
    let largest_class = table
        .labels()
        .iter()
        .map(|label| table.labels().iter().filter(|l| *l == label).count())
        .max()
        .unwrap_or(0);
    if k > largest_class {
        return Err(Error::Configuration(format!(
            "{} folds exceed the size of every class (largest has {} rows)",
            k, largest_class
        )));
    }

    let folds = stratified_folds(table.labels(), k);
    let mut scores = Vec::with_capacity(k);
    for fold in 0..k {
        let (held_out, kept): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| folds[i] == fold);

        let train = table.select(&kept);
        let test = table.select(&held_out);
        let forest = RandomForest::fit(train.rows(), train.labels(), params)?;
        let predicted = forest.predict_batch(test.rows())?;
        let score = accuracy(test.labels(), &predicted);
        debug!(fold, score, "Cross-validation fold scored");
        scores.push(score);
    }
    Ok(scores)
}

/// Hold-out metrics written by the model job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub test_accuracy: f32,
    pub cv_scores: Vec<f32>,
    pub labels: Vec<String>,
    pub confusion: Vec<Vec<usize>>,
}

impl EvaluationReport {
    /// Score `forest` on `test`, with `cv`-fold cross validation on the same rows
    pub fn evaluate(
        forest: &RandomForest,
        test: &FeatureTable,
        cv: usize,
        params: &ForestParams,
        labels: &[String],
    ) -> Result<Self> {
        let predicted = forest.predict_batch(test.rows())?;
        let report = Self {
            test_accuracy: accuracy(test.labels(), &predicted),
            cv_scores: cross_val_score(test, cv, params)?,
            labels: labels.to_vec(),
            confusion: confusion_matrix(test.labels(), &predicted, labels),
        };
        info!(
            accuracy = report.test_accuracy,
            cv_mean = report.cv_mean(),
            cv_std = report.cv_std(),
            "Model evaluated"
        );
        Ok(report)
    }

    pub fn cv_mean(&self) -> f32 {
        if self.cv_scores.is_empty() {
            return 0.0;
        }
        self.cv_scores.iter().sum::<f32>() / self.cv_scores.len() as f32
    }

    /// Population standard deviation of the fold scores
    pub fn cv_std(&self) -> f32 {
        if self.cv_scores.is_empty() {
            return 0.0;
        }
        let mean = self.cv_mean();
        let var = self
            .cv_scores
            .iter()
            .map(|s| (s - mean) * (s - mean))
            .sum::<f32>()
            / self.cv_scores.len() as f32;
        var.sqrt()
    }

    /// Plain-text rendering with a labelled confusion matrix
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Test accuracy: {:.3}", self.test_accuracy);
        let _ = writeln!(out, "Mean CV score: {:.3}", self.cv_mean());
        let _ = writeln!(out, "Std CV score:  {:.3}", self.cv_std());
        out.push('\n');

        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(self.confusion.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1);

        let _ = write!(out, "{:width$}", "");
        for label in &self.labels {
            let _ = write!(out, "  {:>width$}", label);
        }
        out.push('\n');
        for (label, row) in self.labels.iter().zip(&self.confusion) {
            let _ = write!(out, "{:width$}", label);
            for count in row {
                let _ = write!(out, "  {:>width$}", count);
            }
            out.push('\n');
        }
        out
    }
}
