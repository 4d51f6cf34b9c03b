//! Standard scaling
//!
//! Centers every column to zero mean and scales it to unit population
//! variance. Columns with (near) zero variance are only centered, so constant
//! columns become all zeros instead of NaN.

use serde::{Deserialize, Serialize};
use trailrec_core::{Error, Result, Vector};

const MIN_STD: f64 = 1e-10;

/// Column-wise standard scaler fitted on a set of rows
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    /// Mean of each column (computed during fit)
    mean: Option<Vec<f32>>,
    /// Divisor of each column: the standard deviation, or 1.0 for constant columns
    scale: Option<Vec<f32>>,
}

impl StandardScaler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    pub fn mean(&self) -> Option<&[f32]> {
        self.mean.as_deref()
    }

    pub fn scale(&self) -> Option<&[f32]> {
        self.scale.as_deref()
    }

    /// Compute per-column mean and standard deviation
    pub fn fit(&mut self, rows: &[Vector]) -> Result<()> {
        let first = rows
            .first()
            .ok_or_else(|| Error::Configuration("cannot fit a scaler on zero rows".to_string()))?;
        let dim = first.dim();
        check_dims(rows, dim)?;

        let n = rows.len() as f64;
        let mut sums = vec![0.0f64; dim];
        for row in rows {
            for (sum, x) in sums.iter_mut().zip(row.as_slice()) {
                *sum += f64::from(*x);
            }
        }
        let means: Vec<f64> = sums.into_iter().map(|s| s / n).collect();

        let mut squares = vec![0.0f64; dim];
        for row in rows {
            for ((sq, x), mean) in squares.iter_mut().zip(row.as_slice()).zip(&means) {
                let d = f64::from(*x) - mean;
                *sq += d * d;
            }
        }

        let scale = squares
            .into_iter()
            .map(|sq| {
                let std = (sq / n).sqrt();
                if std > MIN_STD {
                    std as f32
                } else {
                    1.0
                }
            })
            .collect();

        self.mean = Some(means.into_iter().map(|m| m as f32).collect());
        self.scale = Some(scale);
        Ok(())
    }

    /// Scale rows with the fitted statistics
    pub fn transform(&self, rows: &[Vector]) -> Result<Vec<Vector>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => (mean, scale),
            _ => {
                return Err(Error::Configuration(
                    "scaler not fitted; call fit() first".to_string(),
                ))
            }
        };
        check_dims(rows, mean.len())?;

        Ok(rows
            .iter()
            .map(|row| {
                Vector::new(
                    row.as_slice()
                        .iter()
                        .zip(mean.iter().zip(scale.iter()))
                        .map(|(x, (m, s))| (x - m) / s)
                        .collect(),
                )
            })
            .collect())
    }

    pub fn fit_transform(&mut self, rows: &[Vector]) -> Result<Vec<Vector>> {
        self.fit(rows)?;
        self.transform(rows)
    }
}

fn check_dims(rows: &[Vector], dim: usize) -> Result<()> {
    match rows.iter().find(|r| r.dim() != dim) {
        Some(row) => Err(Error::DimensionMismatch {
            expected: dim,
            actual: row.dim(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vector> {
        vec![
            Vector::new(vec![1.0, 10.0, 5.0]),
            Vector::new(vec![2.0, 20.0, 5.0]),
            Vector::new(vec![3.0, 30.0, 5.0]),
        ]
    }

    #[test]
    fn test_zero_mean_unit_variance() {
        let scaled = StandardScaler::new().fit_transform(&rows()).unwrap();
        for col in 0..2 {
            let values: Vec<f32> = scaled.iter().map(|r| r.as_slice()[col]).collect();
            let mean = values.iter().sum::<f32>() / 3.0;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / 3.0;
            assert!(mean.abs() < 1e-5, "mean {}", mean);
            assert!((var - 1.0).abs() < 1e-4, "variance {}", var);
        }
    }

    #[test]
    fn test_constant_column_centered_only() {
        let scaled = StandardScaler::new().fit_transform(&rows()).unwrap();
        assert!(scaled.iter().all(|r| r.as_slice()[2] == 0.0));
    }

    #[test]
    fn test_population_std() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&rows()).unwrap();
        // std of [1, 2, 3] with ddof = 0
        assert!((scaler.scale().unwrap()[0] - (2.0f32 / 3.0).sqrt()).abs() < 1e-6);
        assert_eq!(scaler.mean().unwrap()[1], 20.0);
    }

    #[test]
    fn test_errors() {
        let mut scaler = StandardScaler::new();
        assert!(matches!(scaler.transform(&rows()), Err(Error::Configuration(_))));
        assert!(matches!(scaler.fit(&[]), Err(Error::Configuration(_))));

        let ragged = vec![Vector::new(vec![1.0]), Vector::new(vec![1.0, 2.0])];
        assert!(matches!(
            scaler.fit(&ragged),
            Err(Error::DimensionMismatch { expected: 1, actual: 2 })
        ));
    }
}
