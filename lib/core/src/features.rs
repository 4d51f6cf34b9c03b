use crate::{Error, Result, Vector};
use serde::{Deserialize, Serialize};

/// An ordered vector whose positions carry column names.
///
/// Query vectors, catalog rows and classifier inputs all share this shape so
/// that alignment between them is checked by name instead of assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vector,
}

/// A single user query encoded into the catalog's feature space
pub type QueryVector = FeatureVector;

impl FeatureVector {
    pub fn new(names: Vec<String>, values: Vec<f32>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::DimensionMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            names,
            values: Vector::new(values),
        })
    }

    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            values: Vector::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Vector {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        self.values.as_slice()
    }

    /// Value of a named column
    pub fn get(&self, name: &str) -> Option<f32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values.as_slice()[idx])
    }

    /// Append a single named value
    pub fn push(&mut self, name: impl Into<String>, value: f32) {
        self.names.push(name.into());
        let mut data = std::mem::take(&mut self.values).into_inner();
        data.push(value);
        self.values = Vector::new(data);
    }

    /// Append all columns of another vector, keeping order
    pub fn extend(&mut self, other: FeatureVector) {
        self.names.extend(other.names);
        let mut data = std::mem::take(&mut self.values).into_inner();
        data.extend(other.values.into_inner());
        self.values = Vector::new(data);
    }

    /// Fail unless this vector's columns are exactly `expected`, in order
    pub fn check_alignment(&self, expected: &[String]) -> Result<()> {
        check_columns(expected, &self.names)
    }
}

/// Compare two ordered column lists, reporting the first disagreement
pub fn check_columns(expected: &[String], actual: &[String]) -> Result<()> {
    if expected.len() != actual.len() {
        return Err(Error::DimensionMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    if let Some((position, (e, a))) = expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .find(|(_, (e, a))| e != a)
    {
        return Err(Error::SchemaMismatch {
            position,
            expected: e.clone(),
            actual: a.clone(),
        });
    }

    Ok(())
}
