use crate::catalog::{parse_number, Catalog, TrailId};
use crate::features::FeatureVector;
use crate::{Error, Result, Vector};
use serde::{Deserialize, Serialize};

/// The fully encoded catalog: one feature row and one response label per
/// trail identifier.
///
/// The identifier and response columns are kept apart from the feature
/// columns, so `feature_names().len() == column_count() - 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    id_column: String,
    response_column: String,
    feature_names: Vec<String>,
    trail_ids: Vec<TrailId>,
    rows: Vec<Vector>,
    labels: Vec<String>,
}

impl FeatureTable {
    pub fn new(
        id_column: impl Into<String>,
        response_column: impl Into<String>,
        feature_names: Vec<String>,
        trail_ids: Vec<TrailId>,
        rows: Vec<Vector>,
        labels: Vec<String>,
    ) -> Result<Self> {
        if trail_ids.len() != rows.len() || labels.len() != rows.len() {
            return Err(Error::Configuration(format!(
                "feature table has {} ids, {} rows and {} labels",
                trail_ids.len(),
                rows.len(),
                labels.len()
            )));
        }

        if let Some(row) = rows.iter().find(|r| r.dim() != feature_names.len()) {
            return Err(Error::DimensionMismatch {
                expected: feature_names.len(),
                actual: row.dim(),
            });
        }

        Ok(Self {
            id_column: id_column.into(),
            response_column: response_column.into(),
            feature_names,
            trail_ids,
            rows,
            labels,
        })
    }

    /// Interpret a generic table as a feature table.
    ///
    /// Every column other than the identifier and response columns is a
    /// numeric feature, kept in header order.
    pub fn from_catalog(catalog: &Catalog, id_column: &str, response_column: &str) -> Result<Self> {
        let id_idx = catalog.column_index(id_column)?;
        let response_idx = catalog.column_index(response_column)?;

        let feature_columns: Vec<(usize, &String)> = catalog
            .headers()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != id_idx && *idx != response_idx)
            .collect();

        let trail_ids = catalog.trail_ids(id_column)?;
        let labels = catalog
            .column(response_column)?
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = catalog
            .rows()
            .iter()
            .map(|cells| {
                feature_columns
                    .iter()
                    .map(|(idx, name)| parse_number(name, &cells[*idx]))
                    .collect::<Result<Vec<f32>>>()
                    .map(Vector::new)
            })
            .collect::<Result<Vec<_>>>()?;

        let feature_names = feature_columns.into_iter().map(|(_, name)| name.clone()).collect();

        Self::new(id_column, response_column, feature_names, trail_ids, rows, labels)
    }

    /// Render back into a generic table: id, features, response
    pub fn to_catalog(&self) -> Result<Catalog> {
        let mut headers = Vec::with_capacity(self.column_count());
        headers.push(self.id_column.clone());
        headers.extend(self.feature_names.iter().cloned());
        headers.push(self.response_column.clone());

        let rows = self
            .trail_ids
            .iter()
            .zip(self.rows.iter())
            .zip(self.labels.iter())
            .map(|((id, row), label)| {
                let mut cells = Vec::with_capacity(headers.len());
                cells.push(id.to_string());
                cells.extend(row.as_slice().iter().map(|v| v.to_string()));
                cells.push(label.clone());
                cells
            })
            .collect();

        Catalog::new(headers, rows)
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn response_column(&self) -> &str {
        &self.response_column
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trail_ids(&self) -> &[TrailId] {
        &self.trail_ids
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of columns including identifier and response
    pub fn column_count(&self) -> usize {
        self.feature_names.len() + 2
    }

    /// Named feature row at `index`
    pub fn feature_row(&self, index: usize) -> Option<FeatureVector> {
        self.rows
            .get(index)
            .and_then(|row| FeatureVector::new(self.feature_names.clone(), row.as_slice().to_vec()).ok())
    }

    /// Distinct response labels, sorted
    pub fn classes(&self) -> Vec<String> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// A new table holding the rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            id_column: self.id_column.clone(),
            response_column: self.response_column.clone(),
            feature_names: self.feature_names.clone(),
            trail_ids: indices.iter().map(|&i| self.trail_ids[i]).collect(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}
