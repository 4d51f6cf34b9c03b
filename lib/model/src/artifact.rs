//! The persisted classifier artifact
//!
//! Besides the fitted forest, the artifact records everything needed to check
//! that a query is encoded the way the training table was: the ordered
//! feature names, the route-type categories with their reference level, and a
//! SHA-256 fingerprint of the column schema.

use crate::classifier::DifficultyClassifier;
use crate::forest::{ForestParams, RandomForest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trailrec_core::{CategoricalEncoder, Error, FeatureTable, Result};

/// Bumped whenever the persisted layout changes
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub route_type_column: String,
    /// Sorted categories; the first one is the dropped reference level
    pub route_type_categories: Vec<String>,
    pub schema_fingerprint: String,
    pub params: ForestParams,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub metadata: ArtifactMetadata,
    pub model: RandomForest,
}

impl ClassifierArtifact {
    /// Train a forest on the whole table
    pub fn train(
        table: &FeatureTable,
        route_type: &CategoricalEncoder,
        params: &ForestParams,
    ) -> Result<Self> {
        let model = RandomForest::fit(table.rows(), table.labels(), params)?;
        Self::new(model, table.feature_names().to_vec(), route_type, params)
    }

    /// Wrap an already fitted forest.
    ///
    /// The route-type columns the forest was trained on must be exactly the
    /// ones `route_type` produces.
    pub fn new(
        model: RandomForest,
        feature_names: Vec<String>,
        route_type: &CategoricalEncoder,
        params: &ForestParams,
    ) -> Result<Self> {
        if model.n_features() != feature_names.len() {
            return Err(Error::DimensionMismatch {
                expected: model.n_features(),
                actual: feature_names.len(),
            });
        }
        check_route_type_columns(&feature_names, route_type)?;

        let metadata = ArtifactMetadata {
            version: ARTIFACT_VERSION,
            schema_fingerprint: schema_fingerprint(&feature_names),
            classes: model.classes().to_vec(),
            feature_names,
            route_type_column: route_type.category_name().to_string(),
            route_type_categories: route_type.categories().to_vec(),
            params: *params,
            trained_at: Utc::now(),
        };

        Ok(Self { metadata, model })
    }

    /// Check a loaded artifact for internal consistency
    pub fn verify(&self) -> Result<()> {
        let meta = &self.metadata;
        if meta.version != ARTIFACT_VERSION {
            return Err(Error::Persistence(format!(
                "unsupported artifact version {} (expected {})",
                meta.version, ARTIFACT_VERSION
            )));
        }
        if schema_fingerprint(&meta.feature_names) != meta.schema_fingerprint {
            return Err(Error::Persistence(
                "feature schema fingerprint does not match its column names".to_string(),
            ));
        }
        if self.model.n_features() != meta.feature_names.len() {
            return Err(Error::DimensionMismatch {
                expected: meta.feature_names.len(),
                actual: self.model.n_features(),
            });
        }
        Ok(())
    }

    /// Rebuild the route-type encoder used at training time
    pub fn route_type_encoder(&self) -> Result<CategoricalEncoder> {
        CategoricalEncoder::from_categories(
            &self.metadata.route_type_column,
            self.metadata.route_type_categories.clone(),
        )
    }

}

impl DifficultyClassifier for ClassifierArtifact {
    fn feature_names(&self) -> &[String] {
        &self.metadata.feature_names
    }

    fn classes(&self) -> &[String] {
        &self.metadata.classes
    }

    fn predict_values(&self, values: &[f32]) -> Result<String> {
        self.model.predict(values).map(str::to_string)
    }
}

fn check_route_type_columns(feature_names: &[String], route_type: &CategoricalEncoder) -> Result<()> {
    let prefix = format!("{}_", route_type.category_name());
    let trained: Vec<&String> = feature_names.iter().filter(|n| n.starts_with(&prefix)).collect();
    let expected = route_type.column_names();

    for (position, column) in expected.iter().enumerate() {
        if !trained.contains(&column) {
            return Err(Error::SchemaMismatch {
                position,
                expected: column.clone(),
                actual: trained.get(position).map(|c| c.to_string()).unwrap_or_default(),
            });
        }
    }
    if trained.len() != expected.len() {
        return Err(Error::DimensionMismatch {
            expected: expected.len(),
            actual: trained.len(),
        });
    }
    Ok(())
}

/// Hex SHA-256 over the ordered column names
pub fn schema_fingerprint(feature_names: &[String]) -> String {
    let mut hasher = Sha256::new();
    for name in feature_names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
