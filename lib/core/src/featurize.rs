//! Feature table construction
//!
//! Turns the cleaned catalog into the model-ready feature table. The
//! vectorizer built here is the one that later encodes queries, so catalog and
//! query columns line up exactly.

use crate::catalog::{parse_number, Catalog};
use crate::encoder::{CategoricalEncoder, TagEncoder};
use crate::query::{QueryVectorizer, ELEVATION_GAIN_FIELD, LENGTH_FIELD};
use crate::table::FeatureTable;
use crate::tags::{build_vocabulary, split_catalog_tags};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Column names and binning rules for [`featurize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturizeSpec {
    pub trail_id: String,
    pub route_type: String,
    pub features_name: String,
    pub activities_name: String,
    /// Numeric column binned into the response
    pub rating_column: String,
    /// Name of the binned response column
    pub response: String,
    /// Bin edges; bin `i` is `(cut_bins[i], cut_bins[i + 1]]`
    pub cut_bins: Vec<f32>,
    pub cut_labels: Vec<String>,
}

impl FeaturizeSpec {
    fn validate(&self) -> Result<()> {
        if self.cut_bins.len() != self.cut_labels.len() + 1 {
            return Err(Error::Configuration(format!(
                "{} bin edges cannot carry {} labels",
                self.cut_bins.len(),
                self.cut_labels.len()
            )));
        }
        if self.cut_bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Configuration(
                "bin edges must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output of [`featurize`]
#[derive(Debug, Clone)]
pub struct Featurized {
    pub table: FeatureTable,
    pub vectorizer: QueryVectorizer,
}

impl Featurized {
    pub fn features_vocabulary(&self) -> &[String] {
        self.vectorizer.features().vocabulary()
    }

    pub fn activities_vocabulary(&self) -> &[String] {
        self.vectorizer.activities().vocabulary()
    }
}

/// Build the feature table and the encoders behind it from a cleaned catalog
pub fn featurize(catalog: &Catalog, spec: &FeaturizeSpec) -> Result<Featurized> {
    spec.validate()?;

    let feature_cells = catalog.column(&spec.features_name)?;
    let activity_cells = catalog.column(&spec.activities_name)?;

    let vectorizer = QueryVectorizer::new(
        CategoricalEncoder::from_catalog(catalog, &spec.route_type)?,
        TagEncoder::new(&spec.features_name, build_vocabulary(feature_cells.iter().copied()))?,
        TagEncoder::new(&spec.activities_name, build_vocabulary(activity_cells.iter().copied()))?,
    );

    let trail_ids = catalog.trail_ids(&spec.trail_id)?;
    let lengths = catalog.numeric_column(LENGTH_FIELD)?;
    let gains = catalog.numeric_column(ELEVATION_GAIN_FIELD)?;
    let route_types = catalog.column(&spec.route_type)?;
    let ratings = catalog.column(&spec.rating_column)?;

    let mut rows = Vec::with_capacity(catalog.len());
    let mut labels = Vec::with_capacity(catalog.len());

    for i in 0..catalog.len() {
        let encoded = vectorizer.encode_parts(
            lengths[i],
            gains[i],
            route_types[i],
            split_catalog_tags(feature_cells[i]).as_slice(),
            split_catalog_tags(activity_cells[i]).as_slice(),
        );
        rows.push(encoded.values().clone());

        let rating = parse_number(&spec.rating_column, ratings[i])?;
        let label = bin_value(rating, &spec.cut_bins, &spec.cut_labels).ok_or_else(|| {
            Error::OutOfRange {
                trail_id: trail_ids[i].to_string(),
                value: rating,
            }
        })?;
        labels.push(label.to_string());
    }

    let table = FeatureTable::new(
        &spec.trail_id,
        &spec.response,
        vectorizer.column_names(),
        trail_ids,
        rows,
        labels,
    )?;

    info!(
        rows = table.len(),
        features = table.width(),
        reference = vectorizer.route_type().reference(),
        "Feature table built"
    );

    Ok(Featurized { table, vectorizer })
}

/// Label of the right-inclusive bin containing `value`
pub fn bin_value<'a>(value: f32, cut_bins: &[f32], cut_labels: &'a [String]) -> Option<&'a str> {
    cut_bins
        .windows(2)
        .zip(cut_labels.iter())
        .find(|(edges, _)| value > edges[0] && value <= edges[1])
        .map(|(_, label)| label.as_str())
}
