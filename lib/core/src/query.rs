//! User queries and the query vectorizer

use crate::catalog::{parse_number, Catalog};
use crate::encoder::{CategoricalEncoder, TagEncoder};
use crate::features::{FeatureVector, QueryVector};
use crate::tags::parse_tag_list;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Name of the trail length column
pub const LENGTH_FIELD: &str = "length";

/// Name of the elevation gain column
pub const ELEVATION_GAIN_FIELD: &str = "elevation_gain";

/// The five raw strings submitted by the web layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuery {
    pub length: String,
    pub elevation_gain: String,
    pub route_type: String,
    /// Bracketed, single-quoted list literal, e.g. `"['lake', 'views']"`
    pub features: String,
    /// Same shape as `features`
    pub activities: String,
}

/// A parsed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailQuery {
    pub length: f32,
    pub elevation_gain: f32,
    pub route_type: String,
    pub features: Vec<String>,
    pub activities: Vec<String>,
}

impl TrailQuery {
    pub fn new(
        length: f32,
        elevation_gain: f32,
        route_type: impl Into<String>,
        features: Vec<String>,
        activities: Vec<String>,
    ) -> Self {
        Self {
            length,
            elevation_gain,
            route_type: route_type.into(),
            features,
            activities,
        }
    }

    /// Parse the raw web form strings
    pub fn from_raw(raw: &RawQuery) -> Result<Self> {
        collect_input(
            &raw.length,
            &raw.elevation_gain,
            &raw.route_type,
            &raw.features,
            &raw.activities,
        )
    }
}

/// Build a query from the five raw strings.
///
/// Tag lists that contain no quoted substrings parse as empty lists; only a
/// non-numeric length or elevation gain is an error.
pub fn collect_input(
    length: &str,
    elevation_gain: &str,
    route_type: &str,
    features: &str,
    activities: &str,
) -> Result<TrailQuery> {
    Ok(TrailQuery {
        length: parse_number(LENGTH_FIELD, length)?,
        elevation_gain: parse_number(ELEVATION_GAIN_FIELD, elevation_gain)?,
        route_type: route_type.to_string(),
        features: parse_tag_list(features),
        activities: parse_tag_list(activities),
    })
}

/// Encodes queries (and catalog rows) into the feature table's column space:
/// `[length, elevation_gain] ++ route_type ++ features ++ activities`
#[derive(Debug, Clone)]
pub struct QueryVectorizer {
    route_type: CategoricalEncoder,
    features: TagEncoder,
    activities: TagEncoder,
}

impl QueryVectorizer {
    pub fn new(route_type: CategoricalEncoder, features: TagEncoder, activities: TagEncoder) -> Self {
        Self {
            route_type,
            features,
            activities,
        }
    }

    /// Build a vectorizer whose route-type categories come from the catalog
    pub fn from_catalog(
        catalog: &Catalog,
        route_type_column: &str,
        features: TagEncoder,
        activities: TagEncoder,
    ) -> Result<Self> {
        let route_type = CategoricalEncoder::from_catalog(catalog, route_type_column)?;
        Ok(Self::new(route_type, features, activities))
    }

    pub fn route_type(&self) -> &CategoricalEncoder {
        &self.route_type
    }

    pub fn features(&self) -> &TagEncoder {
        &self.features
    }

    pub fn activities(&self) -> &TagEncoder {
        &self.activities
    }

    /// Ordered output column names
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![LENGTH_FIELD.to_string(), ELEVATION_GAIN_FIELD.to_string()];
        names.extend(self.route_type.column_names());
        names.extend(self.features.column_names());
        names.extend(self.activities.column_names());
        names
    }

    pub fn width(&self) -> usize {
        2 + self.route_type.width() + self.features.width() + self.activities.width()
    }

    pub fn vectorize(&self, query: &TrailQuery) -> QueryVector {
        self.encode_parts(
            query.length,
            query.elevation_gain,
            &query.route_type,
            query.features.as_slice(),
            query.activities.as_slice(),
        )
    }

    /// Encode the individual fields of a query or catalog row
    pub fn encode_parts<S: AsRef<str>>(
        &self,
        length: f32,
        elevation_gain: f32,
        route_type: &str,
        features: &[S],
        activities: &[S],
    ) -> FeatureVector {
        let mut vector = FeatureVector::empty();
        vector.push(LENGTH_FIELD, length);
        vector.push(ELEVATION_GAIN_FIELD, elevation_gain);
        vector.extend(self.route_type.encode(route_type));
        vector.extend(self.features.encode(features));
        vector.extend(self.activities.encode(activities));
        vector
    }
}

/// Vectorize a query directly from vocabularies and the catalog
pub fn create_input_features(
    features_name: &str,
    full_features: &[String],
    activities_name: &str,
    full_activities: &[String],
    catalog: &Catalog,
    route_type_column: &str,
    query: &TrailQuery,
) -> Result<QueryVector> {
    let vectorizer = QueryVectorizer::from_catalog(
        catalog,
        route_type_column,
        TagEncoder::new(features_name, full_features.to_vec())?,
        TagEncoder::new(activities_name, full_activities.to_vec())?,
    )?;
    Ok(vectorizer.vectorize(query))
}
