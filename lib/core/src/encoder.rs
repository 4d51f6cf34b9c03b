//! Tag and categorical encoders
//!
//! Both encoders are built once from catalog-derived state (a vocabulary, a
//! category list) and then encode any number of query values into named,
//! fixed-width columns. The same encoder instances build the catalog feature
//! table, so query and catalog columns agree by construction.

use crate::catalog::Catalog;
use crate::features::FeatureVector;
use crate::tags::normalize_tag;
use crate::{Error, Result};
use ahash::AHashMap;

/// Binary encoder for a variable-size set of tags over a fixed vocabulary
#[derive(Debug, Clone)]
pub struct TagEncoder {
    feature_name: String,
    vocabulary: Vec<String>,
    positions: AHashMap<String, usize>,
}

impl TagEncoder {
    /// Create an encoder for `feature_name` over `vocabulary`.
    ///
    /// Duplicate terms keep their first position. An empty vocabulary is a
    /// configuration error.
    pub fn new(feature_name: impl Into<String>, vocabulary: Vec<String>) -> Result<Self> {
        let feature_name = feature_name.into();
        let mut terms = Vec::with_capacity(vocabulary.len());
        let mut positions = AHashMap::with_capacity(vocabulary.len());

        for term in vocabulary {
            let term = term.trim().to_string();
            if term.is_empty() || positions.contains_key(&term) {
                continue;
            }
            positions.insert(term.clone(), terms.len());
            terms.push(term);
        }

        if terms.is_empty() {
            return Err(Error::Configuration(format!(
                "vocabulary for '{}' is empty",
                feature_name
            )));
        }

        Ok(Self {
            feature_name,
            vocabulary: terms,
            positions,
        })
    }

    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column names, `"{feature_name}_{tag}"` in vocabulary order
    pub fn column_names(&self) -> Vec<String> {
        self.vocabulary
            .iter()
            .map(|tag| format!("{}_{}", self.feature_name, tag))
            .collect()
    }

    /// Encode a tag set; tags outside the vocabulary are ignored
    pub fn encode<S: AsRef<str>>(&self, tags: &[S]) -> FeatureVector {
        let mut values = vec![0.0f32; self.vocabulary.len()];
        for tag in tags {
            if let Some(&idx) = self.positions.get(&normalize_tag(tag.as_ref())) {
                values[idx] = 1.0;
            }
        }
        named(self.column_names(), values)
    }
}

/// One-hot encoder for a single categorical column with a dropped reference
/// category.
///
/// Categories are held in their canonical order; the first one is the
/// reference and has no column of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalEncoder {
    category_name: String,
    categories: Vec<String>,
}

impl CategoricalEncoder {
    /// Derive categories from a catalog column.
    ///
    /// Fails with [`Error::ColumnNotFound`] when the catalog has no such column.
    pub fn from_catalog(catalog: &Catalog, category_name: &str) -> Result<Self> {
        let values = catalog.column(category_name)?;
        Self::from_values(category_name, values)
    }

    /// Derive categories from observed values: normalized, sorted, distinct
    pub fn from_values<'a, I>(category_name: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut categories: Vec<String> = values.into_iter().map(normalize_category).collect();
        categories.sort();
        categories.dedup();
        Self::from_categories(category_name, categories)
    }

    /// Use an explicit, already-ordered category list (first = reference)
    pub fn from_categories(category_name: &str, categories: Vec<String>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Configuration(format!(
                "no categories observed for '{}'",
                category_name
            )));
        }
        Ok(Self {
            category_name: category_name.to_string(),
            categories,
        })
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The dropped reference category
    pub fn reference(&self) -> &str {
        &self.categories[0]
    }

    pub fn width(&self) -> usize {
        self.categories.len() - 1
    }

    pub fn column_names(&self) -> Vec<String> {
        self.categories[1..]
            .iter()
            .map(|c| format!("{}_{}", self.category_name, c))
            .collect()
    }

    /// One-hot encode a value.
    ///
    /// The reference category and unknown values both encode as all zeros.
    pub fn encode(&self, value: &str) -> FeatureVector {
        let mut values = vec![0.0f32; self.width()];
        let value = normalize_category(value);
        if let Some(pos) = self.categories.iter().position(|c| *c == value) {
            if pos > 0 {
                values[pos - 1] = 1.0;
            }
        }
        named(self.column_names(), values)
    }
}

/// Canonical category spelling used in column names
pub fn normalize_category(value: &str) -> String {
    value.trim().replace(' ', "_")
}

/// Encode a tag set against a vocabulary in one call
pub fn encode_tags<S: AsRef<str>>(
    feature_name: &str,
    vocabulary: &[String],
    tags: &[S],
) -> Result<FeatureVector> {
    Ok(TagEncoder::new(feature_name, vocabulary.to_vec())?.encode(tags))
}

/// One-hot encode a value against the categories observed in a catalog column
pub fn encode_category(catalog: &Catalog, category_name: &str, value: &str) -> Result<FeatureVector> {
    Ok(CategoricalEncoder::from_catalog(catalog, category_name)?.encode(value))
}

fn named(names: Vec<String>, values: Vec<f32>) -> FeatureVector {
    // Both come from the same width, so construction cannot fail
    FeatureVector::new(names, values).unwrap_or_else(|_| FeatureVector::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_encoding_matches_vocabulary_order() {
        let encoder = TagEncoder::new("features", vocab(&["forest", "lake", "views"])).unwrap();
        let encoded = encoder.encode(&["lake", "views"]);

        assert_eq!(
            encoded.names(),
            &["features_forest", "features_lake", "features_views"]
        );
        assert_eq!(encoded.get("features_forest"), Some(0.0));
        assert_eq!(encoded.get("features_lake"), Some(1.0));
        assert_eq!(encoded.get("features_views"), Some(1.0));
    }

    #[test]
    fn test_tag_subset_has_exact_ones() {
        let v = vocab(&["beach", "forest", "lake", "river", "views"]);
        let encoder = TagEncoder::new("features", v.clone()).unwrap();
        for size in 0..=v.len() {
            let subset = &v[..size];
            let encoded = encoder.encode(subset);
            assert_eq!(encoded.values().count_nonzero(), size);
            for (idx, value) in encoded.as_slice().iter().enumerate() {
                assert_eq!(*value, if idx < size { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_unknown_tags_ignored() {
        let encoder = TagEncoder::new("activities", vocab(&["birding", "hiking"])).unwrap();
        let with_unknown = encoder.encode(&["hiking", "surfing", "skydiving"]);
        let known_only = encoder.encode(&["hiking"]);
        assert_eq!(with_unknown, known_only);
    }

    #[test]
    fn test_empty_input_all_zero() {
        let encoder = TagEncoder::new("features", vocab(&["forest", "lake"])).unwrap();
        let empty: [&str; 0] = [];
        assert_eq!(encoder.encode(&empty).values().count_nonzero(), 0);
    }

    #[test]
    fn test_hyphenated_query_tag_matches_vocabulary() {
        let encoder = TagEncoder::new("features", vocab(&["dogs_no", "wild_flowers"])).unwrap();
        let encoded = encoder.encode(&["wild-flowers"]);
        assert_eq!(encoded.get("features_wild_flowers"), Some(1.0));
    }

    #[test]
    fn test_empty_vocabulary_is_configuration_error() {
        assert!(matches!(
            TagEncoder::new("features", Vec::new()),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            encode_tags("features", &[], &["lake"]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_categorical_drops_reference() {
        let encoder = CategoricalEncoder::from_values(
            "route_type",
            ["out and back", "loop", "point to point", "loop"],
        )
        .unwrap();

        assert_eq!(encoder.reference(), "loop");
        assert_eq!(encoder.width(), 2);
        assert_eq!(
            encoder.column_names(),
            vec!["route_type_out_and_back", "route_type_point_to_point"]
        );

        let encoded = encoder.encode("out and back");
        assert_eq!(encoded.as_slice(), &[1.0, 0.0]);
        assert_eq!(encoder.encode("point_to_point").as_slice(), &[0.0, 1.0]);
        assert_eq!(encoder.encode("loop").as_slice(), &[0.0, 0.0]);
        assert_eq!(encoder.encode("ferry").as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_categorical_independent_of_row_order() {
        let a = CategoricalEncoder::from_values("route_type", ["loop", "out and back"]).unwrap();
        let b = CategoricalEncoder::from_values("route_type", ["out and back", "loop"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_categorical_missing_column_is_lookup_error() {
        let catalog = Catalog::new(
            vec!["trail_id".into(), "route_type".into()],
            vec![vec!["1".into(), "loop".into()]],
        )
        .unwrap();
        assert!(matches!(
            encode_category(&catalog, "surface", "dirt"),
            Err(Error::ColumnNotFound(_))
        ));
        assert_eq!(encode_category(&catalog, "route_type", "loop").unwrap().len(), 0);
    }
}
