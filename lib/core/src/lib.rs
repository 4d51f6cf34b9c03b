//! # trailrec Core
//!
//! Core library for the trailrec trail recommender.
//!
//! This crate provides the data structures shared by every stage:
//!
//! - [`Catalog`] - The cleaned trail table with named columns
//! - [`TagEncoder`] / [`CategoricalEncoder`] - Fixed-width encoders for tag sets and categories
//! - [`QueryVectorizer`] - Encodes a user query into the feature table's column space
//! - [`FeatureTable`] - The encoded catalog with identifiers and response labels
//! - [`featurize`](featurize::featurize) and [`clean`](clean::clean) - The offline table builders
//!
//! ## Example
//!
//! ```rust
//! use trailrec_core::{CategoricalEncoder, QueryVectorizer, TagEncoder, TrailQuery};
//!
//! let route_type = CategoricalEncoder::from_values("route_type", ["loop", "out and back"]).unwrap();
//! let features = TagEncoder::new("features", vec!["forest".into(), "lake".into()]).unwrap();
//! let activities = TagEncoder::new("activities", vec!["hiking".into()]).unwrap();
//! let vectorizer = QueryVectorizer::new(route_type, features, activities);
//!
//! let query = TrailQuery::new(4.5, 900.0, "out and back", vec!["lake".into()], vec![]);
//! let vector = vectorizer.vectorize(&query);
//! assert_eq!(vector.get("features_lake"), Some(1.0));
//! ```

pub mod catalog;
pub mod clean;
pub mod encoder;
pub mod error;
pub mod features;
pub mod featurize;
pub mod query;
pub mod table;
pub mod tags;
pub mod vector;

pub use catalog::{Catalog, CatalogRow, TrailId};
pub use clean::CleanSpec;
pub use encoder::{encode_category, encode_tags, CategoricalEncoder, TagEncoder};
pub use error::{Error, Result};
pub use features::{check_columns, FeatureVector, QueryVector};
pub use featurize::{Featurized, FeaturizeSpec};
pub use query::{collect_input, create_input_features, QueryVectorizer, RawQuery, TrailQuery};
pub use table::FeatureTable;
pub use tags::parse_tag_list;
pub use vector::Vector;
