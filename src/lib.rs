//! # trailrec
//!
//! Hiking trail recommendation and difficulty prediction.
//!
//! Given a few trail preferences (length, elevation gain, route type, desired
//! features and activities), trailrec encodes them into the same column space
//! as a precomputed catalog feature table, then
//!
//! - ranks catalog trails by cosine similarity after joint standard scaling, and
//! - predicts a difficulty label with a random-forest classifier.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! trailrec --config config/project.toml clean
//! trailrec featurize
//! trailrec model
//! trailrec recommend --length 5 --elevation-gain 300 --route-type loop \
//!     --features "['lake', 'views']" --activities "['hiking']"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use trailrec::prelude::*;
//!
//! let config = ProjectConfig::load("config/project.toml").unwrap();
//! let engine = TrailEngine::load(&config).unwrap();
//!
//! let query = TrailQuery::new(5.0, 300.0, "loop", vec!["lake".into()], vec!["hiking".into()]);
//! let ids = engine.recommend(&query).unwrap();
//! let difficulty = engine.predict(&query).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `trailrec-core` - Catalog table, tag parsing, encoders, query vectorizer, clean/featurize
//! - `trailrec-similarity` - Standard scaler and similarity ranker
//! - `trailrec-model` - Decision trees, random forest, classifier artifact, evaluation
//! - `trailrec-storage` - CSV, vocabulary and artifact files
//! - `trailrec-pipeline` - Configuration, facade, engine cache and offline jobs

// Re-export core types
pub use trailrec_core::{
    collect_input, create_input_features, encode_category, encode_tags, parse_tag_list, Catalog,
    CategoricalEncoder, Error, FeatureTable, FeatureVector, QueryVector, QueryVectorizer, RawQuery,
    Result, TagEncoder, TrailId, TrailQuery, Vector,
};

// Re-export ranking and classification
pub use trailrec_model::{predict_difficulty, ClassifierArtifact, ForestParams, RandomForest};
pub use trailrec_similarity::{recommend_trails, SimilarityRanker, StandardScaler};

// Re-export the pipeline
pub use trailrec_pipeline::{predict, recommend, ProjectConfig, SharedEngine, TrailEngine};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        collect_input, predict, predict_difficulty, recommend, recommend_trails, Catalog,
        ClassifierArtifact, Error, FeatureTable, ProjectConfig, QueryVector, QueryVectorizer,
        RawQuery, Result, SharedEngine, TrailEngine, TrailId, TrailQuery,
    };
}
