//! # trailrec Model
//!
//! The difficulty classifier: CART trees, a bagged random forest over them,
//! the persisted [`ClassifierArtifact`] and the evaluation used by the model
//! job.
//!
//! ## Example
//!
//! ```rust
//! use trailrec_core::{FeatureVector, Vector};
//! use trailrec_model::{ForestParams, RandomForest};
//!
//! let rows = vec![
//!     Vector::from_slice(&[1.0, 40.0]),
//!     Vector::from_slice(&[14.0, 1800.0]),
//! ];
//! let labels = vec!["easy".to_string(), "hard".to_string()];
//! let params = ForestParams { bootstrap: false, ..ForestParams::default() };
//! let forest = RandomForest::fit(&rows, &labels, &params).unwrap();
//!
//! assert_eq!(forest.predict(&[13.0, 1700.0]).unwrap(), "hard");
//! ```

pub mod artifact;
pub mod classifier;
pub mod evaluate;
pub mod forest;
pub mod tree;

pub use artifact::{schema_fingerprint, ArtifactMetadata, ClassifierArtifact, ARTIFACT_VERSION};
pub use classifier::{predict_difficulty, DifficultyClassifier};
pub use evaluate::{
    accuracy, confusion_matrix, cross_val_score, stratified_folds, train_test_split, EvaluationReport,
};
pub use forest::{ForestParams, RandomForest};
pub use tree::{DecisionTree, TreeNode, TreeParams};
