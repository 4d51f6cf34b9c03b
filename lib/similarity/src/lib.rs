//! # trailrec Similarity
//!
//! Ranks catalog trails by similarity to a user query.
//!
//! ## Features
//!
//! - **Joint scaling**: The query and the catalog are standard-scaled together
//! - **Cosine ranking**: Trails are ordered by cosine similarity to the query row
//! - **Schema checks**: A query whose columns differ from the table's is rejected
//!
//! ## Example
//!
//! ```rust
//! use trailrec_core::{FeatureTable, FeatureVector, Vector};
//! use trailrec_similarity::SimilarityRanker;
//!
//! let names = vec!["length".to_string(), "elevation_gain".to_string()];
//! let table = FeatureTable::new(
//!     "trail_id",
//!     "difficulty_class",
//!     names.clone(),
//!     vec![1, 2, 3],
//!     vec![
//!         Vector::new(vec![2.0, 150.0]),
//!         Vector::new(vec![14.0, 1500.0]),
//!         Vector::new(vec![3.0, 200.0]),
//!     ],
//!     vec!["easy".into(), "hard".into(), "easy".into()],
//! )
//! .unwrap();
//!
//! let query = FeatureVector::new(names, vec![2.5, 180.0]).unwrap();
//! let ranked = SimilarityRanker::new(2).unwrap().rank(&table, &query).unwrap();
//! assert_eq!(ranked.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│  Combined   │────>│   Scaler    │
//! │  (row 0)    │     │   matrix    │     │ (joint fit) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            ^                   │
//! ┌─────────────┐            │            ┌─────────────┐
//! │  Feature    │────────────┘            │   Cosine    │
//! │   table     │                         │  (row 0)    │
//! └─────────────┘                         └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │   Top-N     │
//!                                         └─────────────┘
//! ```

pub mod rank;
pub mod scaler;

pub use rank::{query_similarities, recommend_trails, RankedTrail, SimilarityRanker};
pub use scaler::StandardScaler;
