//! # trailrec Pipeline
//!
//! Wires the other crates together:
//!
//! - [`config`] - the TOML project file
//! - [`facade`] - one-shot `predict` / `recommend` that load from disk per call
//! - [`engine`] - [`TrailEngine`] and its hot-swappable [`SharedEngine`]
//! - [`jobs`] - the clean, featurize and model jobs

pub mod config;
pub mod engine;
pub mod facade;
pub mod jobs;

pub use config::{
    CleanConfig, FeaturizeConfig, ModelConfig, PredictConfig, ProjectConfig, RecommendConfig,
    ServingConfig,
};
pub use engine::{SharedEngine, TrailEngine, TrailSummary};
pub use facade::{predict, recommend};
pub use jobs::{run_clean, run_featurize, run_model, ModelOutcome};
