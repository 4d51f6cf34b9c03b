//! Project configuration
//!
//! One TOML file with a section per job and two sections for the serving
//! entry points:
//!
//! ```toml
//! [clean]
//! [featurize]
//! [model]
//! [recommend.predict]
//! [recommend.recommend]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use trailrec_core::{CleanSpec, Error, FeaturizeSpec, Result};
use trailrec_model::ForestParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub clean: CleanConfig,
    pub featurize: FeaturizeConfig,
    pub model: ModelConfig,
    pub recommend: ServingConfig,
}

impl ProjectConfig {
    /// Read and validate a TOML project file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ArtifactNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Configuration file loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid project file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.recommend.recommend.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanConfig {
    pub raw_data_path: PathBuf,
    pub clean_data_path: PathBuf,
    #[serde(default = "default_length_column")]
    pub length_column: String,
    #[serde(default = "default_digits")]
    pub digits: u32,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    pub drop_str: String,
}

impl CleanConfig {
    pub fn spec(&self) -> CleanSpec {
        CleanSpec {
            length_column: self.length_column.clone(),
            digits: self.digits,
            name_column: self.name_column.clone(),
            drop_str: self.drop_str.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturizeConfig {
    pub clean_data_path: PathBuf,
    pub featurize_path: PathBuf,
    pub full_features_ls_path: PathBuf,
    pub full_activities_ls_path: PathBuf,
    pub trail_id: String,
    pub route_type: String,
    pub features_name: String,
    pub activities_name: String,
    #[serde(default = "default_rating_column")]
    pub rating_column: String,
    pub response: String,
    pub cut_bins: Vec<f32>,
    pub cut_labels: Vec<String>,
}

impl FeaturizeConfig {
    pub fn spec(&self) -> FeaturizeSpec {
        FeaturizeSpec {
            trail_id: self.trail_id.clone(),
            route_type: self.route_type.clone(),
            features_name: self.features_name.clone(),
            activities_name: self.activities_name.clone(),
            rating_column: self.rating_column.clone(),
            response: self.response.clone(),
            cut_bins: self.cut_bins.clone(),
            cut_labels: self.cut_labels.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub featurize_path: PathBuf,
    /// Cleaned catalog, read for the route-type categories stored in the artifact
    pub clean_data_path: PathBuf,
    pub route_type: String,
    pub trail_id: String,
    pub response: String,
    pub test_size: f32,
    pub random_state_split: u64,
    pub random_state_model: u64,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default)]
    pub max_depth: Option<usize>,
    pub cv: usize,
    /// Confusion matrix row/column order; empty uses the model's classes
    #[serde(default)]
    pub cm_labels: Vec<String>,
    pub model_path: PathBuf,
    pub output_path: PathBuf,
    /// Where to write the held-out rows, if anywhere
    #[serde(default)]
    pub test_data_path: Option<PathBuf>,
}

impl ModelConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            random_state: self.random_state_model,
            ..ForestParams::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::Configuration(format!(
                "model.test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv < 2 {
            return Err(Error::Configuration(format!(
                "model.cv must be at least 2, got {}",
                self.cv
            )));
        }
        if self.n_estimators == 0 {
            return Err(Error::Configuration(
                "model.n_estimators must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingConfig {
    pub predict: PredictConfig,
    pub recommend: RecommendConfig,
}

/// Inputs of the `predict` entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictConfig {
    pub features_name: String,
    pub full_features_ls_path: PathBuf,
    pub activities_name: String,
    pub full_activities_ls_path: PathBuf,
    /// Must name the route-type column the classifier was trained on
    pub route_type: String,
    pub model_path: PathBuf,
}

/// Inputs of the `recommend` entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    pub features_name: String,
    pub full_features_ls_path: PathBuf,
    pub activities_name: String,
    pub full_activities_ls_path: PathBuf,
    pub clean_data_path: PathBuf,
    pub route_type: String,
    pub n: usize,
    pub featurize_path: PathBuf,
    pub trail_id: String,
    pub response: String,
    /// Catalog columns shown alongside each recommendation
    #[serde(default)]
    pub display_feature_list: Vec<String>,
}

impl RecommendConfig {
    fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::Configuration(
                "recommend.recommend.n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_length_column() -> String {
    "length".to_string()
}

fn default_digits() -> u32 {
    2
}

fn default_name_column() -> String {
    "name".to_string()
}

fn default_rating_column() -> String {
    "difficulty_rating".to_string()
}

fn default_n_estimators() -> usize {
    10
}
