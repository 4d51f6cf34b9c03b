//! Offline jobs: clean, featurize, model
//!
//! Each job reads its inputs from the paths in its config section and writes
//! its outputs for the next one.

use crate::config::{CleanConfig, FeaturizeConfig, ModelConfig};
use tracing::info;
use trailrec_core::clean::clean;
use trailrec_core::featurize::featurize;
use trailrec_core::{Catalog, CategoricalEncoder, Featurized, Result};
use trailrec_model::{train_test_split, ClassifierArtifact, EvaluationReport};
use trailrec_storage::{
    read_catalog, read_feature_table, save_artifact, save_report, write_catalog,
    write_feature_table, write_vocabulary,
};

/// Convert lengths to miles, filter out closed trails, save the cleaned catalog
pub fn run_clean(config: &CleanConfig) -> Result<Catalog> {
    let raw = read_catalog(&config.raw_data_path)?;
    let cleaned = clean(raw, &config.spec())?;
    write_catalog(&cleaned, &config.clean_data_path)?;
    info!("Cleaned data saved to {}", config.clean_data_path.display());
    Ok(cleaned)
}

/// Build and save the feature table and both vocabularies
pub fn run_featurize(config: &FeaturizeConfig) -> Result<Featurized> {
    let catalog = read_catalog(&config.clean_data_path)?;
    let featurized = featurize(&catalog, &config.spec())?;

    write_feature_table(&featurized.table, &config.featurize_path)?;
    write_vocabulary(featurized.features_vocabulary(), &config.full_features_ls_path)?;
    write_vocabulary(featurized.activities_vocabulary(), &config.full_activities_ls_path)?;

    info!("Features saved to {}", config.featurize_path.display());
    Ok(featurized)
}

/// What the model job produced
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub artifact: ClassifierArtifact,
    pub report: EvaluationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Split, train, persist and evaluate the difficulty classifier
pub fn run_model(config: &ModelConfig) -> Result<ModelOutcome> {
    let table = read_feature_table(&config.featurize_path, &config.trail_id, &config.response)?;
    let catalog = read_catalog(&config.clean_data_path)?;
    let route_type = CategoricalEncoder::from_catalog(&catalog, &config.route_type)?;

    let (train_idx, test_idx) =
        train_test_split(table.len(), config.test_size, config.random_state_split)?;
    let train = table.select(&train_idx);
    let test = table.select(&test_idx);

    let params = config.forest_params();
    let artifact = ClassifierArtifact::train(&train, &route_type, &params)?;
    save_artifact(&artifact, &config.model_path)?;
    info!("Model training finished.");

    if let Some(path) = &config.test_data_path {
        write_feature_table(&test, path)?;
    }

    let labels = if config.cm_labels.is_empty() {
        artifact.metadata.classes.clone()
    } else {
        config.cm_labels.clone()
    };
    let report = EvaluationReport::evaluate(&artifact.model, &test, config.cv, &params, &labels)?;
    save_report(&report, &config.output_path)?;
    info!("Model evaluation results saved.");

    Ok(ModelOutcome {
        artifact,
        report,
        train_rows: train.len(),
        test_rows: test.len(),
    })
}
