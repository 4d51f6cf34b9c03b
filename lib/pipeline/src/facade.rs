//! Single-query entry points.
//!
//! Each call loads everything it needs from disk, so these suit one-off CLI
//! use. Long-running callers should hold a [`TrailEngine`](crate::TrailEngine)
//! instead.

use crate::config::{PredictConfig, RecommendConfig};
use crate::engine::check_route_type_column;
use tracing::debug;
use trailrec_core::{
    create_input_features, QueryVectorizer, RawQuery, Result, TagEncoder, TrailId, TrailQuery,
};
use trailrec_model::predict_difficulty;
use trailrec_similarity::recommend_trails;
use trailrec_storage::{load_artifact, read_catalog, read_feature_table, read_vocabulary};

/// Predict the difficulty label for a raw query.
///
/// The route-type encoding is rebuilt from the categories stored in the
/// classifier artifact, not from the catalog.
pub fn predict(raw: &RawQuery, config: &PredictConfig) -> Result<String> {
    let artifact = load_artifact(&config.model_path)?;
    check_route_type_column(&artifact, &config.route_type)?;
    let vectorizer = QueryVectorizer::new(
        artifact.route_type_encoder()?,
        TagEncoder::new(&config.features_name, read_vocabulary(&config.full_features_ls_path)?)?,
        TagEncoder::new(
            &config.activities_name,
            read_vocabulary(&config.full_activities_ls_path)?,
        )?,
    );

    let query = TrailQuery::from_raw(raw)?;
    let label = predict_difficulty(&vectorizer.vectorize(&query), &artifact)?;
    debug!(label = %label, "Difficulty predicted");
    Ok(label)
}

/// Identifiers of the `config.n` catalog trails most similar to a raw query
pub fn recommend(raw: &RawQuery, config: &RecommendConfig) -> Result<Vec<TrailId>> {
    let catalog = read_catalog(&config.clean_data_path)?;
    let table = read_feature_table(&config.featurize_path, &config.trail_id, &config.response)?;
    let full_features = read_vocabulary(&config.full_features_ls_path)?;
    let full_activities = read_vocabulary(&config.full_activities_ls_path)?;

    let query = TrailQuery::from_raw(raw)?;
    let vector = create_input_features(
        &config.features_name,
        &full_features,
        &config.activities_name,
        &full_activities,
        &catalog,
        &config.route_type,
        &query,
    )?;

    recommend_trails(config.n, &table, &config.trail_id, &config.response, &vector)
}
