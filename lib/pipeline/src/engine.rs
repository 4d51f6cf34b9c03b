//! Pre-loaded serving state
//!
//! [`TrailEngine`] reads the catalog, vocabularies, feature table and
//! classifier once and answers any number of queries without touching disk.
//! It is immutable after construction. [`SharedEngine`] puts it behind a
//! read-write lock so a fresh engine can be swapped in while readers keep the
//! one they already hold.

use crate::config::ProjectConfig;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use trailrec_core::{
    check_columns, Catalog, Error, FeatureTable, QueryVector, QueryVectorizer, RawQuery, Result,
    TagEncoder, TrailId, TrailQuery,
};
use trailrec_model::{predict_difficulty, ClassifierArtifact};
use trailrec_similarity::SimilarityRanker;
use trailrec_storage::{load_artifact, read_catalog, read_feature_table, read_vocabulary};

/// A recommended trail with its display columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailSummary {
    pub trail_id: TrailId,
    pub score: f32,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct TrailEngine {
    catalog: Catalog,
    id_column: String,
    vectorizer: QueryVectorizer,
    table: FeatureTable,
    classifier: ClassifierArtifact,
    ranker: SimilarityRanker,
    display_columns: Vec<String>,
}

impl TrailEngine {
    /// Assemble an engine, checking that the vectorizer, the feature table
    /// and the classifier share one column layout
    pub fn new(
        catalog: Catalog,
        vectorizer: QueryVectorizer,
        table: FeatureTable,
        classifier: ClassifierArtifact,
        n: usize,
        display_columns: Vec<String>,
    ) -> Result<Self> {
        let columns = vectorizer.column_names();
        check_columns(table.feature_names(), &columns)?;
        check_columns(&classifier.metadata.feature_names, &columns)?;

        for column in &display_columns {
            catalog.column_index(column)?;
        }
        let id_column = table.id_column().to_string();
        catalog.column_index(&id_column)?;

        Ok(Self {
            catalog,
            id_column,
            vectorizer,
            table,
            classifier,
            ranker: SimilarityRanker::new(n)?,
            display_columns,
        })
    }

    /// Load every artifact named by the serving sections of the project file.
    ///
    /// Route-type categories come from the classifier artifact; the catalog
    /// is only used to look up display columns.
    pub fn load(config: &ProjectConfig) -> Result<Self> {
        let predict = &config.recommend.predict;
        let recommend = &config.recommend.recommend;

        let classifier = load_artifact(&predict.model_path)?;
        check_route_type_column(&classifier, &recommend.route_type)?;
        let catalog = read_catalog(&recommend.clean_data_path)?;
        let table = read_feature_table(&recommend.featurize_path, &recommend.trail_id, &recommend.response)?;
        let vectorizer = QueryVectorizer::new(
            classifier.route_type_encoder()?,
            TagEncoder::new(
                &recommend.features_name,
                read_vocabulary(&recommend.full_features_ls_path)?,
            )?,
            TagEncoder::new(
                &recommend.activities_name,
                read_vocabulary(&recommend.full_activities_ls_path)?,
            )?,
        );

        let engine = Self::new(
            catalog,
            vectorizer,
            table,
            classifier,
            recommend.n,
            recommend.display_feature_list.clone(),
        )?;
        info!(
            trails = engine.table.len(),
            features = engine.table.width(),
            "Trail engine loaded"
        );
        Ok(engine)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vectorizer(&self) -> &QueryVectorizer {
        &self.vectorizer
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn classifier(&self) -> &ClassifierArtifact {
        &self.classifier
    }

    pub fn vectorize(&self, query: &TrailQuery) -> QueryVector {
        self.vectorizer.vectorize(query)
    }

    pub fn predict(&self, query: &TrailQuery) -> Result<String> {
        predict_difficulty(&self.vectorize(query), &self.classifier)
    }

    pub fn predict_raw(&self, raw: &RawQuery) -> Result<String> {
        self.predict(&TrailQuery::from_raw(raw)?)
    }

    pub fn recommend(&self, query: &TrailQuery) -> Result<Vec<TrailId>> {
        Ok(self
            .ranker
            .rank(&self.table, &self.vectorize(query))?
            .into_iter()
            .map(|r| r.trail_id)
            .collect())
    }

    pub fn recommend_raw(&self, raw: &RawQuery) -> Result<Vec<TrailId>> {
        self.recommend(&TrailQuery::from_raw(raw)?)
    }

    /// Ranked trails with their configured display columns
    pub fn recommend_detailed(&self, query: &TrailQuery) -> Result<Vec<TrailSummary>> {
        self.ranker
            .rank(&self.table, &self.vectorize(query))?
            .into_iter()
            .map(|ranked| {
                let row = self
                    .catalog
                    .find(&self.id_column, ranked.trail_id)?
                    .ok_or_else(|| {
                        Error::ColumnNotFound(format!(
                            "{} = {}",
                            self.id_column, ranked.trail_id
                        ))
                    })?;
                let fields = self
                    .display_columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).unwrap_or_default().to_string()))
                    .collect();
                Ok(TrailSummary {
                    trail_id: ranked.trail_id,
                    score: ranked.score,
                    fields,
                })
            })
            .collect()
    }
}

/// The configured route-type column must be the one the classifier was trained on
pub(crate) fn check_route_type_column(classifier: &ClassifierArtifact, route_type: &str) -> Result<()> {
    let trained = &classifier.metadata.route_type_column;
    if trained != route_type {
        return Err(Error::Configuration(format!(
            "route_type '{}' differs from the classifier's '{}'",
            route_type, trained
        )));
    }
    Ok(())
}

/// A [`TrailEngine`] that can be replaced while in use
pub struct SharedEngine {
    current: RwLock<Arc<TrailEngine>>,
}

impl SharedEngine {
    pub fn new(engine: TrailEngine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    pub fn load(config: &ProjectConfig) -> Result<Self> {
        Ok(Self::new(TrailEngine::load(config)?))
    }

    /// The engine in service right now
    pub fn current(&self) -> Arc<TrailEngine> {
        Arc::clone(&self.current.read())
    }

    pub fn replace(&self, engine: TrailEngine) {
        *self.current.write() = Arc::new(engine);
    }

    /// Load a new engine and swap it in; on failure the old one stays
    pub fn reload(&self, config: &ProjectConfig) -> Result<()> {
        let engine = TrailEngine::load(config)?;
        self.replace(engine);
        info!("Trail engine reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailrec_core::featurize::featurize;
    use trailrec_core::FeaturizeSpec;
    use trailrec_model::ForestParams;

    fn catalog() -> Catalog {
        let headers = [
            "trail_id",
            "name",
            "length",
            "elevation_gain",
            "difficulty_rating",
            "route_type",
            "features",
            "activities",
        ];
        let rows = [
            ["1", "Lake Loop", "2.5", "90", "1", "loop", "['lake', 'views']", "['hiking']"],
            ["2", "Ridge Climb", "14.4", "1520", "5", "out and back", "['views']", "['backpacking']"],
            ["3", "Forest Walk", "3.1", "120", "1", "loop", "['forest']", "['hiking', 'birding']"],
            ["4", "Summit Push", "11.2", "1890", "7", "point to point", "['views', 'forest']", "['backpacking']"],
            ["5", "Meadow Path", "5.0", "400", "3", "out and back", "['wild-flowers']", "['hiking']"],
        ];
        Catalog::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn spec() -> FeaturizeSpec {
        FeaturizeSpec {
            trail_id: "trail_id".into(),
            route_type: "route_type".into(),
            features_name: "features".into(),
            activities_name: "activities".into(),
            rating_column: "difficulty_rating".into(),
            response: "difficulty_class".into(),
            cut_bins: vec![0.0, 2.0, 4.0, 7.0],
            cut_labels: vec!["easy".into(), "moderate".into(), "hard".into()],
        }
    }

    fn engine(n: usize) -> TrailEngine {
        let catalog = catalog();
        let featurized = featurize(&catalog, &spec()).unwrap();
        let classifier = ClassifierArtifact::train(
            &featurized.table,
            featurized.vectorizer.route_type(),
            &ForestParams::default(),
        )
        .unwrap();
        TrailEngine::new(
            catalog,
            featurized.vectorizer,
            featurized.table,
            classifier,
            n,
            vec!["name".into(), "length".into()],
        )
        .unwrap()
    }

    fn query() -> TrailQuery {
        TrailQuery::new(2.8, 100.0, "loop", vec!["lake".into()], vec!["hiking".into()])
    }

    #[test]
    fn test_recommend_returns_n_distinct() {
        let ids = engine(3).recommend(&query()).unwrap();
        assert_eq!(ids.len(), 3);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert_eq!(ids[0], 1);
    }

    #[test]
    fn test_predict_gives_known_class() {
        let engine = engine(2);
        let label = engine.predict(&query()).unwrap();
        assert!(engine.classifier().metadata.classes.contains(&label));
    }

    #[test]
    fn test_raw_queries() {
        let engine = engine(2);
        let raw = RawQuery {
            length: "2.8".into(),
            elevation_gain: "100".into(),
            route_type: "loop".into(),
            features: "['lake']".into(),
            activities: "['hiking']".into(),
        };
        assert_eq!(engine.recommend_raw(&raw).unwrap(), engine.recommend(&query()).unwrap());
        assert!(engine.predict_raw(&raw).is_ok());
    }

    #[test]
    fn test_recommend_detailed_fields() {
        let summaries = engine(1).recommend_detailed(&query()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].fields,
            vec![
                ("name".to_string(), "Lake Loop".to_string()),
                ("length".to_string(), "2.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_display_column_rejected() {
        let catalog = catalog();
        let featurized = featurize(&catalog, &spec()).unwrap();
        let classifier = ClassifierArtifact::train(
            &featurized.table,
            featurized.vectorizer.route_type(),
            &ForestParams::default(),
        )
        .unwrap();
        assert!(matches!(
            TrailEngine::new(
                catalog,
                featurized.vectorizer,
                featurized.table,
                classifier,
                2,
                vec!["area_name".into()],
            ),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_shared_engine_swap_keeps_old_handle() {
        let shared = SharedEngine::new(engine(2));
        let before = shared.current();
        shared.replace(engine(4));
        assert_eq!(before.recommend(&query()).unwrap().len(), 2);
        assert_eq!(shared.current().recommend(&query()).unwrap().len(), 4);
    }

    #[test]
    fn test_shared_engine_is_sync() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<SharedEngine>();
    }

    #[test]
    fn test_route_types_come_from_classifier() {
        let trained = catalog();
        let featurized = featurize(&trained, &spec()).unwrap();
        let classifier = ClassifierArtifact::train(
            &featurized.table,
            featurized.vectorizer.route_type(),
            &ForestParams::default(),
        )
        .unwrap();

        let headers = trained.headers().to_vec();
        let mut rows: Vec<Vec<String>> = trained.rows().to_vec();
        rows.push(
            ["6", "Lollipop Loop", "4.0", "200", "3", "lollipop", "['views']", "['hiking']"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        let serving = Catalog::new(headers, rows).unwrap();

        let live = QueryVectorizer::from_catalog(
            &serving,
            "route_type",
            featurized.vectorizer.features().clone(),
            featurized.vectorizer.activities().clone(),
        )
        .unwrap();
        assert!(matches!(
            TrailEngine::new(
                serving.clone(),
                live,
                featurized.table.clone(),
                classifier.clone(),
                2,
                vec![],
            ),
            Err(Error::DimensionMismatch { .. })
        ));

        let persisted = QueryVectorizer::new(
            classifier.route_type_encoder().unwrap(),
            featurized.vectorizer.features().clone(),
            featurized.vectorizer.activities().clone(),
        );
        let engine = TrailEngine::new(serving, persisted, featurized.table, classifier, 2, vec![]).unwrap();
        assert_eq!(engine.recommend(&query()).unwrap()[0], 1);
    }

    #[test]
    fn test_route_type_column_must_match_classifier() {
        let engine = engine(2);
        assert!(check_route_type_column(engine.classifier(), "route_type").is_ok());
        assert!(matches!(
            check_route_type_column(engine.classifier(), "route"),
            Err(Error::Configuration(_))
        ));
    }
}
