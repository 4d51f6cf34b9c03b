//! Similarity ranker
//!
//! Ranks catalog trails against a query by cosine similarity after standard
//! scaling. The query row takes part in the scaling statistics, exactly like a
//! catalog row, and is excluded from the results.

use crate::scaler::StandardScaler;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;
use tracing::debug;
use trailrec_core::{Error, FeatureTable, QueryVector, Result, TrailId, Vector};

/// A catalog trail with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTrail {
    pub trail_id: TrailId,
    pub score: f32,
}

/// Top-N ranker over a feature table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityRanker {
    n: usize,
}

impl SimilarityRanker {
    /// Create a ranker returning at most `n` trails; `n` must be positive
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::Configuration(
                "number of recommendations must be positive".to_string(),
            ));
        }
        Ok(Self { n })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Rank the table's trails by similarity to `query`, most similar first.
    ///
    /// Equal scores keep feature-table order (the sort is stable).
    pub fn rank(&self, table: &FeatureTable, query: &QueryVector) -> Result<Vec<RankedTrail>> {
        let scores = query_similarities(table, query)?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by_key(|&i| Reverse(OrderedFloat(scores[i])));
        order.truncate(self.n);

        let ranked: Vec<RankedTrail> = order
            .into_iter()
            .map(|i| RankedTrail {
                trail_id: table.trail_ids()[i],
                score: scores[i],
            })
            .collect();

        debug!(
            candidates = table.len(),
            returned = ranked.len(),
            "Ranked trails by scaled cosine similarity"
        );

        Ok(ranked)
    }
}

/// Similarity of the query to every catalog row, in table order.
///
/// Builds the combined matrix `[query; catalog rows]`, standard-scales it as
/// a whole and reads row 0 of its cosine similarity matrix. NaN scores sort
/// last.
pub fn query_similarities(table: &FeatureTable, query: &QueryVector) -> Result<Vec<f32>> {
    query.check_alignment(table.feature_names())?;

    let mut combined: Vec<Vector> = Vec::with_capacity(table.len() + 1);
    combined.push(query.values().clone());
    combined.extend(table.rows().iter().cloned());

    let scaled = StandardScaler::new().fit_transform(&combined)?;
    let (query_row, catalog_rows) = scaled.split_at(1);
    let query_row = &query_row[0];

    Ok(catalog_rows
        .par_iter()
        .map(|row| {
            let score = query_row.cosine_similarity(row);
            if score.is_nan() {
                f32::NEG_INFINITY
            } else {
                score
            }
        })
        .collect())
}

/// Identifiers of the `n` trails most similar to the query.
///
/// `trail_id` and `response` must name the table's identifier and response
/// columns.
pub fn recommend_trails(
    n: usize,
    table: &FeatureTable,
    trail_id: &str,
    response: &str,
    query: &QueryVector,
) -> Result<Vec<TrailId>> {
    if table.id_column() != trail_id {
        return Err(Error::ColumnNotFound(trail_id.to_string()));
    }
    if table.response_column() != response {
        return Err(Error::ColumnNotFound(response.to_string()));
    }

    Ok(SimilarityRanker::new(n)?
        .rank(table, query)?
        .into_iter()
        .map(|r| r.trail_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use trailrec_core::FeatureVector;

    fn names() -> Vec<String> {
        ["length", "elevation_gain", "features_lake"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn table(rows: &[(TrailId, [f32; 3])]) -> FeatureTable {
        FeatureTable::new(
            "trail_id",
            "difficulty_class",
            names(),
            rows.iter().map(|(id, _)| *id).collect(),
            rows.iter().map(|(_, v)| Vector::from_slice(v)).collect(),
            rows.iter().map(|_| "moderate".to_string()).collect(),
        )
        .unwrap()
    }

    fn query(values: [f32; 3]) -> QueryVector {
        FeatureVector::new(names(), values.to_vec()).unwrap()
    }

    #[test]
    fn test_three_trails_top_two() {
        let table = table(&[
            (101, [2.0, 150.0, 1.0]),
            (102, [14.0, 1500.0, 0.0]),
            (103, [3.0, 200.0, 1.0]),
        ]);
        let ids = recommend_trails(2, &table, "trail_id", "difficulty_class", &query([2.5, 180.0, 1.0]))
            .unwrap();
        assert_eq!(ids, vec![101, 103]);

        let ranked = SimilarityRanker::new(3).unwrap().rank(&table, &query([2.5, 180.0, 1.0])).unwrap();
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked.last().unwrap().trail_id, 102);
    }

    #[test]
    fn test_query_row_joins_scaling_statistics() {
        let table = table(&[
            (101, [2.0, 150.0, 1.0]),
            (102, [14.0, 1500.0, 0.0]),
            (103, [3.0, 200.0, 1.0]),
        ]);
        // Means and population deviations over all four rows, query included
        let scores = query_similarities(&table, &query([30.0, 3000.0, 0.0])).unwrap();
        let expected = [-0.972811, 0.645191, -0.963207];
        for (got, want) in scores.iter().zip(expected) {
            assert!((got - want).abs() < 1e-4, "{} != {}", got, want);
        }

        let ranked = SimilarityRanker::new(3).unwrap().rank(&table, &query([30.0, 3000.0, 0.0])).unwrap();
        let ids: Vec<TrailId> = ranked.iter().map(|r| r.trail_id).collect();
        assert_eq!(ids, vec![102, 103, 101]);
    }

    #[test]
    fn test_output_bounded_by_catalog() {
        let table = table(&[(1, [1.0, 2.0, 0.0]), (2, [2.0, 1.0, 1.0])]);
        let ids = recommend_trails(5, &table, "trail_id", "difficulty_class", &query([1.0, 1.0, 1.0]))
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_exactly_n_distinct() {
        let rows: Vec<(TrailId, [f32; 3])> = (0..20)
            .map(|i| (i as TrailId, [i as f32, (i * i) as f32, (i % 2) as f32]))
            .collect();
        let table = table(&rows);
        let ids = recommend_trails(7, &table, "trail_id", "difficulty_class", &query([4.0, 10.0, 1.0]))
            .unwrap();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), 7);
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_invariant_to_row_order() {
        let mut rows: Vec<(TrailId, [f32; 3])> = (0..30)
            .map(|i| (1000 + i as TrailId, [i as f32 * 0.7, (i * 37 % 11) as f32 * 90.0, (i % 3 == 0) as u8 as f32]))
            .collect();
        let q = query([6.0, 400.0, 1.0]);

        let mut expected = recommend_trails(5, &table(&rows), "trail_id", "difficulty_class", &q).unwrap();
        expected.sort();

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..5 {
            rows.shuffle(&mut rng);
            let mut got = recommend_trails(5, &table(&rows), "trail_id", "difficulty_class", &q).unwrap();
            got.sort();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_ties_keep_table_order() {
        let table = table(&[(7, [1.0, 1.0, 1.0]), (3, [1.0, 1.0, 1.0]), (5, [9.0, 9.0, 0.0])]);
        let ids = recommend_trails(2, &table, "trail_id", "difficulty_class", &query([1.0, 1.0, 1.0]))
            .unwrap();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn test_misaligned_query_fails_loudly() {
        let table = table(&[(1, [1.0, 2.0, 0.0]), (2, [2.0, 1.0, 1.0])]);
        let short = FeatureVector::new(names()[..2].to_vec(), vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            SimilarityRanker::new(1).unwrap().rank(&table, &short),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));

        let mut swapped_names = names();
        swapped_names.swap(0, 1);
        let swapped = FeatureVector::new(swapped_names, vec![1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            SimilarityRanker::new(1).unwrap().rank(&table, &swapped),
            Err(Error::SchemaMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_arguments() {
        let table = table(&[(1, [1.0, 2.0, 0.0])]);
        assert!(matches!(SimilarityRanker::new(0), Err(Error::Configuration(_))));
        assert!(matches!(
            recommend_trails(1, &table, "id", "difficulty_class", &query([1.0, 1.0, 1.0])),
            Err(Error::ColumnNotFound(_))
        ));
    }
}
