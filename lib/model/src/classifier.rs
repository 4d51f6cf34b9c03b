use trailrec_core::{Error, QueryVector, Result};

/// Anything that maps an aligned feature vector to a difficulty label
pub trait DifficultyClassifier: Send + Sync {
    /// Column names the classifier was trained on, in order
    fn feature_names(&self) -> &[String];

    fn classes(&self) -> &[String];

    /// Predict from raw values already in training column order
    fn predict_values(&self, values: &[f32]) -> Result<String>;
}

/// Predict the difficulty label of a vectorized query.
///
/// The query must carry exactly the classifier's columns in the same order:
/// a width difference is a [`Error::DimensionMismatch`], a name difference
/// a [`Error::SchemaMismatch`].
pub fn predict_difficulty<C>(query: &QueryVector, classifier: &C) -> Result<String>
where
    C: DifficultyClassifier + ?Sized,
{
    let expected = classifier.feature_names();
    if query.len() != expected.len() {
        return Err(Error::DimensionMismatch {
            expected: expected.len(),
            actual: query.len(),
        });
    }
    query.check_alignment(expected)?;
    classifier.predict_values(query.as_slice())
}
