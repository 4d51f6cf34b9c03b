//! Classifier artifact persistence
//!
//! The artifact is stored as bincode next to a pretty-printed JSON copy of its
//! metadata (`<path>.meta.json`) for inspection. Both are written atomically.

use crate::write_atomic;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use trailrec_core::{Error, Result};
use trailrec_model::{ClassifierArtifact, EvaluationReport};

/// Location of the metadata sidecar for an artifact path
pub fn metadata_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

pub fn save_artifact<P: AsRef<Path>>(artifact: &ClassifierArtifact, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = bincode::serialize(artifact).map_err(|e| Error::Serialization(e.to_string()))?;
    write_atomic(path, &bytes)?;

    let meta = serde_json::to_vec_pretty(&artifact.metadata)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    write_atomic(&metadata_path(path), &meta)?;

    info!(
        path = %path.display(),
        bytes = bytes.len(),
        fingerprint = %artifact.metadata.schema_fingerprint,
        "Classifier artifact saved"
    );
    Ok(())
}

/// Load and verify an artifact.
///
/// A missing or undecodable file is [`Error::ArtifactNotFound`]. An artifact
/// that decodes but fails [`ClassifierArtifact::verify`] (wrong version or a
/// tampered schema) is [`Error::Persistence`].
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<ClassifierArtifact> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ArtifactNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let artifact: ClassifierArtifact = bincode::deserialize(&bytes).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Classifier artifact could not be decoded");
        Error::ArtifactNotFound(path.to_path_buf())
    })?;
    artifact.verify()?;

    info!(
        path = %path.display(),
        features = artifact.metadata.feature_names.len(),
        trained_at = %artifact.metadata.trained_at,
        "Classifier artifact loaded"
    );
    Ok(artifact)
}

pub fn save_report<P: AsRef<Path>>(report: &EvaluationReport, path: P) -> Result<()> {
    let path = path.as_ref();
    write_atomic(path, report.render().as_bytes())?;
    info!(path = %path.display(), "Evaluation report saved");
    Ok(())
}
