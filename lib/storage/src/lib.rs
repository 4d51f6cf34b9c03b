//! # trailrec Storage
//!
//! File persistence for every artifact the jobs hand to each other:
//! catalog and feature-table CSVs, the two vocabulary files, the classifier
//! artifact with its metadata sidecar, and the evaluation report.
//!
//! All writes go through [`write_atomic`], so readers never observe a
//! half-written file.

pub mod artifact;
pub mod csv_io;
pub mod vocabulary;

pub use artifact::{load_artifact, metadata_path, save_artifact, save_report};
pub use csv_io::{read_catalog, read_feature_table, write_catalog, write_feature_table};
pub use vocabulary::{read_vocabulary, write_vocabulary};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use std::io::Write;
use std::path::Path;
use trailrec_core::{Error, Result};

/// Replace `path` with `bytes` via a temporary file and rename.
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(bytes))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_overwrites_and_creates_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.txt");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }
}
