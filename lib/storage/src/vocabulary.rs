use crate::write_atomic;
use std::path::Path;
use tracing::info;
use trailrec_core::{Error, Result};

/// Read a vocabulary file: one term per line, blank lines ignored
pub fn read_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ArtifactNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn write_vocabulary<P: AsRef<Path>>(terms: &[String], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut text = terms.join("\n");
    text.push('\n');
    write_atomic(path, text.as_bytes())?;
    info!(path = %path.display(), terms = terms.len(), "Vocabulary saved");
    Ok(())
}
