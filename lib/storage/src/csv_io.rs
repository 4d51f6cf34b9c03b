//! CSV reading and writing for catalogs and feature tables

use crate::write_atomic;
use std::path::Path;
use tracing::info;
use trailrec_core::{Catalog, Error, FeatureTable, Result};

fn csv_error(path: &Path, err: csv::Error) -> Error {
    if let csv::ErrorKind::Io(io) = err.kind() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return Error::ArtifactNotFound(path.to_path_buf());
        }
    }
    Error::Csv(format!("{}: {}", path.display(), err))
}

/// Read a headed CSV file into a catalog.
///
/// A missing file is [`Error::ArtifactNotFound`].
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| csv_error(path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(path = %path.display(), rows = rows.len(), "Catalog loaded");
    Catalog::new(headers, rows)
}

/// Write a catalog as CSV, replacing `path` atomically
pub fn write_catalog<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(catalog.headers())
        .map_err(|e| csv_error(path, e))?;
    for row in catalog.rows() {
        writer.write_record(row).map_err(|e| csv_error(path, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Csv(format!("{}: {}", path.display(), e)))?;

    write_atomic(path, &bytes)?;
    info!(path = %path.display(), rows = catalog.len(), "Catalog saved");
    Ok(())
}

/// Read a feature table; all columns other than the id and response are features
pub fn read_feature_table<P: AsRef<Path>>(
    path: P,
    id_column: &str,
    response_column: &str,
) -> Result<FeatureTable> {
    let catalog = read_catalog(path)?;
    FeatureTable::from_catalog(&catalog, id_column, response_column)
}

pub fn write_feature_table<P: AsRef<Path>>(table: &FeatureTable, path: P) -> Result<()> {
    write_catalog(&table.to_catalog()?, path)
}
