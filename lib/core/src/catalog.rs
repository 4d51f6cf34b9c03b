//! Trail catalog table
//!
//! The cleaned trail dataset as an ordered header plus string cells. Columns
//! are addressed by name so that every consumer fails the same way when a
//! configured column is missing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a trail in the catalog
pub type TrailId = u64;

/// Tabular trail catalog with named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Catalog {
    /// Create a catalog, checking that every row matches the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(Error::Configuration(format!(
                "catalog row {} has {} cells, header has {}",
                index,
                row.len(),
                headers.len()
            )));
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// All cells of a named column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// A named column parsed as numbers
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f32>> {
        self.column(name)?
            .into_iter()
            .map(|cell| parse_number(name, cell))
            .collect()
    }

    /// The identifier column parsed as trail ids
    pub fn trail_ids(&self, id_column: &str) -> Result<Vec<TrailId>> {
        self.column(id_column)?
            .into_iter()
            .map(|cell| parse_trail_id(id_column, cell))
            .collect()
    }

    pub fn row(&self, index: usize) -> Option<CatalogRow<'_>> {
        self.rows.get(index).map(|cells| CatalogRow {
            headers: &self.headers,
            cells,
        })
    }

    /// Look up a trail record by identifier
    pub fn find(&self, id_column: &str, id: TrailId) -> Result<Option<CatalogRow<'_>>> {
        let idx = self.column_index(id_column)?;
        for cells in &self.rows {
            if parse_trail_id(id_column, &cells[idx])? == id {
                return Ok(Some(CatalogRow {
                    headers: &self.headers,
                    cells,
                }));
            }
        }
        Ok(None)
    }

    /// Keep only the rows accepted by `keep`; returns how many were dropped
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&CatalogRow<'_>) -> bool,
    {
        let before = self.rows.len();
        let headers = &self.headers;
        self.rows.retain(|cells| keep(&CatalogRow { headers, cells }));
        before - self.rows.len()
    }

    /// Rewrite every cell of a named column
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }
}

/// Borrowed view of one catalog row
#[derive(Debug, Clone, Copy)]
pub struct CatalogRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> CatalogRow<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|idx| self.cells[idx].as_str())
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

/// Parse a numeric cell or query field; NaN and infinities are rejected
pub fn parse_number(field: &str, value: &str) -> Result<f32> {
    parse_finite(field, value)
}

/// [`parse_number`] at double precision
pub fn parse_number_f64(field: &str, value: &str) -> Result<f64> {
    parse_finite(field, value)
}

fn parse_finite<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr + Into<f64> + Copy,
{
    match value.trim().parse::<T>() {
        Ok(x) if Into::<f64>::into(x).is_finite() => Ok(x),
        _ => Err(Error::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_trail_id(field: &str, value: &str) -> Result<TrailId> {
    let trimmed = value.trim();
    if let Ok(id) = trimmed.parse::<TrailId>() {
        return Ok(id);
    }
    // Identifiers round-tripped through float columns come back as "123.0"
    match trimmed.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as TrailId),
        _ => Err(Error::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            vec!["trail_id".into(), "name".into(), "length".into()],
            vec![
                vec!["1".into(), "Baxter Creek Trail".into(), "14.36".into()],
                vec!["2".into(), "Closed Loop".into(), "3.5".into()],
                vec!["3.0".into(), "Clouds Rest".into(), "11.25".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = Catalog::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_column_is_lookup_error() {
        let catalog = sample();
        assert!(matches!(
            catalog.column("route_type"),
            Err(Error::ColumnNotFound(name)) if name == "route_type"
        ));
    }

    #[test]
    fn test_numeric_and_id_columns() {
        let catalog = sample();
        assert_eq!(catalog.numeric_column("length").unwrap(), vec![14.36, 3.5, 11.25]);
        assert_eq!(catalog.trail_ids("trail_id").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            catalog.numeric_column("name"),
            Err(Error::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for value in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert!(matches!(
                parse_number("length", value),
                Err(Error::InvalidNumber { field, .. }) if field == "length"
            ));
            assert!(parse_number_f64("length", value).is_err());
        }
        assert_eq!(parse_number(" 2.5 ", " 2.5 ").unwrap(), 2.5);
        assert_eq!(parse_number_f64("length", "17661.60001").unwrap(), 17661.60001);
    }

    #[test]
    fn test_find_and_retain() {
        let mut catalog = sample();
        let row = catalog.find("trail_id", 3).unwrap().unwrap();
        assert_eq!(row.get("name"), Some("Clouds Rest"));
        assert!(catalog.find("trail_id", 42).unwrap().is_none());

        let dropped = catalog.retain_rows(|row| {
            !row.get("name").unwrap_or("").to_lowercase().contains("closed")
        });
        assert_eq!(dropped, 1);
        assert_eq!(catalog.len(), 2);
    }
}
