//! Raw catalog cleaning

use crate::catalog::{parse_number_f64, Catalog};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const YARDS_PER_MILE: f64 = 1760.0;

/// Parameters of the cleaning step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanSpec {
    /// Column holding trail length in yards
    pub length_column: String,
    /// Decimal places kept after conversion to miles
    pub digits: u32,
    /// Column searched for `drop_str`
    pub name_column: String,
    /// Rows whose lower-cased name contains this string are dropped
    pub drop_str: String,
}

/// Convert a column from yards to miles, rounded to `digits` places
pub fn yards_to_miles(catalog: &mut Catalog, column: &str, digits: u32) -> Result<()> {
    let scale = 10f64.powi(digits as i32);
    catalog.map_column(column, |cell| {
        let yards = parse_number_f64(column, cell)?;
        let miles = (yards / YARDS_PER_MILE * scale).round() / scale;
        Ok(miles.to_string())
    })?;
    info!("Converted {} from yards to miles", column);
    Ok(())
}

/// Drop rows whose `column` contains `needle`, case-insensitively.
///
/// Returns the number of dropped rows.
pub fn drop_rows_containing(catalog: &mut Catalog, column: &str, needle: &str) -> Result<usize> {
    let idx = catalog.column_index(column)?;
    let needle = needle.to_lowercase();
    let dropped = catalog.retain_rows(|row| !row.cells()[idx].to_lowercase().contains(&needle));

    if dropped != 0 {
        warn!("Dropped {} rows from the data", dropped);
    }
    info!(
        "The data has {} rows after filtering the drop string",
        catalog.len()
    );

    Ok(dropped)
}

/// Run the full cleaning step on a raw catalog
pub fn clean(mut catalog: Catalog, spec: &CleanSpec) -> Result<Catalog> {
    yards_to_miles(&mut catalog, &spec.length_column, spec.digits)?;
    drop_rows_containing(&mut catalog, &spec.name_column, &spec.drop_str)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn raw() -> Catalog {
        Catalog::new(
            vec!["trail_id".into(), "name".into(), "length".into()],
            vec![
                vec!["10008848".into(), "Baxter Creek Trail".into(), "25266.638".into()],
                vec!["10032315".into(), "Sunnybrook Meadows Trail".into(), "26393.176".into()],
                vec!["10027503".into(), "Clouds Rest Trail via Tenaya Lake".into(), "19794.882".into()],
                vec!["10099999".into(), "Old Mill Trail (CLOSED)".into(), "1760".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_yards_to_miles() {
        let mut catalog = raw();
        yards_to_miles(&mut catalog, "length", 2).unwrap();
        assert_eq!(
            catalog.numeric_column("length").unwrap(),
            vec![14.36, 15.0, 11.25, 1.0]
        );
    }

    #[test]
    fn test_yards_to_miles_keeps_double_precision() {
        let column = |value: &str| Catalog::new(vec!["length".into()], vec![vec![value.into()]]).unwrap();

        // 1003.50000057 hundredths of a mile; single precision lands below the half
        let mut catalog = column("17661.60001");
        yards_to_miles(&mut catalog, "length", 2).unwrap();
        assert_eq!(catalog.row(0).unwrap().get("length"), Some("10.04"));

        assert!(matches!(
            yards_to_miles(&mut column("NaN"), "length", 2),
            Err(Error::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_yards_to_miles_missing_column() {
        let mut catalog = raw();
        assert!(matches!(
            yards_to_miles(&mut catalog, "error", 2),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_drop_rows_containing() {
        let mut catalog = raw();
        let dropped = drop_rows_containing(&mut catalog, "name", "closed").unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(catalog.trail_ids("trail_id").unwrap(), vec![10008848, 10032315, 10027503]);
    }

    #[test]
    fn test_drop_nothing_keeps_rows() {
        let mut catalog = raw();
        assert_eq!(drop_rows_containing(&mut catalog, "name", "flooded").unwrap(), 0);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_clean_pipeline() {
        let spec = CleanSpec {
            length_column: "length".into(),
            digits: 2,
            name_column: "name".into(),
            drop_str: "closed".into(),
        };
        let cleaned = clean(raw(), &spec).unwrap();
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned.row(0).unwrap().get("length"), Some("14.36"));
    }
}
