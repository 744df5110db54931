//! Result Cleaner Module
//! Coerces race-result columns to numeric types, pandas `to_numeric`-style.

use polars::prelude::*;
use thiserror::Error;

use super::{COL_POINTS, COL_POSITION, COL_POSITION_ORIGINAL, COL_STARTING_GRID};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Cleans a raw season table into the analysis schema.
///
/// `Position` keeps its pre-coercion text under `Position_Original` so that
/// non-numeric statuses (DNF, DSQ, NC) stay available for display. Coercion
/// never errors: a cell that fails to parse becomes null (`Position`,
/// `Starting Grid`) or zero (`Points`).
pub struct ResultCleaner;

impl ResultCleaner {
    /// Clean one season table. Idempotent: re-cleaning a cleaned table
    /// yields the same table.
    pub fn clean(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let mut out = df.clone();

        // Keep the verbatim source text before Position is coerced.
        // Skip on a second pass so the original text survives re-cleaning.
        if out.column(COL_POSITION_ORIGINAL).is_err() {
            if let Ok(pos) = out.column(COL_POSITION) {
                let original = Self::to_text(pos, COL_POSITION_ORIGINAL);
                out.with_column(original)?;
            }
        }

        if let Ok(pos) = out.column(COL_POSITION) {
            let cleaned = Self::to_numeric(pos, COL_POSITION);
            out.with_column(cleaned)?;
        }

        if let Ok(points) = out.column(COL_POINTS) {
            let values: Vec<f64> = Self::numeric_values(points)
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            out.with_column(Column::new(COL_POINTS.into(), values))?;
        }

        // Starting Grid is optional in the source; absence is not an error.
        if let Ok(grid) = out.column(COL_STARTING_GRID) {
            let cleaned = Self::to_numeric(grid, COL_STARTING_GRID);
            out.with_column(cleaned)?;
        }

        Ok(out)
    }

    /// Coerce a column to Float64, null where a value fails to parse.
    fn to_numeric(col: &Column, name: &str) -> Column {
        Column::new(name.into(), Self::numeric_values(col))
    }

    /// Per-cell numeric coercion of a column of any dtype.
    fn numeric_values(col: &Column) -> Vec<Option<f64>> {
        let series = col.as_materialized_series();
        (0..series.len())
            .map(|i| match series.get(i) {
                Ok(value) => Self::parse_numeric(value),
                Err(_) => None,
            })
            .collect()
    }

    fn parse_numeric(value: AnyValue) -> Option<f64> {
        match value {
            AnyValue::Null => None,
            AnyValue::String(s) => s.trim().parse::<f64>().ok(),
            AnyValue::StringOwned(s) => s.as_str().trim().parse::<f64>().ok(),
            other => other.try_extract::<f64>().ok(),
        }
    }

    /// Snapshot a column as text, preserving nulls.
    fn to_text(col: &Column, name: &str) -> Column {
        let series = col.as_materialized_series();
        let values: Vec<Option<String>> = (0..series.len())
            .map(|i| {
                let value = series.get(i).ok()?;
                if value.is_null() {
                    None
                } else {
                    Some(value.to_string().trim_matches('"').to_string())
                }
            })
            .collect();
        Column::new(name.into(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_season() -> DataFrame {
        DataFrame::new(vec![
            Column::new(COL_POSITION.into(), vec!["1", "DNF", "3"]),
            Column::new(COL_POINTS.into(), vec!["25", "", "15"]),
            Column::new("Driver".into(), vec!["A", "B", "C"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_points_non_negative_and_zero_filled() {
        let cleaned = ResultCleaner::clean(&raw_season()).unwrap();
        let points = cleaned.column(COL_POINTS).unwrap().f64().unwrap();

        assert_eq!(points.get(0), Some(25.0));
        assert_eq!(points.get(1), Some(0.0));
        assert_eq!(points.get(2), Some(15.0));
        assert!(points.into_iter().all(|v| v.unwrap() >= 0.0));
    }

    #[test]
    fn test_unparseable_position_becomes_null_with_original_kept() {
        let cleaned = ResultCleaner::clean(&raw_season()).unwrap();

        let position = cleaned.column(COL_POSITION).unwrap().f64().unwrap();
        assert_eq!(position.get(0), Some(1.0));
        assert_eq!(position.get(1), None);

        let original = cleaned
            .column(COL_POSITION_ORIGINAL)
            .unwrap()
            .str()
            .unwrap();
        assert_eq!(original.get(0), Some("1"));
        assert_eq!(original.get(1), Some("DNF"));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = ResultCleaner::clean(&raw_season()).unwrap();
        let twice = ResultCleaner::clean(&once).unwrap();
        assert!(twice.equals_missing(&once));
    }

    #[test]
    fn test_starting_grid_cleaned_when_present() {
        let df = raw_season()
            .hstack(&[Column::new(
                COL_STARTING_GRID.into(),
                vec!["2", "x", "20"],
            )])
            .unwrap();
        let cleaned = ResultCleaner::clean(&df).unwrap();

        let grid = cleaned.column(COL_STARTING_GRID).unwrap().f64().unwrap();
        assert_eq!(grid.get(0), Some(2.0));
        assert_eq!(grid.get(1), None);
    }

    #[test]
    fn test_missing_starting_grid_is_not_an_error() {
        let cleaned = ResultCleaner::clean(&raw_season()).unwrap();
        assert!(cleaned.column(COL_STARTING_GRID).is_err());
    }

    #[test]
    fn test_already_numeric_columns_pass_through() {
        let df = DataFrame::new(vec![
            Column::new(COL_POSITION.into(), vec![Some(1.0f64), None]),
            Column::new(COL_POINTS.into(), vec![25.0f64, 0.0]),
            Column::new(COL_POSITION_ORIGINAL.into(), vec![Some("1"), Some("DNF")]),
        ])
        .unwrap();
        let cleaned = ResultCleaner::clean(&df).unwrap();
        assert!(cleaned.equals_missing(&df));
    }
}
