//! Season Loader Module
//! Reads season result CSVs with Polars and tags every row with its season.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{CleanerError, ResultCleaner, COL_SEASON};
use crate::config::DashboardConfig;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Season file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Cleaner(#[from] CleanerError),
}

/// The two cleaned, schema-identical season tables.
#[derive(Clone)]
pub struct SeasonPair {
    pub year_a: i32,
    pub year_b: i32,
    pub table_a: DataFrame,
    pub table_b: DataFrame,
}

impl SeasonPair {
    /// Seasons in chronological order, for per-season panels.
    pub fn seasons(&self) -> [(i32, &DataFrame); 2] {
        [(self.year_a, &self.table_a), (self.year_b, &self.table_b)]
    }
}

/// Loads season result files from disk.
pub struct SeasonLoader;

impl SeasonLoader {
    /// Load one raw season table and append the constant `Season` column.
    ///
    /// A missing file is the only recovered failure; every other CSV
    /// problem propagates as a Polars error.
    pub fn load_season(path: &Path, year: i32) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let path_str = path.to_string_lossy().to_string();
        let df = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .with_column(lit(year).alias(COL_SEASON))
            .collect()?;

        info!(rows = df.height(), year, file = %path.display(), "season loaded");
        Ok(df)
    }

    /// Load and clean both configured seasons.
    pub fn load_seasons(cfg: &DashboardConfig) -> Result<SeasonPair, LoaderError> {
        let raw_a = Self::load_season(&cfg.season_a.path, cfg.season_a.year)?;
        let raw_b = Self::load_season(&cfg.season_b.path, cfg.season_b.year)?;

        Ok(SeasonPair {
            year_a: cfg.season_a.year,
            year_b: cfg.season_b.year,
            table_a: ResultCleaner::clean(&raw_a)?,
            table_b: ResultCleaner::clean(&raw_b)?,
        })
    }

    /// Configured season files that are absent from disk.
    pub fn missing_sources(cfg: &DashboardConfig) -> Vec<PathBuf> {
        [&cfg.season_a.path, &cfg.season_b.path]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeasonSource;
    use crate::data::{COL_POINTS, COL_POSITION};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SEASON_CSV: &str = "\
Track,Driver,Team,Position,Starting Grid,Time/Retired,Points
Bahrain,A,Red,1,2,1:31:44.742,25
Bahrain,B,Blue,DNF,3,DNF,
Jeddah,A,Red,2,1,1:20:43.273,18
";

    fn season_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SEASON_CSV.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_season_tags_every_row() {
        let file = season_file();
        let df = SeasonLoader::load_season(file.path(), 2024).unwrap();

        assert_eq!(df.height(), 3);
        let season = df.column(COL_SEASON).unwrap().i32().unwrap();
        assert!(season.into_iter().all(|v| v == Some(2024)));
    }

    #[test]
    fn test_missing_file_is_a_distinct_error() {
        let err = SeasonLoader::load_season(Path::new("no_such_season.csv"), 2024).unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(_)));
    }

    #[test]
    fn test_load_seasons_produces_identical_schemas() {
        let file_a = season_file();
        let file_b = season_file();
        let cfg = DashboardConfig {
            season_a: SeasonSource {
                path: file_a.path().to_path_buf(),
                year: 2024,
            },
            season_b: SeasonSource {
                path: file_b.path().to_path_buf(),
                year: 2025,
            },
        };

        let pair = SeasonLoader::load_seasons(&cfg).unwrap();
        assert_eq!(
            pair.table_a.get_column_names(),
            pair.table_b.get_column_names()
        );

        // Cleaned values follow the coercion policy.
        let position = pair.table_a.column(COL_POSITION).unwrap().f64().unwrap();
        assert_eq!(position.get(0), Some(1.0));
        assert_eq!(position.get(1), None);
        let points = pair.table_a.column(COL_POINTS).unwrap().f64().unwrap();
        assert_eq!(points.get(1), Some(0.0));
    }

    #[test]
    fn test_missing_sources_lists_absent_files() {
        let file_a = season_file();
        let cfg = DashboardConfig {
            season_a: SeasonSource {
                path: file_a.path().to_path_buf(),
                year: 2024,
            },
            season_b: SeasonSource {
                path: PathBuf::from("no_such_season.csv"),
                year: 2025,
            },
        };

        let missing = SeasonLoader::missing_sources(&cfg);
        assert_eq!(missing, vec![PathBuf::from("no_such_season.csv")]);
    }
}
