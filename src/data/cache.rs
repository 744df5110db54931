//! Season Cache Module
//! Read-through cache of cleaned season tables, keyed by path + mtime.
//!
//! Owned by the caller with explicit invalidation; a changed modification
//! time causes a reload. Safe to reuse across reloads because cleaning is
//! pure and idempotent.

use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use super::{LoaderError, ResultCleaner, SeasonLoader, SeasonPair};
use crate::config::DashboardConfig;

struct CacheEntry {
    modified: SystemTime,
    table: DataFrame,
}

/// Explicit cache of cleaned season tables.
#[derive(Default)]
pub struct SeasonCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl SeasonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cleaned table for `path`, loading it on a miss or a stale mtime.
    pub fn get_or_load(&mut self, path: &Path, year: i32) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            self.invalidate(path);
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if let (Some(modified), Some(entry)) = (modified, self.entries.get(path)) {
            if entry.modified == modified {
                debug!(file = %path.display(), "season cache hit");
                return Ok(entry.table.clone());
            }
        }

        debug!(file = %path.display(), "season cache miss");
        let raw = SeasonLoader::load_season(path, year)?;
        let table = ResultCleaner::clean(&raw)?;

        // A filesystem without mtimes just bypasses the cache.
        if let Some(modified) = modified {
            self.entries.insert(
                path.to_path_buf(),
                CacheEntry {
                    modified,
                    table: table.clone(),
                },
            );
        }

        Ok(table)
    }

    /// Load and clean both configured seasons through the cache.
    pub fn load_pair(&mut self, cfg: &DashboardConfig) -> Result<SeasonPair, LoaderError> {
        Ok(SeasonPair {
            year_a: cfg.season_a.year,
            year_b: cfg.season_b.year,
            table_a: self.get_or_load(&cfg.season_a.path, cfg.season_a.year)?,
            table_b: self.get_or_load(&cfg.season_b.path, cfg.season_b.year)?,
        })
    }

    /// Drop the cached table for one file.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Drop all cached tables.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TWO_ROWS: &str = "\
Track,Driver,Team,Position,Points
Bahrain,A,Red,1,25
Bahrain,B,Blue,2,18
";

    const THREE_ROWS: &str = "\
Track,Driver,Team,Position,Points
Bahrain,A,Red,1,25
Bahrain,B,Blue,2,18
Jeddah,A,Red,1,25
";

    fn set_mtime(path: &Path, t: SystemTime) {
        let file = OpenOptions::new().append(true).open(path).unwrap();
        file.set_modified(t).unwrap();
    }

    #[test]
    fn test_same_mtime_serves_cached_table() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TWO_ROWS.as_bytes()).unwrap();
        file.flush().unwrap();
        let mtime = std::fs::metadata(file.path()).unwrap().modified().unwrap();

        let mut cache = SeasonCache::new();
        let first = cache.get_or_load(file.path(), 2024).unwrap();
        assert_eq!(first.height(), 2);
        assert_eq!(cache.len(), 1);

        // Rewrite the file but pin the mtime back: the cache must not reload.
        std::fs::write(file.path(), THREE_ROWS).unwrap();
        set_mtime(file.path(), mtime);

        let cached = cache.get_or_load(file.path(), 2024).unwrap();
        assert_eq!(cached.height(), 2);
    }

    #[test]
    fn test_stale_mtime_reloads() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TWO_ROWS.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut cache = SeasonCache::new();
        assert_eq!(cache.get_or_load(file.path(), 2024).unwrap().height(), 2);

        std::fs::write(file.path(), THREE_ROWS).unwrap();
        set_mtime(
            file.path(),
            SystemTime::now() + std::time::Duration::from_secs(5),
        );

        assert_eq!(cache.get_or_load(file.path(), 2024).unwrap().height(), 3);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TWO_ROWS.as_bytes()).unwrap();
        file.flush().unwrap();
        let mtime = std::fs::metadata(file.path()).unwrap().modified().unwrap();

        let mut cache = SeasonCache::new();
        cache.get_or_load(file.path(), 2024).unwrap();

        std::fs::write(file.path(), THREE_ROWS).unwrap();
        set_mtime(file.path(), mtime);

        cache.invalidate(file.path());
        assert_eq!(cache.get_or_load(file.path(), 2024).unwrap().height(), 3);
    }

    #[test]
    fn test_missing_file_errors_and_drops_entry() {
        let mut cache = SeasonCache::new();
        let err = cache
            .get_or_load(Path::new("no_such_season.csv"), 2024)
            .unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(_)));
        assert!(cache.is_empty());
    }
}
