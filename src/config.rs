//! Dashboard Configuration
//! Season file locations with optional `dashboard.json` override.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default season files, relative to the working directory.
pub const DEFAULT_FILE_2024: &str = "Formula1_2024season_raceResults.csv";
pub const DEFAULT_FILE_2025: &str = "Formula1_2025Season_RaceResults.csv";

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// One season's CSV source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonSource {
    pub path: PathBuf,
    pub year: i32,
}

/// Dashboard configuration: the two season sources to compare.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    pub season_a: SeasonSource,
    pub season_b: SeasonSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            season_a: SeasonSource {
                path: PathBuf::from(DEFAULT_FILE_2024),
                year: 2024,
            },
            season_b: SeasonSource {
                path: PathBuf::from(DEFAULT_FILE_2025),
                year: 2025,
            },
        }
    }
}

impl DashboardConfig {
    /// Load from `dashboard.json` if present, otherwise defaults.
    /// A malformed config file falls back to defaults with a warning.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_paths() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.season_a.path, PathBuf::from(DEFAULT_FILE_2024));
        assert_eq!(cfg.season_a.year, 2024);
        assert_eq!(cfg.season_b.year, 2025);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let cfg = DashboardConfig::load_from(Path::new("no_such_dashboard.json"));
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"season_a":{{"path":"a.csv","year":2022}},"season_b":{{"path":"b.csv","year":2023}}}}"#
        )
        .unwrap();

        let cfg = DashboardConfig::load_from(file.path());
        assert_eq!(cfg.season_a.path, PathBuf::from("a.csv"));
        assert_eq!(cfg.season_a.year, 2022);
        assert_eq!(cfg.season_b.year, 2023);
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let cfg = DashboardConfig::load_from(file.path());
        assert_eq!(cfg, DashboardConfig::default());
    }
}
