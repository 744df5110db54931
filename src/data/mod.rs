//! Data module - season CSV loading, cleaning and caching

mod cache;
mod cleaner;
mod loader;

pub use cache::SeasonCache;
pub use cleaner::{CleanerError, ResultCleaner};
pub use loader::{LoaderError, SeasonLoader, SeasonPair};

/// Column names shared by the loader, cleaner and aggregations.
pub const COL_DRIVER: &str = "Driver";
pub const COL_TEAM: &str = "Team";
pub const COL_TRACK: &str = "Track";
pub const COL_POSITION: &str = "Position";
pub const COL_POSITION_ORIGINAL: &str = "Position_Original";
pub const COL_POINTS: &str = "Points";
pub const COL_STARTING_GRID: &str = "Starting Grid";
pub const COL_TIME_RETIRED: &str = "Time/Retired";
pub const COL_SEASON: &str = "Season";

/// Race-result status text for a retirement.
pub const STATUS_DNF: &str = "DNF";
