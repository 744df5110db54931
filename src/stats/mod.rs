//! Stats module - grouping and aggregation over cleaned season tables

mod aggregate;
mod summary;

pub use aggregate::{Aggregator, BoxStats, HeatmapMatrix};
pub use summary::SeasonSummary;
