//! Season Summary Module
//! Headline figures for one season, backing the summary comparison table.

use polars::prelude::DataFrame;

use super::Aggregator;
use crate::data::{COL_DRIVER, COL_POINTS, COL_TEAM, COL_TRACK};

/// Headline figures for one season.
#[derive(Debug, Clone, Default)]
pub struct SeasonSummary {
    pub year: i32,
    pub races: usize,
    pub drivers: usize,
    pub teams: usize,
    /// Driver with the most wins, with the win count.
    pub most_wins: Option<(String, f64)>,
    /// Driver with the highest points total, with that total.
    pub points_leader: Option<(String, f64)>,
}

impl SeasonSummary {
    pub fn compute(year: i32, df: &DataFrame) -> Self {
        Self {
            year,
            races: Aggregator::unique_count(df, COL_TRACK),
            drivers: Aggregator::unique_count(df, COL_DRIVER),
            teams: Aggregator::unique_count(df, COL_TEAM),
            most_wins: Aggregator::wins_by_driver(df).into_iter().next(),
            points_leader: Aggregator::sum_by(df, COL_DRIVER, COL_POINTS)
                .into_iter()
                .next(),
        }
    }
}
