//! Aggregation Module
//! Grouping, counting and averaging over cleaned season tables.
//!
//! All functions tolerate a missing column by returning an empty result, so
//! a season file without an optional column (e.g. `Starting Grid`) degrades
//! to an empty panel instead of an error.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::data::{
    COL_DRIVER, COL_POINTS, COL_POSITION, COL_STARTING_GRID, COL_TEAM, COL_TIME_RETIRED,
    COL_TRACK, STATUS_DNF,
};

/// Driver x track points matrix backing the performance heatmap.
#[derive(Debug, Clone, Default)]
pub struct HeatmapMatrix {
    /// Row labels, best total first.
    pub drivers: Vec<String>,
    /// Column labels in race-calendar (file appearance) order.
    pub tracks: Vec<String>,
    /// `values[driver_idx][track_idx]`, zero-filled.
    pub values: Vec<Vec<f64>>,
}

/// Five-number summary backing one box of a box-and-whisker panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

/// Grouping and aggregation over cleaned tables.
pub struct Aggregator;

impl Aggregator {
    /// Total `value_col` per `key_col`, sorted descending by total.
    /// Null values count as zero so no row is dropped.
    pub fn sum_by(df: &DataFrame, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
        let mut totals = Self::grouped_sums(df, key_col, value_col);
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        totals
    }

    /// Total `value_col` per `key_col` in file appearance order
    /// (race-calendar order when keyed by track).
    pub fn sum_by_in_order(df: &DataFrame, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
        Self::grouped_sums(df, key_col, value_col)
    }

    /// Mean of `value_col` per `key_col`, ascending. Null values are
    /// skipped, not treated as zero; keys with no samples are dropped.
    pub fn mean_by(df: &DataFrame, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
        let mut means: Vec<(String, f64)> = Self::grouped_values(df, key_col, value_col)
            .into_iter()
            .filter_map(|(key, values)| {
                let present: Vec<f64> = values.into_iter().flatten().collect();
                if present.is_empty() {
                    return None;
                }
                Some((key, present.iter().sum::<f64>() / present.len() as f64))
            })
            .collect();
        means.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        means
    }

    /// Sample standard deviation of `value_col` per `key_col`, ascending
    /// (lower = more consistent). Keys with fewer than two samples are
    /// dropped.
    pub fn std_by(df: &DataFrame, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
        let mut stds: Vec<(String, f64)> = Self::grouped_values(df, key_col, value_col)
            .into_iter()
            .filter_map(|(key, values)| {
                let present: Vec<f64> = values.into_iter().flatten().collect();
                let n = present.len();
                if n < 2 {
                    return None;
                }
                let mean = present.iter().sum::<f64>() / n as f64;
                let variance =
                    present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                Some((key, variance.sqrt()))
            })
            .collect();
        stds.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        stds
    }

    /// Race wins per driver (`Position == 1`), most wins first.
    pub fn wins_by_driver(df: &DataFrame) -> Vec<(String, f64)> {
        let wins = Self::filter_eq_num(df, COL_POSITION, 1.0);
        Self::count_by(&wins, COL_DRIVER)
    }

    /// Podium finishes per team (`Position <= 3`), most podiums first.
    pub fn podiums_by_team(df: &DataFrame) -> Vec<(String, f64)> {
        let podiums = df
            .clone()
            .lazy()
            .filter(col(COL_POSITION).lt_eq(lit(3.0)))
            .collect()
            .unwrap_or_default();
        Self::count_by(&podiums, COL_TEAM)
    }

    /// DNF count per driver, most retirements first.
    pub fn dnf_counts_by_driver(df: &DataFrame) -> Vec<(String, f64)> {
        let dnfs = Self::filter_eq_text(df, COL_TIME_RETIRED, STATUS_DNF);
        Self::count_by(&dnfs, COL_DRIVER)
    }

    /// DNF percentage per track in race-calendar order.
    pub fn dnf_rate_by_track(df: &DataFrame) -> Vec<(String, f64)> {
        let mut totals: HashMap<String, f64> = HashMap::new();
        for label in Self::text_values(df, COL_TRACK).into_iter().flatten() {
            *totals.entry(label).or_insert(0.0) += 1.0;
        }

        let dnfs = Self::filter_eq_text(df, COL_TIME_RETIRED, STATUS_DNF);
        let mut dnf_counts: HashMap<String, f64> = HashMap::new();
        for label in Self::text_values(&dnfs, COL_TRACK).into_iter().flatten() {
            *dnf_counts.entry(label).or_insert(0.0) += 1.0;
        }

        Self::unique_in_order(df, COL_TRACK)
            .into_iter()
            .map(|track| {
                let total = totals.get(&track).copied().unwrap_or(0.0);
                let dnf = dnf_counts.get(&track).copied().unwrap_or(0.0);
                let rate = if total > 0.0 { dnf / total * 100.0 } else { 0.0 };
                (track, rate)
            })
            .collect()
    }

    /// Average positions gained per driver (`Starting Grid - Position`),
    /// biggest gainers first. Empty when the table has no grid column.
    pub fn positions_gained_by_driver(df: &DataFrame) -> Vec<(String, f64)> {
        if df.column(COL_STARTING_GRID).is_err() {
            return Vec::new();
        }

        let drivers = Self::text_values(df, COL_DRIVER);
        let grids = Self::numeric_values(df, COL_STARTING_GRID);
        let positions = Self::numeric_values(df, COL_POSITION);

        let mut gained: HashMap<String, Vec<f64>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for ((driver, grid), position) in drivers.iter().zip(&grids).zip(&positions) {
            if let (Some(driver), Some(grid), Some(position)) = (driver, grid, position) {
                if !gained.contains_key(driver) {
                    order.push(driver.clone());
                }
                gained.entry(driver.clone()).or_default().push(grid - position);
            }
        }

        let mut means: Vec<(String, f64)> = order
            .into_iter()
            .filter_map(|driver| {
                let values = gained.get(&driver)?;
                Some((
                    driver.clone(),
                    values.iter().sum::<f64>() / values.len() as f64,
                ))
            })
            .collect();
        means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        means
    }

    /// Finishing-position frequencies over bins 1..=20.
    pub fn position_histogram(df: &DataFrame) -> Vec<(u32, usize)> {
        let mut counts = vec![0usize; 20];
        for value in Self::numeric_values(df, COL_POSITION).into_iter().flatten() {
            let bin = value.round() as i64;
            if (1..=20).contains(&bin) {
                counts[(bin - 1) as usize] += 1;
            }
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as u32 + 1, c))
            .collect()
    }

    /// Points spread per finishing position `1..=max_position`. Positions
    /// with no finishers are dropped; whiskers reach the farthest value
    /// within 1.5 IQR of the quartiles.
    pub fn points_spread_by_position(df: &DataFrame, max_position: u32) -> Vec<(u32, BoxStats)> {
        let positions = Self::numeric_values(df, COL_POSITION);
        let points = Self::numeric_values(df, COL_POINTS);

        let mut buckets: HashMap<u32, Vec<f64>> = HashMap::new();
        for (position, pts) in positions.into_iter().zip(points) {
            let (Some(position), Some(pts)) = (position, pts) else {
                continue;
            };
            let bin = position.round() as i64;
            if (1..=max_position as i64).contains(&bin) {
                buckets.entry(bin as u32).or_default().push(pts);
            }
        }

        (1..=max_position)
            .filter_map(|position| {
                let mut values = buckets.remove(&position)?;
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                Some((position, Self::box_stats(&values)))
            })
            .collect()
    }

    /// Five-number summary of sorted, non-empty values.
    fn box_stats(sorted: &[f64]) -> BoxStats {
        let q1 = Self::quantile(sorted, 0.25);
        let median = Self::quantile(sorted, 0.5);
        let q3 = Self::quantile(sorted, 0.75);
        let reach = 1.5 * (q3 - q1);
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= q1 - reach)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + reach)
            .unwrap_or(q3);
        BoxStats {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
        }
    }

    /// Linear-interpolation quantile of sorted values.
    fn quantile(sorted: &[f64], q: f64) -> f64 {
        let h = (sorted.len() - 1) as f64 * q;
        let lo = h.floor() as usize;
        let hi = h.ceil() as usize;
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }

    /// `[x, y]` pairs for rows where both columns hold a value.
    pub fn scatter_pairs(df: &DataFrame, x_col: &str, y_col: &str) -> Vec<[f64; 2]> {
        Self::numeric_values(df, x_col)
            .into_iter()
            .zip(Self::numeric_values(df, y_col))
            .filter_map(|(x, y)| Some([x?, y?]))
            .collect()
    }

    /// Pearson correlation of scatter pairs; None below two points or with
    /// zero variance.
    pub fn pearson(pairs: &[[f64; 2]]) -> Option<f64> {
        let n = pairs.len() as f64;
        if pairs.len() < 2 {
            return None;
        }

        let mean_x = pairs.iter().map(|p| p[0]).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p[1]).sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for p in pairs {
            let dx = p[0] - mean_x;
            let dy = p[1] - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }
        Some(cov / (var_x.sqrt() * var_y.sqrt()))
    }

    /// Driver x track points matrix for the top `top_n` drivers by total
    /// points.
    pub fn points_matrix(df: &DataFrame, top_n: usize) -> HeatmapMatrix {
        let drivers: Vec<String> = Self::sum_by(df, COL_DRIVER, COL_POINTS)
            .into_iter()
            .take(top_n)
            .map(|(driver, _)| driver)
            .collect();
        let tracks = Self::unique_in_order(df, COL_TRACK);

        let driver_col = Self::text_values(df, COL_DRIVER);
        let track_col = Self::text_values(df, COL_TRACK);
        let points_col = Self::numeric_values(df, COL_POINTS);

        let mut cells: HashMap<(String, String), f64> = HashMap::new();
        for ((driver, track), points) in driver_col.iter().zip(&track_col).zip(&points_col) {
            if let (Some(driver), Some(track)) = (driver, track) {
                *cells.entry((driver.clone(), track.clone())).or_insert(0.0) +=
                    points.unwrap_or(0.0);
            }
        }

        let values = drivers
            .iter()
            .map(|driver| {
                tracks
                    .iter()
                    .map(|track| {
                        cells
                            .get(&(driver.clone(), track.clone()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();

        HeatmapMatrix {
            drivers,
            tracks,
            values,
        }
    }

    /// Unique labels of a column in file appearance order.
    pub fn unique_in_order(df: &DataFrame, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        Self::text_values(df, name)
            .into_iter()
            .flatten()
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }

    /// Number of distinct non-null labels in a column.
    pub fn unique_count(df: &DataFrame, name: &str) -> usize {
        Self::unique_in_order(df, name).len()
    }

    /// Occurrence count per label, most frequent first.
    pub fn count_by(df: &DataFrame, key_col: &str) -> Vec<(String, f64)> {
        let mut counts: HashMap<String, f64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for label in Self::text_values(df, key_col).into_iter().flatten() {
            if !counts.contains_key(&label) {
                order.push(label.clone());
            }
            *counts.entry(label).or_insert(0.0) += 1.0;
        }

        let mut pairs: Vec<(String, f64)> = order
            .into_iter()
            .map(|label| {
                let count = counts[&label];
                (label, count)
            })
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }

    fn grouped_sums(df: &DataFrame, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
        Self::grouped_values(df, key_col, value_col)
            .into_iter()
            .map(|(key, values)| {
                let total = values.into_iter().map(|v| v.unwrap_or(0.0)).sum();
                (key, total)
            })
            .collect()
    }

    /// Values per key in file appearance order.
    fn grouped_values(
        df: &DataFrame,
        key_col: &str,
        value_col: &str,
    ) -> Vec<(String, Vec<Option<f64>>)> {
        let keys = Self::text_values(df, key_col);
        let values = Self::numeric_values(df, value_col);

        let mut groups: HashMap<String, Vec<Option<f64>>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for (key, value) in keys.into_iter().zip(values) {
            let Some(key) = key else { continue };
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(value);
        }

        order
            .into_iter()
            .filter_map(|key| {
                let values = groups.remove(&key)?;
                Some((key, values))
            })
            .collect()
    }

    /// Column as text, None for nulls; empty when the column is absent.
    fn text_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        let Ok(column) = df.column(name) else {
            return Vec::new();
        };
        let series = column.as_materialized_series();
        (0..series.len())
            .map(|i| {
                let value = series.get(i).ok()?;
                if value.is_null() {
                    None
                } else {
                    Some(value.to_string().trim_matches('"').to_string())
                }
            })
            .collect()
    }

    /// Column as Float64, None for nulls; empty when the column is absent.
    fn numeric_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        let Ok(column) = df.column(name) else {
            return Vec::new();
        };
        column
            .cast(&DataType::Float64)
            .ok()
            .and_then(|cast| cast.f64().map(|ca| ca.to_vec()).ok())
            .unwrap_or_default()
    }

    fn filter_eq_num(df: &DataFrame, name: &str, value: f64) -> DataFrame {
        df.clone()
            .lazy()
            .filter(col(name).eq(lit(value)))
            .collect()
            .unwrap_or_default()
    }

    fn filter_eq_text(df: &DataFrame, name: &str, value: &str) -> DataFrame {
        df.clone()
            .lazy()
            .filter(col(name).eq(lit(value)))
            .collect()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned_season() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                COL_DRIVER.into(),
                vec!["Max", "Lando", "Max", "Lando", "Oscar", "Max"],
            ),
            Column::new(
                COL_TEAM.into(),
                vec!["RBR", "McLaren", "RBR", "McLaren", "McLaren", "RBR"],
            ),
            Column::new(
                COL_TRACK.into(),
                vec![
                    "Bahrain", "Bahrain", "Jeddah", "Jeddah", "Jeddah", "Suzuka",
                ],
            ),
            Column::new(
                COL_POSITION.into(),
                vec![Some(1.0), Some(2.0), Some(1.0), None, Some(3.0), Some(1.0)],
            ),
            Column::new(
                COL_POINTS.into(),
                vec![25.0, 18.0, 25.0, 0.0, 15.0, 25.0],
            ),
            Column::new(
                COL_TIME_RETIRED.into(),
                vec![
                    "1:31:44.742",
                    "+5.708s",
                    "1:20:43.273",
                    "DNF",
                    "+12.535s",
                    "1:54:23.566",
                ],
            ),
            Column::new(
                COL_STARTING_GRID.into(),
                vec![Some(2.0), Some(1.0), Some(1.0), Some(2.0), Some(5.0), Some(1.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_sum_by_matches_per_row_sum() {
        let df = cleaned_season();
        let totals = Aggregator::sum_by(&df, COL_DRIVER, COL_POINTS);

        // Grouped totals must equal the straight per-row sums exactly.
        assert_eq!(totals[0], ("Max".to_string(), 75.0));
        assert_eq!(totals[1], ("Lando".to_string(), 18.0));
        assert_eq!(totals[2], ("Oscar".to_string(), 15.0));

        let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();
        assert_eq!(grand_total, 25.0 + 18.0 + 25.0 + 0.0 + 15.0 + 25.0);
    }

    #[test]
    fn test_wins_and_podiums() {
        let df = cleaned_season();

        let wins = Aggregator::wins_by_driver(&df);
        assert_eq!(wins, vec![("Max".to_string(), 3.0)]);

        let podiums = Aggregator::podiums_by_team(&df);
        assert_eq!(podiums[0], ("RBR".to_string(), 3.0));
        assert_eq!(podiums[1], ("McLaren".to_string(), 2.0));
    }

    #[test]
    fn test_mean_skips_null_positions() {
        let df = cleaned_season();
        let means = Aggregator::mean_by(&df, COL_DRIVER, COL_POSITION);

        // Lando's DNF (null position) must not drag his average to zero.
        let lando = means.iter().find(|(d, _)| d == "Lando").unwrap();
        assert_eq!(lando.1, 2.0);

        let max = means.iter().find(|(d, _)| d == "Max").unwrap();
        assert_eq!(max.1, 1.0);
    }

    #[test]
    fn test_dnf_counts_and_rates() {
        let df = cleaned_season();

        let dnfs = Aggregator::dnf_counts_by_driver(&df);
        assert_eq!(dnfs, vec![("Lando".to_string(), 1.0)]);

        let rates = Aggregator::dnf_rate_by_track(&df);
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0], ("Bahrain".to_string(), 0.0));
        // 1 DNF out of 3 Jeddah entries.
        let jeddah = rates.iter().find(|(t, _)| t == "Jeddah").unwrap();
        assert!((jeddah.1 - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_positions_gained() {
        let df = cleaned_season();
        let gained = Aggregator::positions_gained_by_driver(&df);

        // Max: (2-1), (1-1), (1-1) -> 1/3. Lando's DNF row is skipped.
        let max = gained.iter().find(|(d, _)| d == "Max").unwrap();
        assert!((max.1 - 1.0 / 3.0).abs() < 1e-9);
        let oscar = gained.iter().find(|(d, _)| d == "Oscar").unwrap();
        assert_eq!(oscar.1, 2.0);
        let lando = gained.iter().find(|(d, _)| d == "Lando").unwrap();
        assert_eq!(lando.1, -1.0);
    }

    #[test]
    fn test_positions_gained_without_grid_column_is_empty() {
        let df = cleaned_season().drop(COL_STARTING_GRID).unwrap();
        assert!(Aggregator::positions_gained_by_driver(&df).is_empty());
    }

    #[test]
    fn test_position_histogram_bins() {
        let df = cleaned_season();
        let histogram = Aggregator::position_histogram(&df);

        assert_eq!(histogram.len(), 20);
        assert_eq!(histogram[0], (1, 3));
        assert_eq!(histogram[1], (2, 1));
        assert_eq!(histogram[2], (3, 1));
        // The null position lands in no bin.
        let total: usize = histogram.iter().map(|(_, c)| c).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_points_spread_by_position() {
        let df = cleaned_season();
        let spread = Aggregator::points_spread_by_position(&df, 10);

        // Every P1 here pays 25 points, so its box collapses to a point.
        let p1 = spread.iter().find(|(p, _)| *p == 1).unwrap();
        assert_eq!(p1.1.median, 25.0);
        assert_eq!(p1.1.q1, 25.0);
        assert_eq!(p1.1.whisker_high, 25.0);

        // Null positions land in no box and empty positions are dropped.
        assert!(spread.iter().all(|(p, _)| [1, 2, 3].contains(p)));
    }

    #[test]
    fn test_box_stats_whiskers_exclude_outliers() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 100.0];
        let stats = Aggregator::box_stats(&sorted);

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        // 100 sits beyond 1.5 IQR of q3, so the whisker stops at 4.
        assert_eq!(stats.whisker_high, 4.0);
        assert_eq!(stats.whisker_low, 1.0);
    }

    #[test]
    fn test_scatter_pairs_and_pearson() {
        let df = cleaned_season();
        let pairs = Aggregator::scatter_pairs(&df, COL_STARTING_GRID, COL_POSITION);
        // One row has a null position.
        assert_eq!(pairs.len(), 5);

        let perfect: Vec<[f64; 2]> = (1..=5).map(|i| [i as f64, 2.0 * i as f64]).collect();
        let r = Aggregator::pearson(&perfect).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        assert!(Aggregator::pearson(&[[1.0, 1.0]]).is_none());
        assert!(Aggregator::pearson(&[[1.0, 1.0], [1.0, 2.0]]).is_none());
    }

    #[test]
    fn test_points_matrix_layout() {
        let df = cleaned_season();
        let matrix = Aggregator::points_matrix(&df, 2);

        assert_eq!(matrix.drivers, vec!["Max".to_string(), "Lando".to_string()]);
        assert_eq!(
            matrix.tracks,
            vec![
                "Bahrain".to_string(),
                "Jeddah".to_string(),
                "Suzuka".to_string()
            ]
        );
        assert_eq!(matrix.values[0], vec![25.0, 25.0, 25.0]);
        assert_eq!(matrix.values[1], vec![18.0, 0.0, 0.0]);
    }

    #[test]
    fn test_track_points_in_calendar_order() {
        let df = cleaned_season();
        let by_track = Aggregator::sum_by_in_order(&df, COL_TRACK, COL_POINTS);
        assert_eq!(
            by_track,
            vec![
                ("Bahrain".to_string(), 43.0),
                ("Jeddah".to_string(), 40.0),
                ("Suzuka".to_string(), 25.0)
            ]
        );
    }
}
