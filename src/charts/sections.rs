//! Section Registry Module
//! Declarative description of the seven dashboard sections and the builder
//! that fills them from the two cleaned season tables.
//!
//! One parameterized renderer consumes these descriptions instead of
//! per-section plotting code; adding a section means adding a builder arm
//! here, nothing else.

use rayon::prelude::*;
use std::collections::HashMap;

use crate::data::{
    COL_DRIVER, COL_POINTS, COL_POSITION, COL_STARTING_GRID, COL_TEAM, COL_TRACK, SeasonPair,
};
use crate::stats::{Aggregator, BoxStats, HeatmapMatrix, SeasonSummary};

/// The seven display sections, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    DriverPerformance,
    TeamPerformance,
    TrackAnalysis,
    PerformanceHeatmaps,
    PositionAnalysis,
    AdvancedAnalytics,
    SeasonSummaries,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::DriverPerformance,
        SectionId::TeamPerformance,
        SectionId::TrackAnalysis,
        SectionId::PerformanceHeatmaps,
        SectionId::PositionAnalysis,
        SectionId::AdvancedAnalytics,
        SectionId::SeasonSummaries,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionId::DriverPerformance => "Driver Performance",
            SectionId::TeamPerformance => "Team Performance",
            SectionId::TrackAnalysis => "Track Analysis",
            SectionId::PerformanceHeatmaps => "Performance Heatmaps",
            SectionId::PositionAnalysis => "Position Analysis",
            SectionId::AdvancedAnalytics => "Advanced Analytics",
            SectionId::SeasonSummaries => "Season Summary",
        }
    }

    pub fn sidebar_label(&self) -> &'static str {
        match self {
            SectionId::DriverPerformance => "🏆 Driver Performance",
            SectionId::TeamPerformance => "🏎 Team Performance",
            SectionId::TrackAnalysis => "🏁 Track Analysis",
            SectionId::PerformanceHeatmaps => "🔥 Performance Heatmaps",
            SectionId::PositionAnalysis => "📊 Position Analysis",
            SectionId::AdvancedAnalytics => "📈 Advanced Analytics",
            SectionId::SeasonSummaries => "📋 Season Summary",
        }
    }
}

/// One named scatter series.
#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// One season's boxes in a grouped box-and-whisker panel, keyed by
/// finishing position.
#[derive(Debug, Clone)]
pub struct BoxSeries {
    pub name: String,
    pub boxes: Vec<(u32, BoxStats)>,
}

/// Chart data for one panel, renderer-agnostic.
#[derive(Debug, Clone)]
pub enum PanelData {
    /// Horizontal bars, best first.
    BarsH(Vec<(String, f64)>),
    /// Vertical bars with category labels.
    Bars(Vec<(String, f64)>),
    /// Share-of-total pie slices.
    Pie(Vec<(String, f64)>),
    /// Connected line; `labels` name the x positions (race calendar).
    Line {
        points: Vec<[f64; 2]>,
        labels: Vec<String>,
    },
    /// One or more scatter series; `diagonal` draws the y = x reference.
    Scatter {
        series: Vec<ScatterSeries>,
        diagonal: bool,
    },
    /// Finishing-position frequencies.
    Histogram(Vec<(u32, usize)>),
    /// Grouped box-and-whisker summaries, one series per season.
    Boxes(Vec<BoxSeries>),
    /// Driver x track matrix.
    Heatmap(HeatmapMatrix),
    /// Key/value comparison table.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// One chart card: title, axis labels and its data.
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: PanelData,
}

impl Panel {
    fn new(title: String, x_label: &str, y_label: &str, data: PanelData) -> Self {
        Self {
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            data,
        }
    }
}

/// A fully built section, ready to render. Not `Clone`: the view draws
/// panels by reference every frame.
#[derive(Debug)]
pub struct SectionContent {
    pub id: SectionId,
    pub panels: Vec<Panel>,
}

const TOP_DRIVERS: usize = 10;
const TOP_POSITIONS: u32 = 10;
const HEATMAP_DRIVERS: usize = 8;

/// Builds section content from the cleaned season pair.
pub struct SectionBuilder;

impl SectionBuilder {
    /// Build all seven sections in parallel.
    pub fn build_all(pair: &SeasonPair) -> HashMap<SectionId, SectionContent> {
        SectionId::ALL
            .par_iter()
            .map(|id| (*id, Self::build(*id, pair)))
            .collect()
    }

    pub fn build(id: SectionId, pair: &SeasonPair) -> SectionContent {
        let panels = match id {
            SectionId::DriverPerformance => Self::driver_performance(pair),
            SectionId::TeamPerformance => Self::team_performance(pair),
            SectionId::TrackAnalysis => Self::track_analysis(pair),
            SectionId::PerformanceHeatmaps => Self::heatmaps(pair),
            SectionId::PositionAnalysis => Self::position_analysis(pair),
            SectionId::AdvancedAnalytics => Self::advanced_analytics(pair),
            SectionId::SeasonSummaries => Self::season_summaries(pair),
        };
        SectionContent { id, panels }
    }

    fn driver_performance(pair: &SeasonPair) -> Vec<Panel> {
        let mut panels = Vec::new();
        for (year, df) in pair.seasons() {
            let top = take(Aggregator::sum_by(df, COL_DRIVER, COL_POINTS), TOP_DRIVERS);
            panels.push(Panel::new(
                format!("Top 10 Drivers by Points - {}", year),
                "Total Points",
                "Driver",
                PanelData::BarsH(top),
            ));
        }
        for (year, df) in pair.seasons() {
            let wins = take(Aggregator::wins_by_driver(df), TOP_DRIVERS);
            panels.push(Panel::new(
                format!("Race Wins - {}", year),
                "Driver",
                "Number of Wins",
                PanelData::Bars(wins),
            ));
        }
        panels
    }

    fn team_performance(pair: &SeasonPair) -> Vec<Panel> {
        let mut panels = Vec::new();
        for (year, df) in pair.seasons() {
            panels.push(Panel::new(
                format!("Team Points Distribution - {}", year),
                "",
                "",
                PanelData::Pie(Aggregator::sum_by(df, COL_TEAM, COL_POINTS)),
            ));
        }
        for (year, df) in pair.seasons() {
            panels.push(Panel::new(
                format!("Podium Finishes by Team - {}", year),
                "Team",
                "Podiums",
                PanelData::Bars(Aggregator::podiums_by_team(df)),
            ));
        }
        panels
    }

    fn track_analysis(pair: &SeasonPair) -> Vec<Panel> {
        let mut panels = Vec::new();
        for (year, df) in pair.seasons() {
            let by_track = Aggregator::sum_by_in_order(df, COL_TRACK, COL_POINTS);
            let labels: Vec<String> = by_track.iter().map(|(t, _)| t.clone()).collect();
            let points: Vec<[f64; 2]> = by_track
                .iter()
                .enumerate()
                .map(|(i, (_, v))| [i as f64, *v])
                .collect();
            panels.push(Panel::new(
                format!("Points Distribution by Track - {}", year),
                "Race Number",
                "Total Points Awarded",
                PanelData::Line { points, labels },
            ));
        }
        for (year, df) in pair.seasons() {
            let dnfs = take(Aggregator::dnf_counts_by_driver(df), TOP_DRIVERS);
            panels.push(Panel::new(
                format!("DNF (Did Not Finish) Count - {}", year),
                "Driver",
                "Number of DNFs",
                PanelData::Bars(dnfs),
            ));
        }
        panels.push(Panel::new(
            format!("DNF Rate by Track (%) - {}", pair.year_a),
            "Track",
            "DNF Percentage",
            PanelData::Bars(Aggregator::dnf_rate_by_track(&pair.table_a)),
        ));
        panels
    }

    fn heatmaps(pair: &SeasonPair) -> Vec<Panel> {
        pair.seasons()
            .into_iter()
            .map(|(year, df)| {
                Panel::new(
                    format!(
                        "Driver Performance by Track - {} (Top {} Drivers)",
                        year, HEATMAP_DRIVERS
                    ),
                    "Track",
                    "Driver",
                    PanelData::Heatmap(Aggregator::points_matrix(df, HEATMAP_DRIVERS)),
                )
            })
            .collect()
    }

    fn position_analysis(pair: &SeasonPair) -> Vec<Panel> {
        let mut panels = Vec::new();
        for (year, df) in pair.seasons() {
            panels.push(Panel::new(
                format!("Position Distribution - {}", year),
                "Finishing Position",
                "Frequency",
                PanelData::Histogram(Aggregator::position_histogram(df)),
            ));
        }

        let boxes: Vec<BoxSeries> = pair
            .seasons()
            .into_iter()
            .map(|(year, df)| BoxSeries {
                name: year.to_string(),
                boxes: Aggregator::points_spread_by_position(df, TOP_POSITIONS),
            })
            .filter(|s| !s.boxes.is_empty())
            .collect();
        if !boxes.is_empty() {
            panels.push(Panel::new(
                format!("Points Distribution by Position (Top {})", TOP_POSITIONS),
                "Finishing Position",
                "Points Scored",
                PanelData::Boxes(boxes),
            ));
        }

        let series: Vec<ScatterSeries> = pair
            .seasons()
            .into_iter()
            .map(|(year, df)| ScatterSeries {
                name: year.to_string(),
                points: Aggregator::scatter_pairs(df, COL_STARTING_GRID, COL_POSITION),
            })
            .filter(|s| !s.points.is_empty())
            .collect();
        if !series.is_empty() {
            panels.push(Panel::new(
                "Starting Grid vs Finishing Position".to_string(),
                "Starting Grid Position",
                "Finishing Position",
                PanelData::Scatter {
                    series,
                    diagonal: true,
                },
            ));
        }
        panels
    }

    fn advanced_analytics(pair: &SeasonPair) -> Vec<Panel> {
        let mut panels = Vec::new();
        for (year, df) in pair.seasons() {
            let consistent = take(Aggregator::std_by(df, COL_DRIVER, COL_POSITION), TOP_DRIVERS);
            panels.push(Panel::new(
                format!("Most Consistent Drivers {} (Lower = More Consistent)", year),
                "Position Standard Deviation",
                "Driver",
                PanelData::BarsH(consistent),
            ));
        }
        for (year, df) in pair.seasons() {
            let best_avg = take(Aggregator::mean_by(df, COL_DRIVER, COL_POSITION), TOP_DRIVERS);
            panels.push(Panel::new(
                format!("Best Average Finishing Position - {}", year),
                "Driver",
                "Average Position",
                PanelData::Bars(best_avg),
            ));
        }

        let gained = take(
            Aggregator::positions_gained_by_driver(&pair.table_a),
            TOP_DRIVERS,
        );
        if !gained.is_empty() {
            panels.push(Panel::new(
                format!("Average Positions Gained/Lost - {}", pair.year_a),
                "Average Position Change",
                "Driver",
                PanelData::BarsH(gained),
            ));
        }

        let quali = Aggregator::scatter_pairs(&pair.table_a, COL_STARTING_GRID, COL_POINTS);
        if !quali.is_empty() {
            let title = match Aggregator::pearson(&quali) {
                Some(r) => format!(
                    "Qualifying vs Points - {} (Correlation: {:.3})",
                    pair.year_a, r
                ),
                None => format!("Qualifying vs Points - {}", pair.year_a),
            };
            panels.push(Panel::new(
                title,
                "Starting Grid Position",
                "Points Scored",
                PanelData::Scatter {
                    series: vec![ScatterSeries {
                        name: pair.year_a.to_string(),
                        points: quali,
                    }],
                    diagonal: false,
                },
            ));
        }
        panels
    }

    fn season_summaries(pair: &SeasonPair) -> Vec<Panel> {
        let summaries: Vec<SeasonSummary> = pair
            .seasons()
            .into_iter()
            .map(|(year, df)| SeasonSummary::compute(year, df))
            .collect();

        let headers = {
            let mut h = vec![String::new()];
            h.extend(summaries.iter().map(|s| format!("{} Season", s.year)));
            h
        };

        let fmt_pair = |v: &Option<(String, f64)>| match v {
            Some((name, n)) => format!("{} ({:.0})", name, n),
            None => "-".to_string(),
        };

        let rows = vec![
            row("Total Races", &summaries, |s| s.races.to_string()),
            row("Total Drivers", &summaries, |s| s.drivers.to_string()),
            row("Total Teams", &summaries, |s| s.teams.to_string()),
            row("Most Wins", &summaries, |s| fmt_pair(&s.most_wins)),
            row("Points Leader", &summaries, |s| fmt_pair(&s.points_leader)),
        ];

        let mut panels = vec![Panel::new(
            "Season Comparison".to_string(),
            "",
            "",
            PanelData::Table { headers, rows },
        )];

        // Top 5 drivers side by side.
        let tops: Vec<(i32, Vec<(String, f64)>)> = pair
            .seasons()
            .into_iter()
            .map(|(year, df)| (year, take(Aggregator::sum_by(df, COL_DRIVER, COL_POINTS), 5)))
            .collect();
        let depth = tops.iter().map(|(_, t)| t.len()).max().unwrap_or(0);

        let mut headers = vec!["#".to_string()];
        for (year, _) in &tops {
            headers.push(format!("{} Driver", year));
            headers.push(format!("{} Points", year));
        }

        let rows: Vec<Vec<String>> = (0..depth)
            .map(|i| {
                let mut row = vec![format!("{}", i + 1)];
                for (_, top) in &tops {
                    match top.get(i) {
                        Some((driver, points)) => {
                            row.push(driver.clone());
                            row.push(format!("{:.0}", points));
                        }
                        None => {
                            row.push("-".to_string());
                            row.push("-".to_string());
                        }
                    }
                }
                row
            })
            .collect();

        panels.push(Panel::new(
            "Top 5 Drivers Points Comparison".to_string(),
            "",
            "",
            PanelData::Table { headers, rows },
        ));
        panels
    }
}

fn take(mut pairs: Vec<(String, f64)>, n: usize) -> Vec<(String, f64)> {
    pairs.truncate(n);
    pairs
}

fn row(
    label: &str,
    summaries: &[SeasonSummary],
    f: impl Fn(&SeasonSummary) -> String,
) -> Vec<String> {
    let mut row = vec![label.to_string()];
    row.extend(summaries.iter().map(f));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{COL_POSITION_ORIGINAL, COL_TIME_RETIRED};
    use polars::prelude::*;

    fn pair() -> SeasonPair {
        let table = DataFrame::new(vec![
            Column::new(COL_DRIVER.into(), vec!["Max", "Lando", "Max", "Lando"]),
            Column::new(COL_TEAM.into(), vec!["RBR", "McLaren", "RBR", "McLaren"]),
            Column::new(
                COL_TRACK.into(),
                vec!["Bahrain", "Bahrain", "Jeddah", "Jeddah"],
            ),
            Column::new(
                COL_POSITION.into(),
                vec![Some(1.0), Some(2.0), Some(1.0), None],
            ),
            Column::new(
                COL_POSITION_ORIGINAL.into(),
                vec!["1", "2", "1", "DNF"],
            ),
            Column::new(COL_POINTS.into(), vec![25.0, 18.0, 25.0, 0.0]),
            Column::new(
                COL_TIME_RETIRED.into(),
                vec!["1:30:00.000", "+2.1s", "1:28:00.000", "DNF"],
            ),
            Column::new(
                COL_STARTING_GRID.into(),
                vec![Some(1.0), Some(2.0), Some(2.0), Some(1.0)],
            ),
        ])
        .unwrap();

        SeasonPair {
            year_a: 2024,
            year_b: 2025,
            table_a: table.clone(),
            table_b: table,
        }
    }

    #[test]
    fn test_all_seven_sections_build_with_panels() {
        let sections = SectionBuilder::build_all(&pair());
        assert_eq!(sections.len(), 7);
        for id in SectionId::ALL {
            let content = sections.get(&id).unwrap();
            assert!(!content.panels.is_empty(), "{:?} built empty", id);
        }
    }

    #[test]
    fn test_driver_performance_panels() {
        let content = SectionBuilder::build(SectionId::DriverPerformance, &pair());
        assert_eq!(content.panels.len(), 4);
        let PanelData::BarsH(top) = &content.panels[0].data else {
            panic!("expected horizontal bars");
        };
        assert_eq!(top[0], ("Max".to_string(), 50.0));
    }

    #[test]
    fn test_summary_table_shape() {
        let content = SectionBuilder::build(SectionId::SeasonSummaries, &pair());
        let PanelData::Table { headers, rows } = &content.panels[0].data else {
            panic!("expected a table");
        };
        assert_eq!(headers.len(), 3);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][0], "Total Races");
        assert_eq!(rows[0][1], "2");
    }

    #[test]
    fn test_position_analysis_includes_points_boxes() {
        let content = SectionBuilder::build(SectionId::PositionAnalysis, &pair());
        let boxes = content
            .panels
            .iter()
            .find_map(|panel| match &panel.data {
                PanelData::Boxes(series) => Some(series),
                _ => None,
            })
            .expect("points-by-position boxes missing");

        // One series per season, boxes only for contested positions.
        assert_eq!(boxes.len(), 2);
        for series in boxes {
            assert!(series.boxes.iter().all(|(p, _)| (1..=10).contains(p)));
            let p1 = series.boxes.iter().find(|(p, _)| *p == 1).unwrap();
            assert_eq!(p1.1.median, 25.0);
        }
    }

    #[test]
    fn test_scatter_omitted_without_grid_column() {
        let mut p = pair();
        p.table_a = p.table_a.drop(COL_STARTING_GRID).unwrap();
        p.table_b = p.table_b.drop(COL_STARTING_GRID).unwrap();

        let content = SectionBuilder::build(SectionId::PositionAnalysis, &p);
        assert!(content
            .panels
            .iter()
            .all(|panel| !matches!(panel.data, PanelData::Scatter { .. })));
    }
}
