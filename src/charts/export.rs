//! Report Exporter Module
//! Renders every panel of every section to PNG files with plotters.

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{BoxSeries, Panel, PanelData, ScatterSeries, SectionContent, SectionId};
use crate::stats::HeatmapMatrix;

const IMAGE_WIDTH: u32 = 1000;
const IMAGE_HEIGHT: u32 = 700;

const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(243, 156, 18),
];

/// Writes section charts as a PNG report into a directory.
pub struct ReportExporter;

impl ReportExporter {
    /// Export all chart panels; returns the number of files written.
    /// Tables have no static rendering and are skipped.
    pub fn export_all(
        sections: &HashMap<SectionId, SectionContent>,
        dir: &Path,
    ) -> Result<usize> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;

        let mut written = 0usize;
        for (section_idx, id) in SectionId::ALL.iter().enumerate() {
            let Some(content) = sections.get(id) else {
                continue;
            };
            for (panel_idx, panel) in content.panels.iter().enumerate() {
                if matches!(panel.data, PanelData::Table { .. }) {
                    continue;
                }
                let path = dir.join(format!(
                    "{:02}_{:02}_{}.png",
                    section_idx + 1,
                    panel_idx + 1,
                    slug(&panel.title)
                ));
                Self::export_panel(panel, &path)?;
                written += 1;
            }
        }

        info!(files = written, dir = %dir.display(), "report exported");
        Ok(written)
    }

    fn export_panel(panel: &Panel, path: &PathBuf) -> Result<()> {
        let root = BitMapBackend::new(path, (IMAGE_WIDTH, IMAGE_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("fill failed: {e}"))?;

        match &panel.data {
            PanelData::Bars(pairs) | PanelData::BarsH(pairs) => {
                Self::draw_bars(&root, panel, pairs)?
            }
            // Pie slices export as a ranked bar chart.
            PanelData::Pie(pairs) => Self::draw_bars(&root, panel, pairs)?,
            PanelData::Histogram(bins) => {
                let pairs: Vec<(String, f64)> = bins
                    .iter()
                    .map(|(bin, count)| (bin.to_string(), *count as f64))
                    .collect();
                Self::draw_bars(&root, panel, &pairs)?
            }
            PanelData::Boxes(series) => Self::draw_boxes(&root, panel, series)?,
            PanelData::Line { points, labels } => Self::draw_line(&root, panel, points, labels)?,
            PanelData::Scatter { series, .. } => Self::draw_scatter(&root, panel, series)?,
            PanelData::Heatmap(matrix) => Self::draw_heatmap(&root, panel, matrix)?,
            PanelData::Table { .. } => {}
        }

        root.present()
            .map_err(|e| anyhow!("writing {} failed: {e}", path.display()))?;
        Ok(())
    }

    fn draw_bars(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        panel: &Panel,
        pairs: &[(String, f64)],
    ) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let labels: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
        let n = pairs.len();

        let mut chart = ChartBuilder::on(root)
            .caption(&panel.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), bar_axis_range(pairs))
            .map_err(|e| anyhow!("chart build failed: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| {
                let idx = x.round();
                if idx >= 0.0 && (idx as usize) < n && (x - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
            .y_desc(panel.y_label.clone())
            .draw()
            .map_err(|e| anyhow!("mesh draw failed: {e}"))?;

        chart
            .draw_series(pairs.iter().enumerate().map(|(i, (_, v))| {
                let color = SERIES_COLORS[i % SERIES_COLORS.len()];
                Rectangle::new(
                    [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, *v)],
                    color.filled(),
                )
            }))
            .map_err(|e| anyhow!("bar draw failed: {e}"))?;
        Ok(())
    }

    fn draw_boxes(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        panel: &Panel,
        series: &[BoxSeries],
    ) -> Result<()> {
        let Some(max_position) = series
            .iter()
            .flat_map(|s| s.boxes.iter())
            .map(|(p, _)| *p)
            .max()
        else {
            return Ok(());
        };
        let max_y = series
            .iter()
            .flat_map(|s| s.boxes.iter())
            .map(|(_, b)| b.whisker_high)
            .fold(1.0f64, f64::max);

        let mut chart = ChartBuilder::on(root)
            .caption(&panel.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0.5..max_position as f64 + 0.5, 0.0..max_y * 1.1)
            .map_err(|e| anyhow!("chart build failed: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(panel.x_label.clone())
            .y_desc(panel.y_label.clone())
            .draw()
            .map_err(|e| anyhow!("mesh draw failed: {e}"))?;

        let k = series.len().max(1);
        let width = 0.8 / k as f64;
        for (i, s) in series.iter().enumerate() {
            let offset = (i as f64 - (k as f64 - 1.0) / 2.0) * width;
            let half = width * 0.45;
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];

            chart
                .draw_series(s.boxes.iter().map(|(position, b)| {
                    let x = *position as f64 + offset;
                    Rectangle::new([(x - half, b.q1), (x + half, b.q3)], color.mix(0.4).filled())
                }))
                .map_err(|e| anyhow!("box draw failed: {e}"))?
                .label(s.name.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled())
                });

            chart
                .draw_series(s.boxes.iter().flat_map(|(position, b)| {
                    let x = *position as f64 + offset;
                    vec![
                        PathElement::new(
                            vec![(x - half, b.median), (x + half, b.median)],
                            color.stroke_width(2),
                        ),
                        PathElement::new(
                            vec![(x, b.q3), (x, b.whisker_high)],
                            color.stroke_width(1),
                        ),
                        PathElement::new(
                            vec![(x, b.q1), (x, b.whisker_low)],
                            color.stroke_width(1),
                        ),
                    ]
                }))
                .map_err(|e| anyhow!("whisker draw failed: {e}"))?;
        }

        chart
            .configure_series_labels()
            .border_style(BLACK.stroke_width(1))
            .background_style(WHITE.mix(0.8).filled())
            .draw()
            .map_err(|e| anyhow!("legend draw failed: {e}"))?;
        Ok(())
    }

    fn draw_line(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        panel: &Panel,
        points: &[[f64; 2]],
        labels: &[String],
    ) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let max = points.iter().map(|p| p[1]).fold(0.0f64, f64::max).max(1.0);
        let n = labels.len();
        let labels = labels.to_vec();

        let mut chart = ChartBuilder::on(root)
            .caption(&panel.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0.0..max * 1.1)
            .map_err(|e| anyhow!("chart build failed: {e}"))?;

        chart
            .configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| {
                let idx = x.round();
                if idx >= 0.0 && (idx as usize) < n && (x - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
            .y_desc(panel.y_label.clone())
            .draw()
            .map_err(|e| anyhow!("mesh draw failed: {e}"))?;

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p[0], p[1])),
                SERIES_COLORS[0].stroke_width(2),
            ))
            .map_err(|e| anyhow!("line draw failed: {e}"))?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p[0], p[1]), 4, SERIES_COLORS[0].filled())),
            )
            .map_err(|e| anyhow!("point draw failed: {e}"))?;
        Ok(())
    }

    fn draw_scatter(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        panel: &Panel,
        series: &[ScatterSeries],
    ) -> Result<()> {
        let all: Vec<[f64; 2]> = series.iter().flat_map(|s| s.points.clone()).collect();
        if all.is_empty() {
            return Ok(());
        }
        let max_x = all.iter().map(|p| p[0]).fold(1.0f64, f64::max);
        let max_y = all.iter().map(|p| p[1]).fold(1.0f64, f64::max);

        let mut chart = ChartBuilder::on(root)
            .caption(&panel.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..max_x * 1.05, 0.0..max_y * 1.05)
            .map_err(|e| anyhow!("chart build failed: {e}"))?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.clone())
            .y_desc(panel.y_label.clone())
            .draw()
            .map_err(|e| anyhow!("mesh draw failed: {e}"))?;

        for (i, s) in series.iter().enumerate() {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(|p| Circle::new((p[0], p[1]), 3, color.mix(0.6).filled())),
                )
                .map_err(|e| anyhow!("scatter draw failed: {e}"))?
                .label(s.name.clone())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK.stroke_width(1))
            .background_style(WHITE.mix(0.8).filled())
            .draw()
            .map_err(|e| anyhow!("legend draw failed: {e}"))?;
        Ok(())
    }

    fn draw_heatmap(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        panel: &Panel,
        matrix: &HeatmapMatrix,
    ) -> Result<()> {
        if matrix.drivers.is_empty() || matrix.tracks.is_empty() {
            return Ok(());
        }
        let max = matrix
            .values
            .iter()
            .flatten()
            .copied()
            .fold(1.0f64, f64::max);
        let n_tracks = matrix.tracks.len();
        let n_drivers = matrix.drivers.len();
        let tracks = matrix.tracks.clone();
        let drivers = matrix.drivers.clone();

        let mut chart = ChartBuilder::on(root)
            .caption(&panel.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(110)
            .build_cartesian_2d(
                -0.5f64..(n_tracks as f64 - 0.5),
                -0.5f64..(n_drivers as f64 - 0.5),
            )
            .map_err(|e| anyhow!("chart build failed: {e}"))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n_tracks)
            .y_labels(n_drivers)
            .x_label_formatter(&|x| index_label(*x, &tracks))
            .y_label_formatter(&|y| {
                // Best driver on the top row.
                let flipped = (n_drivers as f64 - 1.0) - *y;
                index_label(flipped, &drivers)
            })
            .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
            .draw()
            .map_err(|e| anyhow!("mesh draw failed: {e}"))?;

        chart
            .draw_series(matrix.values.iter().enumerate().flat_map(|(row, values)| {
                let y = (n_drivers - 1 - row) as f64;
                values.iter().enumerate().map(move |(col, &value)| {
                    let x = col as f64;
                    let t = (value / max) as f32;
                    let color = RGBColor(
                        255,
                        (237.0 - t * 200.0).max(0.0) as u8,
                        (160.0 - t * 130.0).max(0.0) as u8,
                    );
                    Rectangle::new(
                        [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                        color.filled(),
                    )
                })
            }))
            .map_err(|e| anyhow!("heatmap draw failed: {e}"))?;
        Ok(())
    }
}

/// Y-axis span for bar panels. The floor drops below zero when any bar is
/// negative so position-loss bars stay visible.
fn bar_axis_range(pairs: &[(String, f64)]) -> std::ops::Range<f64> {
    let max = pairs.iter().map(|(_, v)| *v).fold(0.0f64, f64::max).max(1.0);
    let min = pairs.iter().map(|(_, v)| *v).fold(0.0f64, f64::min);
    min * 1.1..max * 1.1
}

fn index_label(value: f64, labels: &[String]) -> String {
    let idx = value.round();
    if idx >= 0.0 && (idx as usize) < labels.len() && (value - idx).abs() < 1e-6 {
        labels[idx as usize].clone()
    } else {
        String::new()
    }
}

fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_underscore = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_axis_range_covers_negative_values() {
        let mixed = vec![("A".to_string(), -1.5), ("B".to_string(), 0.8)];
        let range = bar_axis_range(&mixed);
        assert!(range.start <= -1.5);
        assert!(range.end >= 1.0);

        // All bars negative still leaves headroom above zero.
        let losses = vec![("A".to_string(), -2.0), ("B".to_string(), -0.5)];
        let range = bar_axis_range(&losses);
        assert!(range.start <= -2.0);
        assert!(range.end >= 1.0);

        let gains = vec![("A".to_string(), 3.0)];
        let range = bar_axis_range(&gains);
        assert_eq!(range.start, 0.0);
        assert!(range.end >= 3.0);
    }

    #[test]
    fn test_export_writes_panel_with_position_losses() {
        let dir = tempfile::tempdir().unwrap();
        let panel = Panel {
            title: "Average Positions Gained/Lost - 2024".to_string(),
            x_label: "Average Position Change".to_string(),
            y_label: "Driver".to_string(),
            data: PanelData::BarsH(vec![
                ("Max".to_string(), 2.4),
                ("Lando".to_string(), -1.5),
            ]),
        };
        let content = SectionContent {
            id: SectionId::AdvancedAnalytics,
            panels: vec![panel],
        };
        let mut sections = HashMap::new();
        sections.insert(SectionId::AdvancedAnalytics, content);

        let written = ReportExporter::export_all(&sections, dir.path()).unwrap();
        assert_eq!(written, 1);

        let path = dir
            .path()
            .join("06_01_average_positions_gained_lost_2024.png");
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_slug_flattens_punctuation() {
        assert_eq!(
            slug("Top 10 Drivers by Points - 2024"),
            "top_10_drivers_by_points_2024"
        );
        assert_eq!(slug("DNF Rate by Track (%) - 2024"), "dnf_rate_by_track_2024");
    }
}
