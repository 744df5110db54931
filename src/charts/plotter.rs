//! Section Plotter Module
//! Renders any panel from its declarative data using egui_plot.

use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, LineStyle, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use super::{BoxSeries, Panel, PanelData, ScatterSeries};
use crate::stats::HeatmapMatrix;

/// Chart height inside a card.
const CHART_HEIGHT: f32 = 280.0;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

pub fn palette_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Draws panels from their declarative chart data.
pub struct SectionPlotter;

impl SectionPlotter {
    /// Draw one panel. `plot_id` must be unique within the open section.
    pub fn draw_panel(ui: &mut egui::Ui, panel: &Panel, plot_id: &str) {
        match &panel.data {
            PanelData::BarsH(pairs) => Self::draw_bars_h(ui, panel, plot_id, pairs),
            PanelData::Bars(pairs) => Self::draw_bars(ui, panel, plot_id, pairs),
            PanelData::Pie(pairs) => Self::draw_pie(ui, plot_id, pairs),
            PanelData::Line { points, labels } => {
                Self::draw_line(ui, panel, plot_id, points, labels)
            }
            PanelData::Scatter { series, diagonal } => {
                Self::draw_scatter(ui, panel, plot_id, series, *diagonal)
            }
            PanelData::Histogram(bins) => Self::draw_histogram(ui, panel, plot_id, bins),
            PanelData::Boxes(series) => Self::draw_boxes(ui, panel, plot_id, series),
            PanelData::Heatmap(matrix) => Self::draw_heatmap(ui, plot_id, matrix),
            PanelData::Table { headers, rows } => Self::draw_table(ui, plot_id, headers, rows),
        }
    }

    fn draw_bars_h(ui: &mut egui::Ui, panel: &Panel, plot_id: &str, pairs: &[(String, f64)]) {
        let labels: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
        // Best entry on top.
        let bars: Vec<Bar> = pairs
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                Bar::new((pairs.len() - 1 - i) as f64, *value)
                    .width(0.6)
                    .fill(palette_color(i))
                    .name(label)
            })
            .collect();

        let n = pairs.len();
        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(&panel.x_label)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < n && (mark.value - idx).abs() < 1e-6 {
                    labels[n - 1 - idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
            });
    }

    fn draw_bars(ui: &mut egui::Ui, panel: &Panel, plot_id: &str, pairs: &[(String, f64)]) {
        let labels: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
        let bars: Vec<Bar> = pairs
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                Bar::new(i as f64, *value)
                    .width(0.6)
                    .fill(palette_color(i))
                    .name(label)
            })
            .collect();

        let n = pairs.len();
        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .y_axis_label(&panel.y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < n && (mark.value - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    fn draw_pie(ui: &mut egui::Ui, plot_id: &str, pairs: &[(String, f64)]) {
        let total: f64 = pairs.iter().map(|(_, v)| v.max(0.0)).sum();
        if total <= 0.0 {
            ui.label(RichText::new("No data").size(14.0));
            return;
        }

        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .data_aspect(1.0)
            .allow_scroll(false)
            .show_axes([false, false])
            .show_grid(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut angle = std::f64::consts::FRAC_PI_2; // Start at 12 o'clock
                for (i, (label, value)) in pairs.iter().enumerate() {
                    let share = value.max(0.0) / total;
                    if share == 0.0 {
                        continue;
                    }
                    let sweep = share * std::f64::consts::TAU;
                    let slice = Self::pie_slice(angle, sweep);
                    let color = palette_color(i);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(slice))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(Stroke::new(1.0, color))
                            .name(format!("{} ({:.1}%)", label, share * 100.0)),
                    );
                    angle -= sweep;
                }
            });
    }

    /// Triangle-fan outline of a pie slice on the unit circle.
    fn pie_slice(start: f64, sweep: f64) -> Vec<[f64; 2]> {
        let steps = ((sweep / std::f64::consts::TAU) * 64.0).ceil().max(2.0) as usize;
        let mut outline = vec![[0.0, 0.0]];
        for i in 0..=steps {
            let a = start - sweep * (i as f64 / steps as f64);
            outline.push([a.cos(), a.sin()]);
        }
        outline
    }

    fn draw_line(
        ui: &mut egui::Ui,
        panel: &Panel,
        plot_id: &str,
        points: &[[f64; 2]],
        labels: &[String],
    ) {
        let labels = labels.to_vec();
        let n = labels.len();
        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .y_axis_label(&panel.y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < n && (mark.value - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(palette_color(0))
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(palette_color(0)),
                );
            });
    }

    fn draw_scatter(
        ui: &mut egui::Ui,
        panel: &Panel,
        plot_id: &str,
        series: &[ScatterSeries],
        diagonal: bool,
    ) {
        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(&panel.x_label)
            .y_axis_label(&panel.y_label)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .radius(3.0)
                            .color(palette_color(i).gamma_multiply(0.7))
                            .name(&s.name),
                    );
                }

                if diagonal {
                    let max = series
                        .iter()
                        .flat_map(|s| s.points.iter())
                        .flat_map(|p| [p[0], p[1]])
                        .fold(1.0f64, f64::max);
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![[1.0, 1.0], [max, max]]))
                            .color(Color32::GRAY)
                            .style(LineStyle::dashed_loose())
                            .width(1.0),
                    );
                }
            });
    }

    fn draw_histogram(ui: &mut egui::Ui, panel: &Panel, plot_id: &str, bins: &[(u32, usize)]) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|(bin, count)| {
                Bar::new(*bin as f64, *count as f64)
                    .width(0.9)
                    .fill(palette_color(0).gamma_multiply(0.8))
            })
            .collect();

        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(&panel.x_label)
            .y_axis_label(&panel.y_label)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    fn draw_boxes(ui: &mut egui::Ui, panel: &Panel, plot_id: &str, series: &[BoxSeries]) {
        let k = series.len().max(1);
        // Side-by-side boxes per position, one per season.
        let width = 0.8 / k as f64;

        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(&panel.x_label)
            .y_axis_label(&panel.y_label)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let offset = (i as f64 - (k as f64 - 1.0) / 2.0) * width;
                    let color = palette_color(i);
                    let boxes: Vec<BoxElem> = s
                        .boxes
                        .iter()
                        .map(|(position, stats)| {
                            BoxElem::new(
                                *position as f64 + offset,
                                BoxSpread::new(
                                    stats.whisker_low,
                                    stats.q1,
                                    stats.median,
                                    stats.q3,
                                    stats.whisker_high,
                                ),
                            )
                            .box_width(width * 0.9)
                            .whisker_width(width * 0.5)
                            .fill(color.gamma_multiply(0.4))
                            .stroke(Stroke::new(1.0, color))
                        })
                        .collect();
                    plot_ui.box_plot(BoxPlot::new(boxes).name(&s.name));
                }
            });
    }

    fn draw_heatmap(ui: &mut egui::Ui, plot_id: &str, matrix: &HeatmapMatrix) {
        if matrix.drivers.is_empty() || matrix.tracks.is_empty() {
            ui.label(RichText::new("No data").size(14.0));
            return;
        }

        let max = matrix
            .values
            .iter()
            .flatten()
            .copied()
            .fold(1.0f64, f64::max);

        let drivers = matrix.drivers.clone();
        let tracks = matrix.tracks.clone();
        let n_drivers = drivers.len();
        let n_tracks = tracks.len();

        Plot::new(plot_id.to_string())
            .height(CHART_HEIGHT + 60.0)
            .allow_scroll(false)
            .show_grid(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < n_tracks && (mark.value - idx).abs() < 1e-6 {
                    tracks[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < n_drivers && (mark.value - idx).abs() < 1e-6 {
                    drivers[n_drivers - 1 - idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (row, values) in matrix.values.iter().enumerate() {
                    // Best driver on the top row.
                    let y = (n_drivers - 1 - row) as f64;
                    for (col, &value) in values.iter().enumerate() {
                        let x = col as f64;
                        let cell = vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(cell))
                                .fill_color(Self::heat_color(value / max))
                                .stroke(Stroke::new(0.5, Color32::from_gray(60))),
                        );
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(x, y),
                                RichText::new(format!("{:.0}", value)).size(10.0),
                            )
                            .color(if value / max > 0.5 {
                                Color32::WHITE
                            } else {
                                Color32::DARK_GRAY
                            }),
                        );
                    }
                }
            });
    }

    /// Yellow-to-red ramp, like the original YlOrRd colormap.
    fn heat_color(t: f64) -> Color32 {
        let t = t.clamp(0.0, 1.0) as f32;
        let r = 255.0;
        let g = 237.0 - t * 200.0;
        let b = 160.0 - t * 130.0;
        Color32::from_rgb(r as u8, g.max(0.0) as u8, b.max(0.0) as u8)
    }

    fn draw_table(ui: &mut egui::Ui, plot_id: &str, headers: &[String], rows: &[Vec<String>]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(plot_id))
                    .striped(true)
                    .min_col_width(90.0)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        for header in headers {
                            ui.label(RichText::new(header).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            for (i, cell) in row.iter().enumerate() {
                                if i == 0 {
                                    ui.label(RichText::new(cell).strong().size(12.0));
                                } else {
                                    ui.label(RichText::new(cell).size(12.0));
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
