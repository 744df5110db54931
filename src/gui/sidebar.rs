//! Sidebar Widget
//! Left side panel with the section selector, data sources and actions.

use egui::{Color32, RichText};

use crate::charts::SectionId;
use crate::config::DashboardConfig;

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    BrowseSeasonA,
    BrowseSeasonB,
    Reload,
    ExportReport,
}

/// Left side panel: seven-section selector plus data source controls.
pub struct Sidebar {
    pub selected: SectionId,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            selected: SectionId::DriverPerformance,
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui, cfg: &DashboardConfig) -> SidebarAction {
        let mut action = SidebarAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏁 Podium")
                    .size(22.0)
                    .color(Color32::from_rgb(225, 6, 0)),
            );
            ui.label(
                RichText::new("Race Results Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Section Selector =====
        ui.label(RichText::new("📑 Sections").size(14.0).strong());
        ui.add_space(5.0);

        for id in SectionId::ALL {
            if ui
                .selectable_label(self.selected == id, id.sidebar_label())
                .clicked()
            {
                self.selected = id;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Sources =====
        ui.label(RichText::new("📁 Season Files").size(14.0).strong());
        ui.add_space(5.0);

        Self::source_row(ui, cfg.season_a.year, &cfg.season_a.path, &mut action, true);
        ui.add_space(5.0);
        Self::source_row(ui, cfg.season_b.year, &cfg.season_b.path, &mut action, false);

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let reload = egui::Button::new(RichText::new("⟳ Reload Data").size(15.0))
                .min_size(egui::vec2(180.0, 32.0));
            if ui.add(reload).clicked() {
                action = SidebarAction::Reload;
            }

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                let export = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(160.0, 28.0));
                if ui.add(export).clicked() {
                    action = SidebarAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") || self.status.contains("missing") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn source_row(
        ui: &mut egui::Ui,
        year: i32,
        path: &std::path::Path,
        action: &mut SidebarAction,
        is_a: bool,
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    let present = path.exists();

                    ui.label(RichText::new(format!("{}:", year)).size(12.0).strong());
                    ui.label(RichText::new(name).size(12.0).color(if present {
                        Color32::WHITE
                    } else {
                        Color32::from_rgb(220, 53, 69)
                    }));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂").clicked() {
                            *action = if is_a {
                                SidebarAction::BrowseSeasonA
                            } else {
                                SidebarAction::BrowseSeasonB
                            };
                        }
                    });
                });
            });
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}
