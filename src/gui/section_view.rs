//! Section View Widget
//! Central scrollable panel rendering the selected section's chart cards.

use egui::{Color32, RichText, ScrollArea};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::charts::{SectionContent, SectionId, SectionPlotter};

const CARD_SPACING: f32 = 15.0;

/// Scrollable display area for one section at a time.
pub struct SectionView {
    /// Built content for all sections.
    pub sections: HashMap<SectionId, SectionContent>,
    /// Season files that were not found; non-empty switches the view to the
    /// guidance card instead of charts.
    pub missing_files: Vec<PathBuf>,
}

impl Default for SectionView {
    fn default() -> Self {
        Self {
            sections: HashMap::new(),
            missing_files: Vec::new(),
        }
    }
}

impl SectionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all content
    pub fn clear(&mut self) {
        self.sections.clear();
        self.missing_files.clear();
    }

    pub fn set_sections(&mut self, sections: HashMap<SectionId, SectionContent>) {
        self.sections = sections;
        self.missing_files.clear();
    }

    pub fn set_missing(&mut self, missing: Vec<PathBuf>) {
        self.sections.clear();
        self.missing_files = missing;
    }

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Draw the selected section
    pub fn show(&self, ui: &mut egui::Ui, selected: SectionId) {
        if !self.missing_files.is_empty() {
            self.show_guidance(ui);
            return;
        }

        let Some(content) = self.sections.get(&selected) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(5.0);
                ui.label(RichText::new(selected.title()).size(24.0).strong());
                ui.add_space(CARD_SPACING);

                for (idx, panel) in content.panels.iter().enumerate() {
                    let plot_id = format!("{:?}_{}", selected, idx);
                    egui::Frame::none()
                        .rounding(8.0)
                        .stroke(egui::Stroke::new(1.5, Color32::from_gray(70)))
                        .fill(ui.visuals().widgets.noninteractive.bg_fill)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width() - 20.0);
                            ui.label(RichText::new(&panel.title).size(16.0).strong());
                            ui.add_space(8.0);
                            SectionPlotter::draw_panel(ui, panel, &plot_id);
                        });
                    ui.add_space(CARD_SPACING);
                }
            });
    }

    /// Safe no-op state: tell the user which files are missing and how to
    /// fix it, instead of charts.
    fn show_guidance(&self, ui: &mut egui::Ui) {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            egui::Frame::none()
                .rounding(8.0)
                .stroke(egui::Stroke::new(2.0, Color32::from_rgb(220, 53, 69)))
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .inner_margin(20.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new("⚠ Season files not found")
                            .size(20.0)
                            .strong()
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                    ui.add_space(10.0);
                    for path in &self.missing_files {
                        ui.label(RichText::new(path.display().to_string()).size(14.0).monospace());
                    }
                    ui.add_space(10.0);
                    ui.label(
                        RichText::new(
                            "Place the season CSV files in the working directory, \
                             or pick them with the 📂 buttons and hit Reload.",
                        )
                        .size(13.0),
                    );
                });
        });
    }
}
