//! Dashboard Application
//! Main window: sidebar section selector plus the section view.

use egui::SidePanel;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::error;

use crate::charts::{ReportExporter, SectionBuilder, SectionContent, SectionId};
use crate::config::DashboardConfig;
use crate::data::{LoaderError, SeasonCache, SeasonLoader};
use crate::gui::{SectionView, Sidebar, SidebarAction};

/// Loading result from the background thread
enum LoadResult {
    Progress(f32, String),
    Complete(HashMap<SectionId, SectionContent>),
    Missing(Vec<PathBuf>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    cfg: DashboardConfig,
    cache: Arc<Mutex<SeasonCache>>,
    sidebar: Sidebar,
    view: SectionView,

    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            cfg: DashboardConfig::load(),
            cache: Arc::new(Mutex::new(SeasonCache::new())),
            sidebar: Sidebar::new(),
            view: SectionView::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Load both seasons and build all sections on a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        self.view.clear();
        self.sidebar.export_enabled = false;
        self.sidebar.set_progress(5.0, "Loading season files...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cfg = self.cfg.clone();
        let cache = Arc::clone(&self.cache);

        thread::spawn(move || {
            // MissingFile is the one recovered failure: report all absent
            // files at once so the guidance card can list them.
            let missing = SeasonLoader::missing_sources(&cfg);
            if !missing.is_empty() {
                let _ = tx.send(LoadResult::Missing(missing));
                return;
            }

            let _ = tx.send(LoadResult::Progress(20.0, "Reading CSV files...".to_string()));

            let pair = match cache.lock() {
                Ok(mut cache) => cache.load_pair(&cfg),
                Err(_) => {
                    let _ = tx.send(LoadResult::Error("season cache poisoned".to_string()));
                    return;
                }
            };

            match pair {
                Ok(pair) => {
                    let _ = tx.send(LoadResult::Progress(
                        60.0,
                        "Building sections...".to_string(),
                    ));
                    let sections = SectionBuilder::build_all(&pair);
                    let _ = tx.send(LoadResult::Complete(sections));
                }
                // Race with the upfront check: a file can vanish in between.
                Err(LoaderError::MissingFile(path)) => {
                    let _ = tx.send(LoadResult::Missing(vec![path]));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.sidebar.set_progress(progress, &status);
                    }
                    LoadResult::Complete(sections) => {
                        let count = sections.len();
                        self.view.set_sections(sections);
                        self.sidebar.export_enabled = true;
                        self.sidebar
                            .set_progress(100.0, &format!("Complete! {} sections ready", count));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Missing(missing) => {
                        self.view.set_missing(missing);
                        self.sidebar.set_progress(0.0, "Season files missing");
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(err) => {
                        error!("season load failed: {}", err);
                        self.sidebar.set_progress(0.0, &format!("Error: {}", err));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Point one season at a different CSV, then reload.
    fn handle_browse(&mut self, season_a: bool) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            if season_a {
                self.cfg.season_a.path = path;
            } else {
                self.cfg.season_b.path = path;
            }
            self.start_load();
        }
    }

    fn handle_reload(&mut self) {
        if self.is_loading {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
        self.start_load();
    }

    /// Export all section charts as PNG files.
    fn handle_export(&mut self) {
        if !self.view.has_sections() {
            self.sidebar.set_progress(0.0, "No charts to export");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        self.sidebar.set_progress(50.0, "Rendering charts...");
        match ReportExporter::export_all(&self.view.sections, &dir) {
            Ok(count) => {
                self.sidebar
                    .set_progress(100.0, &format!("Complete! Exported {} charts", count));
                let _ = open::that(&dir);
            }
            Err(e) => {
                error!("export failed: {:#}", e);
                self.sidebar.set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - sidebar
        SidePanel::left("sidebar")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.sidebar.show(ui, &self.cfg);

                    match action {
                        SidebarAction::BrowseSeasonA => self.handle_browse(true),
                        SidebarAction::BrowseSeasonB => self.handle_browse(false),
                        SidebarAction::Reload => self.handle_reload(),
                        SidebarAction::ExportReport => self.handle_export(),
                        SidebarAction::None => {}
                    }
                });
            });

        // Central panel - selected section
        egui::CentralPanel::default().show(ctx, |ui| {
            let selected = self.sidebar.selected;
            self.view.show(ui, selected);
        });
    }
}
