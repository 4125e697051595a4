//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::export::export_dashboard;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};
use uhv_dashboard::config::Config;
use uhv_dashboard::report::ReportSources;
use uhv_dashboard::{DashboardViews, DataLoader, MeasureGroup};

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        hospital: DataFrame,
        state: DataFrame,
        states: Vec<String>,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    hospital: Option<DataFrame>,
    state: Option<DataFrame>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config, group: MeasureGroup) -> Self {
        if config.dashboard.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let mut app = Self {
            control_panel: ControlPanel::new(
                config.data.hospital_csv.clone(),
                config.data.state_csv.clone(),
                group,
            ),
            chart_viewer: ChartViewer::new(),
            hospital: None,
            state: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load both tables in a background thread.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        self.chart_viewer.clear();
        self.control_panel.loaded = false;
        self.control_panel.set_status("Loading CSV files...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let hospital_path = self.control_panel.hospital_csv.clone();
        let state_path = self.control_panel.state_csv.clone();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading hospital table...".to_string()));
            let hospital = match DataLoader::load_hospital_table(&hospital_path) {
                Ok(df) => df,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                    return;
                }
            };

            let _ = tx.send(LoadResult::Progress("Reading state table...".to_string()));
            let state = match DataLoader::load_state_table(&state_path) {
                Ok(df) => df,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                    return;
                }
            };

            let states = DataLoader::observed_states(&hospital);
            let _ = tx.send(LoadResult::Complete {
                hospital,
                state,
                states,
            });
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete {
                        hospital,
                        state,
                        states,
                    } => {
                        let rows = hospital.height();
                        self.hospital = Some(hospital);
                        self.state = Some(state);
                        self.control_panel.update_states(states);
                        self.control_panel
                            .set_status(&format!("Loaded {} hospital rows", rows));
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.refresh_views();
                    }
                    LoadResult::Error(e) => {
                        error!("Load failed: {}", e);
                        self.control_panel.set_status(&format!("Error: {}", e));
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

    /// Recompute every view for the current selection.
    fn refresh_views(&mut self) {
        let (Some(hospital), Some(state)) = (&self.hospital, &self.state) else {
            return;
        };
        match DashboardViews::compute(hospital, state, &self.control_panel.selection) {
            Ok(views) => self.chart_viewer.set_views(views),
            Err(e) => {
                error!("View computation failed: {}", e);
                self.chart_viewer.clear();
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn handle_browse(&mut self, hospital: bool) {
        if self.is_loading {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            if hospital {
                self.control_panel.hospital_csv = path;
            } else {
                self.control_panel.state_csv = path;
            }
            self.start_loading();
        }
    }

    fn handle_export(&mut self) {
        let Some(views) = self.chart_viewer.views() else {
            self.control_panel.set_status("Nothing to export");
            return;
        };
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let sources = ReportSources {
            hospital_csv: self.control_panel.hospital_csv.clone(),
            state_csv: self.control_panel.state_csv.clone(),
        };
        match export_dashboard(&dir, sources, &self.control_panel.selection, views) {
            Ok(files) => {
                info!(dir = %dir.display(), "Exported dashboard");
                self.control_panel
                    .set_status(&format!("Exported {} files to {}", files.len(), dir.display()));
                open_dir(dir);
            }
            Err(e) => {
                error!("Export failed: {:#}", e);
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }
}

fn open_dir(dir: PathBuf) {
    if let Err(e) = open::that(&dir) {
        error!("Could not open {}: {}", dir.display(), e);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseHospitalCsv => self.handle_browse(true),
                        ControlPanelAction::BrowseStateCsv => self.handle_browse(false),
                        ControlPanelAction::Load => self.start_loading(),
                        ControlPanelAction::SelectionChanged => self.refresh_views(),
                        ControlPanelAction::Export => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
