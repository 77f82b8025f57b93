//! TierView Main Application
//! Main window with control panel and chart viewer.

use crate::config::AppConfig;
use crate::data::{apply, CacheEntry, PipelineCache, TierPipeline};
use crate::export::Exporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, StatusLevel, ViewerHint};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Upload processing result from background thread
enum LoadResult {
    Progress(String),
    Complete { entry: CacheEntry, cache_hit: bool },
    Error(String),
}

/// Main application window.
pub struct TierViewApp {
    pipeline: TierPipeline,
    exporter: Exporter,
    cache: PipelineCache,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async upload processing
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl TierViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            pipeline: TierPipeline::new(&config),
            exporter: Exporter::new(config.export.clone()),
            cache: PipelineCache::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle file selection; loading and tiering run on a worker thread.
    fn handle_browse_file(&mut self) {
        if self.is_loading {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV or Excel", &["csv", "xlsx", "xls"])
            .pick_file()
        else {
            return;
        };

        self.chart_viewer.clear();
        self.control_panel.file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.control_panel
            .set_status(StatusLevel::Info, "Loading file...");
        self.control_panel.busy = true;
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        // The job gets its own snapshot of the cache and pipeline settings
        let cache = self.cache.clone();
        let pipeline = self.pipeline.clone();
        thread::spawn(move || Self::run_load(tx, path, cache, pipeline));
    }

    /// Load, validate and tier one upload (called from background thread)
    fn run_load(tx: Sender<LoadResult>, path: PathBuf, cache: PipelineCache, pipeline: TierPipeline) {
        let _ = tx.send(LoadResult::Progress("Processing data...".to_string()));

        match cache.resolve_path(&path, &pipeline) {
            Ok((entry, cache_hit)) => {
                let _ = tx.send(LoadResult::Complete { entry, cache_hit });
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "upload failed: {e}");
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for upload processing results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(StatusLevel::Info, &status);
                    }
                    LoadResult::Complete { entry, cache_hit } => {
                        let table = &entry.table;
                        self.control_panel.on_table_loaded(&entry.file_name, table);
                        if table.is_empty() {
                            self.control_panel.set_status(
                                StatusLevel::Warning,
                                &format!("{} has no Sender ID rows", entry.file_name),
                            );
                        } else {
                            self.control_panel.set_status(
                                StatusLevel::Success,
                                &format!(
                                    "Loaded {}: {} Sender IDs in {} tiers, {} rows{}",
                                    entry.file_name,
                                    table.sender_ids().len(),
                                    table.tiers().len(),
                                    table.len(),
                                    if cache_hit { " (cached)" } else { "" }
                                ),
                            );
                        }
                        self.cache.store(entry);
                        self.finish_loading();
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        // A failed upload replaces whatever was loaded before
                        self.cache.clear();
                        self.control_panel.on_table_cleared();
                        self.control_panel.set_status(
                            StatusLevel::Error,
                            &format!("Error while processing data: {}", error),
                        );
                        self.finish_loading();
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.control_panel.busy = false;
    }

    /// Filter the cached table with the current controls and show the chart.
    fn handle_show_visualization(&mut self) {
        let Some(entry) = self.cache.entry() else {
            self.control_panel
                .set_status(StatusLevel::Warning, "Upload a file first");
            return;
        };

        let result = self
            .control_panel
            .selection()
            .and_then(|selection| apply(&entry.table, &selection));

        match result {
            Ok(view) => {
                let status = format!("Showing {} rows", view.records.len());
                self.chart_viewer.set_view(view);
                self.control_panel.export_enabled = true;
                self.control_panel.set_status(StatusLevel::Success, &status);
            }
            Err(e) => {
                self.chart_viewer.clear();
                self.control_panel.export_enabled = false;
                let level = if e.is_empty_result() {
                    StatusLevel::Warning
                } else {
                    StatusLevel::Info
                };
                self.control_panel.set_status(level, &e.to_string());
            }
        }
    }

    fn handle_export_csv(&mut self) {
        let Some(view) = &self.chart_viewer.view else {
            self.control_panel
                .set_status(StatusLevel::Warning, "Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("tierview_selection.csv")
            .save_file()
        else {
            return;
        };

        match self.exporter.write_csv(view, &path) {
            Ok(rows) => {
                self.control_panel.set_status(
                    StatusLevel::Success,
                    &format!("CSV exported: {} rows", rows),
                );
                self.exporter.reveal(&path);
            }
            Err(e) => {
                tracing::error!("CSV export failed: {e}");
                self.control_panel
                    .set_status(StatusLevel::Error, &format!("Export error: {}", e));
            }
        }
    }

    fn handle_export_png(&mut self) {
        let Some(chart) = &self.chart_viewer.chart else {
            self.control_panel
                .set_status(StatusLevel::Warning, "Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("tierview_chart.png")
            .save_file()
        else {
            return;
        };

        match self.exporter.write_png(chart, &path) {
            Ok(()) => {
                self.control_panel
                    .set_status(StatusLevel::Success, "Chart image exported");
                self.exporter.reveal(&path);
            }
            Err(e) => {
                tracing::error!("PNG export failed: {e}");
                self.control_panel
                    .set_status(StatusLevel::Error, &format!("Export error: {}", e));
            }
        }
    }
}

impl eframe::App for TierViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let table = self.cache.entry().map(|e| e.table.clone());
                    let action = self.control_panel.show(ui, table.as_deref());

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::ShowVisualization => self.handle_show_visualization(),
                        ControlPanelAction::ExportCsv => self.handle_export_csv(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        let hint = if self.cache.entry().is_some() {
            ViewerHint::NoSelection
        } else {
            ViewerHint::NoFile
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, hint);
        });
    }
}
