//! Salescope Main Application
//! Main window: left control panel, central report viewer, background
//! file loading, and the export actions.

use anyhow::Context;
use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use crate::analysis::{analyze, CorrelationMatrix};
use crate::charts::{ChartData, StaticChartRenderer};
use crate::data::{sample_sales_data, SpreadsheetLoader};
use crate::gui::{AnalysisView, ControlPanel, ControlPanelAction, ReportViewer};
use crate::report::ReportRenderer;

const PREVIEW_ROWS: usize = 5;
const CHART_EXPORT_WIDTH: u32 = 1200;
const CHART_EXPORT_HEIGHT: u32 = 700;

/// File loading result from background thread
enum LoadResult {
    Complete { df: DataFrame, path: PathBuf },
    Error(String),
}

/// Main application window.
pub struct SalescopeApp {
    loader: SpreadsheetLoader,
    control_panel: ControlPanel,
    report_viewer: ReportViewer,

    // Async file loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl SalescopeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: SpreadsheetLoader::new(),
            control_panel: ControlPanel::new(),
            report_viewer: ReportViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle spreadsheet selection - loads on a background thread.
    fn handle_browse_file(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &["xlsx", "xls", "csv"])
            .pick_file()
        else {
            return;
        };

        self.report_viewer.clear();
        self.control_panel.has_analysis = false;
        self.control_panel.settings.file_path = Some(path.clone());
        self.control_panel.set_status("Loading file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match SpreadsheetLoader::read_file(&path) {
                Ok(df) => LoadResult::Complete { df, path },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for file loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete { df, path } => {
                        self.loader.set_dataframe(df, Some(path));
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.run_analysis();
                    }
                    LoadResult::Error(error) => {
                        log::error!("file load failed: {error}");
                        self.control_panel.set_status(format!("Error: {error}"));
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

    /// Load the built-in sample dataset.
    fn handle_load_sample(&mut self) {
        match sample_sales_data() {
            Ok(df) => {
                self.loader.set_dataframe(df, None);
                self.control_panel.settings.file_path = None;
                self.run_analysis();
            }
            Err(e) => {
                log::error!("sample data failed: {e}");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Run the analysis on the current dataset and rebuild the view.
    /// Failures surface inline in the status area; the session keeps going.
    fn run_analysis(&mut self) {
        let detector = self.control_panel.settings.date_detector();
        let Some(df) = self.loader.get_dataframe() else {
            return;
        };

        let analyzed = analyze(df, &detector).and_then(|(result, normalized)| {
            let correlation = CorrelationMatrix::compute(&normalized.values)?;
            Ok((result, normalized, correlation))
        });

        match analyzed {
            Ok((result, normalized, correlation)) => {
                let chart_data = ChartData::new(&result, &normalized, correlation.clone());
                let report_text = ReportRenderer::render(&result, &correlation);

                let view = AnalysisView {
                    columns: self.loader.get_columns(),
                    row_count: self.loader.row_count(),
                    column_count: self.loader.column_count(),
                    missing_count: self.loader.missing_count(),
                    preview: self.loader.head_rows(PREVIEW_ROWS),
                    result,
                    chart_data,
                    report_text,
                };
                self.report_viewer.set_view(view);
                self.control_panel.has_analysis = true;
                self.control_panel.set_status(format!(
                    "Analysis complete: {} rows, {} columns",
                    self.loader.row_count(),
                    self.loader.column_count()
                ));
            }
            Err(e) => {
                log::error!("analysis failed: {e}");
                self.report_viewer.clear();
                self.control_panel.has_analysis = false;
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Save the report text with a timestamped default name.
    fn handle_save_report(&mut self) {
        let Some(view) = &self.report_viewer.view else {
            return;
        };

        let default_name = ReportRenderer::file_name(chrono::Local::now());
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text", &["txt"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        let written = std::fs::write(&path, &view.report_text)
            .with_context(|| format!("writing report to {}", path.display()));
        match written {
            Ok(()) => {
                self.control_panel.last_report_path = Some(path.clone());
                self.control_panel
                    .set_status(format!("Report saved to {}", path.display()));
            }
            Err(e) => {
                log::error!("{e:#}");
                self.control_panel.set_status(format!("Error: {e:#}"));
            }
        }
    }

    /// Render the three charts and write them into a chosen folder.
    fn handle_save_charts(&mut self) {
        let Some(view) = &self.report_viewer.view else {
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        let saved = StaticChartRenderer::render_all(
            &view.chart_data,
            CHART_EXPORT_WIDTH,
            CHART_EXPORT_HEIGHT,
        )
        .and_then(|charts| {
            for (name, png) in &charts {
                let path = dir.join(name);
                std::fs::write(&path, png)
                    .with_context(|| format!("writing chart to {}", path.display()))?;
            }
            Ok(charts.len())
        });

        match saved {
            Ok(count) => {
                self.control_panel
                    .set_status(format!("{count} charts saved to {}", dir.display()));
            }
            Err(e) => {
                log::error!("{e:#}");
                self.control_panel.set_status(format!("Error: {e:#}"));
            }
        }
    }

    /// Save the analysis result as JSON.
    fn handle_save_json(&mut self) {
        let Some(view) = &self.report_viewer.view else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("analysis_result.json")
            .save_file()
        else {
            return;
        };

        let written = serde_json::to_string_pretty(&view.result)
            .context("serializing analysis result")
            .and_then(|json| {
                std::fs::write(&path, json)
                    .with_context(|| format!("writing results to {}", path.display()))
            });
        match written {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Results saved to {}", path.display()));
            }
            Err(e) => {
                log::error!("{e:#}");
                self.control_panel.set_status(format!("Error: {e:#}"));
            }
        }
    }

    /// Open the last saved report with the system default app.
    fn handle_open_report(&mut self) {
        if let Some(path) = &self.control_panel.last_report_path {
            if let Err(e) = open::that(path) {
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for SalescopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::LoadSample => self.handle_load_sample(),
                        ControlPanelAction::KeywordsChanged => {
                            if self.loader.get_dataframe().is_some() {
                                self.run_analysis();
                            }
                        }
                        ControlPanelAction::SaveReport => self.handle_save_report(),
                        ControlPanelAction::SaveCharts => self.handle_save_charts(),
                        ControlPanelAction::SaveJson => self.handle_save_json(),
                        ControlPanelAction::OpenReport => self.handle_open_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Report Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.report_viewer.show(ui);
        });
    }
}
