//! Report Viewer Widget
//! Central scrollable panel: data overview, descriptive statistics, key
//! indicators, the three charts and the report text.

use egui::{Color32, RichText, ScrollArea};

use crate::analysis::AnalysisResult;
use crate::charts::{ChartData, ChartPlotter};
use crate::report::format_thousands;

const PREVIEW_ROWS: usize = 5;

/// Everything the central panel renders for one analysis run.
pub struct AnalysisView {
    pub columns: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
    pub missing_count: usize,
    pub preview: Vec<Vec<String>>,
    pub result: AnalysisResult,
    pub chart_data: ChartData,
    pub report_text: String,
}

impl AnalysisView {
    /// Top products by total, largest first.
    fn top_products(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked = self.result.total_per_series.clone();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

/// Scrollable report display area.
pub struct ReportViewer {
    pub view: Option<AnalysisView>,
}

impl Default for ReportViewer {
    fn default() -> Self {
        Self { view: None }
    }
}

impl ReportViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: AnalysisView) {
        self.view = Some(view);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Load a spreadsheet or use the sample data to begin")
                        .size(18.0)
                        .color(Color32::GRAY),
                );
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_overview(ui, view);
                ui.add_space(16.0);
                Self::draw_stats_table(ui, &view.result);
                ui.add_space(16.0);
                Self::draw_key_indicators(ui, view);
                ui.add_space(16.0);
                Self::draw_charts(ui, &view.chart_data);
                ui.add_space(16.0);
                Self::draw_report(ui, &view.report_text);
                ui.add_space(16.0);
            });
    }

    fn section_header(ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).size(17.0).strong());
        ui.add_space(6.0);
    }

    fn draw_overview(ui: &mut egui::Ui, view: &AnalysisView) {
        Self::section_header(ui, "1. 📋 Data Overview");

        ui.columns(3, |cols| {
            Self::metric_tile(&mut cols[0], "Rows", &view.row_count.to_string());
            Self::metric_tile(&mut cols[1], "Columns", &view.column_count.to_string());
            Self::metric_tile(&mut cols[2], "Missing values", &view.missing_count.to_string());
        });

        ui.add_space(8.0);
        ui.label(RichText::new("First rows:").strong());
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("preview_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for name in &view.columns {
                            ui.label(RichText::new(name).strong().size(11.0));
                        }
                        ui.end_row();
                        for row in view.preview.iter().take(PREVIEW_ROWS) {
                            for value in row {
                                ui.label(RichText::new(value).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn metric_tile(ui: &mut egui::Ui, caption: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(value).size(20.0).strong());
                    ui.label(RichText::new(caption).size(11.0).color(Color32::GRAY));
                });
            });
    }

    /// Descriptive statistics table, one row per numeric column.
    fn draw_stats_table(ui: &mut egui::Ui, result: &AnalysisResult) {
        Self::section_header(ui, "2. 📊 Descriptive Statistics");

        if result.basic_stats.is_empty() {
            ui.label("No numeric columns in this dataset");
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("stats_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in
                            ["Column", "N", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"]
                        {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for summary in &result.basic_stats {
                            ui.label(RichText::new(&summary.name).size(11.0));
                            ui.label(RichText::new(summary.count.to_string()).size(11.0));
                            for value in [
                                summary.mean,
                                summary.std,
                                summary.min,
                                summary.q25,
                                summary.median,
                                summary.q75,
                                summary.max,
                            ] {
                                let text = if value.is_nan() {
                                    "-".to_string()
                                } else {
                                    format!("{value:.2}")
                                };
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn draw_key_indicators(ui: &mut egui::Ui, view: &AnalysisView) {
        Self::section_header(ui, "3. 🎯 Key Indicators");

        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.label(RichText::new("Totals and averages per product:").strong());
            egui::Grid::new("totals_table")
                .striped(true)
                .min_col_width(80.0)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Product").strong().size(11.0));
                    ui.label(RichText::new("Total").strong().size(11.0));
                    ui.label(RichText::new("Average").strong().size(11.0));
                    ui.end_row();
                    for ((name, total), (_, average)) in view
                        .result
                        .total_per_series
                        .iter()
                        .zip(&view.result.average_per_series)
                    {
                        ui.label(RichText::new(name).size(11.0));
                        ui.label(RichText::new(format_thousands(*total)).size(11.0));
                        ui.label(RichText::new(format_thousands(*average)).size(11.0));
                        ui.end_row();
                    }
                });

            let ui = &mut cols[1];
            if let Some(best) = &view.result.series_with_max_total {
                ui.label(RichText::new(format!("Best product: {best}")).strong());
            }
            if let Some(period) = &view.result.row_with_max_total {
                ui.label(RichText::new(format!("Best period: {period}")).strong());
            }
            ui.add_space(6.0);
            ui.label(RichText::new("Top 3 products:").strong());
            for (i, (name, total)) in view.top_products(3).iter().enumerate() {
                ui.label(format!("{}. {}: {}", i + 1, name, format_thousands(*total)));
            }
        });
    }

    fn draw_charts(ui: &mut egui::Ui, chart_data: &ChartData) {
        Self::section_header(ui, "4. 📈 Charts");

        ui.label(RichText::new("Total sales per period:").strong());
        ChartPlotter::draw_totals_line(ui, chart_data, 240.0);
        ui.add_space(10.0);

        ui.label(RichText::new("Total sales per product:").strong());
        ChartPlotter::draw_series_bars(ui, chart_data, 240.0);
        ui.add_space(10.0);

        ui.label(RichText::new("Correlation between products:").strong());
        ChartPlotter::draw_correlation_heatmap(ui, &chart_data.correlation);
    }

    fn draw_report(ui: &mut egui::Ui, report_text: &str) {
        Self::section_header(ui, "5. 📝 Report");

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(report_text).monospace().size(12.0));
            });
    }
}
