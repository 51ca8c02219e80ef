//! Chart Plotter Module
//! Creates the interactive visualizations using egui_plot: total sales
//! over time, totals per product, and the correlation heatmap.

use egui::{Align2, Color32, FontId, Rect, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::analysis::{AnalysisResult, CorrelationMatrix, NormalizedDataset};

/// Color for the totals line
pub const LINE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Everything the three charts need, captured once per analysis run.
#[derive(Clone)]
pub struct ChartData {
    pub row_labels: Vec<String>,
    pub total_per_row: Vec<f64>,
    pub total_per_series: Vec<(String, f64)>,
    pub correlation: CorrelationMatrix,
}

impl ChartData {
    pub fn new(
        result: &AnalysisResult,
        normalized: &NormalizedDataset,
        correlation: CorrelationMatrix,
    ) -> Self {
        Self {
            row_labels: (0..normalized.len()).map(|i| normalized.row_label(i)).collect(),
            total_per_row: result.total_per_row.clone(),
            total_per_series: result.total_per_series.clone(),
            correlation,
        }
    }
}

/// Draws the report charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Line chart of total sales per period over the row index.
    pub fn draw_totals_line(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let labels = data.row_labels.clone();

        Plot::new("totals_line")
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Period")
            .y_axis_label("Total sales")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let points: Vec<[f64; 2]> = data
                    .total_per_row
                    .iter()
                    .enumerate()
                    .map(|(i, &t)| [i as f64, t])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(LINE_COLOR)
                        .width(2.0)
                        .name("Total sales"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(3.5)
                        .color(LINE_COLOR),
                );
            });
    }

    /// Bar chart of total sales per product with value labels atop bars.
    pub fn draw_series_bars(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let names: Vec<String> = data
            .total_per_series
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        let max_total = data
            .total_per_series
            .iter()
            .map(|(_, t)| *t)
            .fold(0.0f64, f64::max);

        Plot::new("series_bars")
            .height(height)
            .allow_scroll(false)
            .x_axis_label("Product")
            .y_axis_label("Total sales")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    names.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = data
                    .total_per_series
                    .iter()
                    .enumerate()
                    .map(|(i, (name, total))| {
                        Bar::new(i as f64, *total)
                            .width(0.6)
                            .fill(Self::series_color(i))
                            .name(name)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars));

                // Numeric labels just above each bar
                let offset = max_total * 0.02;
                for (i, (_, total)) in data.total_per_series.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, total + offset),
                            RichText::new(crate::report::format_thousands(*total)).size(12.0),
                        )
                        .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Correlation heatmap painted as a colored grid with annotated
    /// coefficients, diverging scale centered on zero.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.len();
        if n == 0 {
            ui.label("No numeric columns to correlate");
            return;
        }

        let cell: f32 = 52.0;
        let label_w: f32 = 110.0;
        let label_h: f32 = 22.0;
        let size = egui::vec2(label_w + n as f32 * cell, n as f32 * cell + label_h);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        let text_color = ui.visuals().text_color();

        for (i, name) in matrix.names.iter().enumerate() {
            // Row label
            painter.text(
                egui::pos2(
                    origin.x + label_w - 6.0,
                    origin.y + i as f32 * cell + cell / 2.0,
                ),
                Align2::RIGHT_CENTER,
                truncate(name, 14),
                FontId::proportional(12.0),
                text_color,
            );
            // Column label under the grid
            painter.text(
                egui::pos2(
                    origin.x + label_w + i as f32 * cell + cell / 2.0,
                    origin.y + n as f32 * cell + label_h / 2.0,
                ),
                Align2::CENTER_CENTER,
                truncate(name, 8),
                FontId::proportional(11.0),
                text_color,
            );

            for j in 0..n {
                let r = matrix.values[i][j];
                let rect = Rect::from_min_size(
                    egui::pos2(
                        origin.x + label_w + j as f32 * cell,
                        origin.y + i as f32 * cell,
                    ),
                    egui::vec2(cell - 2.0, cell - 2.0),
                );
                painter.rect_filled(rect, 3.0, Self::correlation_color(r));

                let label = if r.is_nan() {
                    "-".to_string()
                } else {
                    format!("{r:.2}")
                };
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(12.0),
                    if r.abs() > 0.6 {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    },
                );
            }
        }
    }

    /// Diverging scale: blue for -1, white for 0, red for +1.
    pub fn correlation_color(r: f64) -> Color32 {
        if r.is_nan() {
            return Color32::from_gray(200);
        }
        let t = r.clamp(-1.0, 1.0);
        let blend = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        if t >= 0.0 {
            // white -> red
            Color32::from_rgb(
                blend(255, 211, t),
                blend(255, 47, t),
                blend(255, 47, t),
            )
        } else {
            // white -> blue
            let t = -t;
            Color32::from_rgb(
                blend(255, 33, t),
                blend(255, 102, t),
                blend(255, 172, t),
            )
        }
    }
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_color_endpoints() {
        assert_eq!(
            ChartPlotter::correlation_color(0.0),
            Color32::from_rgb(255, 255, 255)
        );
        assert_eq!(
            ChartPlotter::correlation_color(1.0),
            Color32::from_rgb(211, 47, 47)
        );
        assert_eq!(
            ChartPlotter::correlation_color(-1.0),
            Color32::from_rgb(33, 102, 172)
        );
        assert_eq!(
            ChartPlotter::correlation_color(f64::NAN),
            Color32::from_gray(200)
        );
    }

    #[test]
    fn long_names_are_truncated_for_labels() {
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("a_rather_long_product", 8), "a_rathe…");
    }
}
