//! Static Chart Renderer
//! Renders the three report charts to PNG bytes with plotters, for the
//! chart export action.

use std::io::Cursor;

use anyhow::{anyhow, Context};
use plotters::prelude::*;

use crate::charts::ChartData;
use crate::report::format_thousands;

const LINE_RGB: RGBColor = RGBColor(52, 152, 219);
const BAR_RGB: RGBColor = RGBColor(231, 76, 60);

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all three charts; returns `(file_name, png_bytes)` pairs.
    pub fn render_all(data: &ChartData, width: u32, height: u32) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        Ok(vec![
            (
                "total_sales_line.png".to_string(),
                Self::render_totals_line(data, width, height)?,
            ),
            (
                "sales_by_product_bar.png".to_string(),
                Self::render_series_bars(data, width, height)?,
            ),
            (
                "correlation_heatmap.png".to_string(),
                Self::render_heatmap(data, height, height)?,
            ),
        ])
    }

    /// Line chart of total sales per period.
    pub fn render_totals_line(data: &ChartData, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| anyhow!("chart fill: {e}"))?;

            let n = data.total_per_row.len().max(1);
            let (y_min, y_max) = value_range(&data.total_per_row);
            let labels = data.row_labels.clone();

            let mut chart = ChartBuilder::on(&root)
                .caption("Total sales per period", ("sans-serif", 26))
                .margin(12)
                .x_label_area_size(44)
                .y_label_area_size(70)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
                .map_err(|e| anyhow!("chart build: {e}"))?;

            chart
                .configure_mesh()
                .x_labels(n.min(12))
                .x_label_formatter(&|x| {
                    let idx = x.round();
                    if (idx - x).abs() < 1e-6 && idx >= 0.0 {
                        labels.get(idx as usize).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                })
                .x_desc("Period")
                .y_desc("Total sales")
                .draw()
                .map_err(|e| anyhow!("chart mesh: {e}"))?;

            let points: Vec<(f64, f64)> = data
                .total_per_row
                .iter()
                .enumerate()
                .map(|(i, &t)| (i as f64, t))
                .collect();
            chart
                .draw_series(LineSeries::new(points.clone(), LINE_RGB.stroke_width(2)))
                .map_err(|e| anyhow!("chart series: {e}"))?;
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| Circle::new(*p, 4, LINE_RGB.filled())),
                )
                .map_err(|e| anyhow!("chart markers: {e}"))?;

            root.present().map_err(|e| anyhow!("chart present: {e}"))?;
        }
        encode_png(buf, width, height)
    }

    /// Bar chart of total sales per product, value labels atop each bar.
    pub fn render_series_bars(data: &ChartData, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| anyhow!("chart fill: {e}"))?;

            let n = data.total_per_series.len().max(1);
            let max_total = data
                .total_per_series
                .iter()
                .map(|(_, t)| *t)
                .fold(0.0f64, f64::max)
                .max(1.0);
            let names: Vec<String> = data
                .total_per_series
                .iter()
                .map(|(name, _)| name.clone())
                .collect();

            let mut chart = ChartBuilder::on(&root)
                .caption("Total sales per product", ("sans-serif", 26))
                .margin(12)
                .x_label_area_size(44)
                .y_label_area_size(70)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0.0..max_total * 1.15)
                .map_err(|e| anyhow!("chart build: {e}"))?;

            chart
                .configure_mesh()
                .x_labels(n)
                .x_label_formatter(&|x| {
                    let idx = x.round();
                    if (idx - x).abs() < 1e-6 && idx >= 0.0 {
                        names.get(idx as usize).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                })
                .disable_x_mesh()
                .x_desc("Product")
                .y_desc("Total sales")
                .draw()
                .map_err(|e| anyhow!("chart mesh: {e}"))?;

            chart
                .draw_series(data.total_per_series.iter().enumerate().map(|(i, (_, t))| {
                    Rectangle::new(
                        [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, *t)],
                        BAR_RGB.mix(0.85).filled(),
                    )
                }))
                .map_err(|e| anyhow!("chart bars: {e}"))?;
            chart
                .draw_series(data.total_per_series.iter().enumerate().map(|(i, (_, t))| {
                    Text::new(
                        format_thousands(*t),
                        (i as f64 - 0.15, *t + max_total * 0.03),
                        ("sans-serif", 16).into_font(),
                    )
                }))
                .map_err(|e| anyhow!("chart labels: {e}"))?;

            root.present().map_err(|e| anyhow!("chart present: {e}"))?;
        }
        encode_png(buf, width, height)
    }

    /// Correlation heatmap on a diverging scale centered at zero.
    pub fn render_heatmap(data: &ChartData, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| anyhow!("chart fill: {e}"))?;

            let matrix = &data.correlation;
            let n = matrix.len().max(1) as f64;
            let names = matrix.names.clone();
            // Cells are drawn top-down, so the y axis reads bottom-up.
            let names_y: Vec<String> = matrix.names.iter().rev().cloned().collect();

            let mut chart = ChartBuilder::on(&root)
                .caption("Correlation between products", ("sans-serif", 26))
                .margin(12)
                .x_label_area_size(44)
                .y_label_area_size(90)
                .build_cartesian_2d(0.0..n, 0.0..n)
                .map_err(|e| anyhow!("chart build: {e}"))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(matrix.len() + 1)
                .y_labels(matrix.len() + 1)
                .x_label_formatter(&|x| axis_name(&names, *x))
                .y_label_formatter(&|y| axis_name(&names_y, *y))
                .draw()
                .map_err(|e| anyhow!("chart mesh: {e}"))?;

            let mut cells = Vec::new();
            let mut annotations = Vec::new();
            for i in 0..matrix.len() {
                for j in 0..matrix.len() {
                    let r = matrix.values[i][j];
                    let (x, y) = (j as f64, matrix.len() as f64 - 1.0 - i as f64);
                    cells.push(Rectangle::new(
                        [(x + 0.02, y + 0.02), (x + 0.98, y + 0.98)],
                        heat_color(r).filled(),
                    ));
                    let label = if r.is_nan() {
                        "-".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    let style = TextStyle::from(("sans-serif", 15).into_font()).color(
                        if r.abs() > 0.6 { &WHITE } else { &BLACK },
                    );
                    annotations.push(Text::new(label, (x + 0.36, y + 0.45), style));
                }
            }
            chart
                .draw_series(cells)
                .map_err(|e| anyhow!("chart cells: {e}"))?;
            chart
                .draw_series(annotations)
                .map_err(|e| anyhow!("chart annotations: {e}"))?;

            root.present().map_err(|e| anyhow!("chart present: {e}"))?;
        }
        encode_png(buf, width, height)
    }
}

fn axis_name(names: &[String], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() < 1e-6 && idx >= 0.0 {
        names.get(idx as usize).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

/// Diverging scale: blue for -1, white for 0, red for +1; gray for NaN.
fn heat_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let t = r.clamp(-1.0, 1.0);
    let blend = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    if t >= 0.0 {
        RGBColor(blend(255, 211, t), blend(255, 47, t), blend(255, 47, t))
    } else {
        let t = -t;
        RGBColor(blend(255, 33, t), blend(255, 102, t), blend(255, 172, t))
    }
}

fn encode_png(buf: Vec<u8>, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, buf)
        .context("chart buffer has unexpected size")?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CorrelationMatrix;

    fn chart_data() -> ChartData {
        ChartData {
            row_labels: vec!["2020-01-01".into(), "2020-02-01".into(), "2020-03-01".into()],
            total_per_row: vec![3300.0, 3400.0, 3350.0],
            total_per_series: vec![("Product_1".into(), 16400.0), ("Product_2".into(), 18600.0)],
            correlation: CorrelationMatrix {
                names: vec!["Product_1".into(), "Product_2".into()],
                values: vec![vec![1.0, 0.8], vec![0.8, 1.0]],
            },
        }
    }

    #[test]
    fn charts_render_to_nonempty_png() {
        let data = chart_data();
        let rendered = StaticChartRenderer::render_all(&data, 640, 480).unwrap();
        assert_eq!(rendered.len(), 3);
        for (name, png) in rendered {
            assert!(name.ends_with(".png"));
            // PNG magic bytes
            assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
        }
    }
}
