//! Report Renderer Module
//! Formats an analysis result into the downloadable plaintext report.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::analysis::{AnalysisResult, CorrelationMatrix};

/// Direction of sales between the first and last period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Downward,
    Flat,
}

impl Trend {
    /// Strict comparison of the last row total against the first; equal
    /// totals classify as flat.
    pub fn of(total_per_row: &[f64]) -> Trend {
        match (total_per_row.first(), total_per_row.last()) {
            (Some(first), Some(last)) if last > first => Trend::Upward,
            (Some(first), Some(last)) if last < first => Trend::Downward,
            _ => Trend::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Upward => "upward",
            Trend::Downward => "downward",
            Trend::Flat => "flat",
        }
    }
}

/// Builds the textual report from the analysis output.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Render the report text block.
    pub fn render(result: &AnalysisResult, correlation: &CorrelationMatrix) -> String {
        let totals = &result.total_per_row;
        let mut out = String::new();

        let _ = writeln!(out, "## Sales Data Analysis Report");
        let _ = writeln!(out);
        let _ = writeln!(out, "### Key results:");
        let _ = writeln!(out, "- Total records: {}", totals.len());
        let _ = writeln!(out, "- Number of products: {}", result.basic_stats.len());

        if let Some(best) = &result.series_with_max_total {
            let best_total = result
                .total_per_series
                .iter()
                .find(|(name, _)| name == best)
                .map(|(_, total)| *total)
                .unwrap_or(f64::NAN);
            let _ = writeln!(
                out,
                "- Best product: {} (total sales: {})",
                best,
                format_thousands(best_total)
            );
        }
        if let Some(period) = &result.row_with_max_total {
            let _ = writeln!(out, "- Best period: {period}");
        }

        if !totals.is_empty() {
            let mean = totals.iter().sum::<f64>() / totals.len() as f64;
            let max = totals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = totals.iter().cloned().fold(f64::INFINITY, f64::min);
            let _ = writeln!(out, "- Average sales per period: {}", format_thousands(mean));
            let _ = writeln!(out, "- Highest period sales: {}", format_thousands(max));
            let _ = writeln!(out, "- Lowest period sales: {}", format_thousands(min));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "### Conclusions:");
        let trend = Trend::of(totals);
        let article = if trend == Trend::Upward { "an" } else { "a" };
        let _ = writeln!(out, "- Sales show {article} {} trend", trend.as_str());
        if let Some(r) = correlation.max_off_diagonal() {
            let _ = writeln!(
                out,
                "- The strongest correlation between products has coefficient {r:.3}"
            );
        }
        if totals.len() > 1 {
            let _ = writeln!(
                out,
                "- Standard deviation of total sales: {}",
                format_thousands(sample_std(totals))
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "### Toolchain:");
        let _ = writeln!(out, "- polars: data processing and analysis");
        let _ = writeln!(out, "- egui/eframe: application interface");
        let _ = writeln!(out, "- plotters: chart rendering");

        out
    }

    /// Timestamped file name for the report download.
    pub fn file_name(now: DateTime<Local>) -> String {
        format!("sales_analysis_report_{}.txt", now.format("%Y%m%d_%H%M%S"))
    }
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
}

/// Round to a whole number and group digits with commas, matching the
/// report's `{:,.0f}` figures.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, DateDetector};
    use polars::prelude::*;

    #[test]
    fn trend_is_strict_with_flat_for_equal_endpoints() {
        assert_eq!(Trend::of(&[100.0, 50.0, 200.0]), Trend::Upward);
        assert_eq!(Trend::of(&[200.0, 500.0, 100.0]), Trend::Downward);
        assert_eq!(Trend::of(&[150.0, 80.0, 150.0]), Trend::Flat);
        assert_eq!(Trend::of(&[]), Trend::Flat);
        assert_eq!(Trend::of(&[42.0]), Trend::Flat);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(16400.0), "16,400");
        assert_eq!(format_thousands(1234567.4), "1,234,567");
        assert_eq!(format_thousands(-16400.0), "-16,400");
        assert_eq!(format_thousands(f64::NAN), "n/a");
    }

    #[test]
    fn report_names_the_best_product() {
        let df = DataFrame::new(vec![
            Column::new("A".into(), vec![100.0, 100.0]),
            Column::new("B".into(), vec![300.0, 200.0]),
        ])
        .unwrap();
        let (result, normalized) = analyze(&df, &DateDetector::default()).unwrap();
        let correlation = CorrelationMatrix::compute(&normalized.values).unwrap();

        let report = ReportRenderer::render(&result, &correlation);
        assert!(report.contains("Best product: B (total sales: 500)"));
        assert!(report.contains("Total records: 2"));
        assert!(report.contains("downward trend"));
    }

    #[test]
    fn file_name_is_timestamped() {
        let now = Local::now();
        let name = ReportRenderer::file_name(now);
        assert!(name.starts_with("sales_analysis_report_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "sales_analysis_report_YYYYmmdd_HHMMSS.txt".len());
    }
}
