//! Analysis Engine Module
//! The aggregation core: maps a raw tabular dataset to summary statistics,
//! totals, rankings and a normalized (optionally date-indexed) dataset.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("dataset has no value columns")]
    NoColumns,
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Header name pandas gives an unnamed leading index column.
pub const UNNAMED_INDEX_SENTINEL: &str = "Unnamed: 0";

/// Date formats accepted when promoting a text column to the row index.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Decides whether the first column of a dataset holds dates.
///
/// Matching is a case-insensitive substring check against a configurable
/// keyword set, so differently-labeled date columns ("Date", "дата",
/// "Order date") are all recognized. The pandas unnamed-index sentinel
/// always matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateDetector {
    pub keywords: Vec<String>,
}

impl Default for DateDetector {
    fn default() -> Self {
        Self {
            keywords: vec!["date".to_string(), "дата".to_string()],
        }
    }
}

impl DateDetector {
    pub fn matches(&self, header: &str) -> bool {
        if header == UNNAMED_INDEX_SENTINEL {
            return true;
        }
        let header = header.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && header.contains(&kw.to_lowercase()))
    }
}

/// Row index of a normalized dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIndex {
    /// Default positional index, labeled by row number.
    Positional,
    /// Temporal index promoted from a detected date column.
    Temporal(Vec<NaiveDate>),
}

/// Value columns plus the row index derived from a raw dataset.
///
/// Row count always equals the raw dataset's; the column count is one less
/// when a date column was detected and promoted, otherwise unchanged.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    pub values: DataFrame,
    pub index: RowIndex,
}

impl NormalizedDataset {
    pub fn len(&self) -> usize {
        self.values.height()
    }

    pub fn is_empty(&self) -> bool {
        self.values.height() == 0
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.index, RowIndex::Temporal(_))
    }

    /// Display label for a row: ISO date under a temporal index, the row
    /// number otherwise.
    pub fn row_label(&self, row: usize) -> String {
        match &self.index {
            RowIndex::Temporal(dates) if row < dates.len() => {
                dates[row].format("%Y-%m-%d").to_string()
            }
            _ => row.to_string(),
        }
    }
}

/// Describe-style statistics for one numeric column, over non-null values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Placeholder statistics for a column with no valid numeric values.
    fn degenerate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Result of one analysis pass. Created fresh on every call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub basic_stats: Vec<ColumnSummary>,
    /// Per-column sum over non-null values, in column order.
    pub total_per_series: Vec<(String, f64)>,
    /// Per-row sum across numeric columns, nulls skipped.
    pub total_per_row: Vec<f64>,
    /// Per-column mean over non-null values; NaN when a column is all null.
    pub average_per_series: Vec<(String, f64)>,
    /// Label of the row whose total is maximal; ties go to the first row.
    pub row_with_max_total: Option<String>,
    /// Name of the column whose total is maximal; ties go to the first
    /// column. All-null columns never win.
    pub series_with_max_total: Option<String>,
}

/// Analyze a raw dataset.
///
/// Pure: the caller's frame is only read, and no state survives the call.
/// Non-numeric columns are excluded from every numeric reduction. Fails
/// with [`AnalysisError::NoColumns`] when no value columns remain after
/// index promotion.
pub fn analyze(
    df: &DataFrame,
    detector: &DateDetector,
) -> Result<(AnalysisResult, NormalizedDataset), AnalysisError> {
    if df.width() == 0 {
        return Err(AnalysisError::NoColumns);
    }

    let normalized = normalize(df, detector)?;
    if normalized.values.width() == 0 {
        return Err(AnalysisError::NoColumns);
    }

    let height = normalized.values.height();
    let mut basic_stats: Vec<ColumnSummary> = Vec::new();
    let mut total_per_series: Vec<(String, f64)> = Vec::new();
    let mut average_per_series: Vec<(String, f64)> = Vec::new();
    let mut total_per_row = vec![0.0f64; height];

    for col in normalized.values.get_columns() {
        let name = col.name().to_string();
        let Some(values) = numeric_values(col)? else {
            continue;
        };

        let non_null: Vec<f64> = values.iter().copied().flatten().collect();
        let summary = describe(&name, &non_null);

        total_per_series.push((name.clone(), non_null.iter().sum()));
        average_per_series.push((name, summary.mean));
        for (row, v) in values.iter().enumerate() {
            if let Some(v) = v {
                total_per_row[row] += v;
            }
        }
        basic_stats.push(summary);
    }

    // First-occurrence tie-break: replace only on a strictly greater total.
    let mut series_best: Option<(usize, f64)> = None;
    for (i, (total, summary)) in total_per_series.iter().zip(&basic_stats).enumerate() {
        if summary.count == 0 {
            continue;
        }
        if series_best.is_none_or(|(_, best)| total.1 > best) {
            series_best = Some((i, total.1));
        }
    }
    let series_with_max_total = series_best.map(|(i, _)| total_per_series[i].0.clone());

    let mut row_best: Option<(usize, f64)> = None;
    if !total_per_series.is_empty() {
        for (i, &t) in total_per_row.iter().enumerate() {
            if row_best.is_none_or(|(_, best)| t > best) {
                row_best = Some((i, t));
            }
        }
    }
    let row_with_max_total = row_best.map(|(i, _)| normalized.row_label(i));

    let result = AnalysisResult {
        basic_stats,
        total_per_series,
        total_per_row,
        average_per_series,
        row_with_max_total,
        series_with_max_total,
    };
    Ok((result, normalized))
}

/// Detect and promote a leading date column; otherwise keep the dataset
/// as-is with a positional index.
fn normalize(df: &DataFrame, detector: &DateDetector) -> Result<NormalizedDataset, AnalysisError> {
    let first = &df.get_columns()[0];
    let header = first.name().to_string();

    if detector.matches(&header) {
        if let Some(dates) = column_as_dates(first) {
            let values = df.drop(&header)?;
            return Ok(NormalizedDataset {
                values,
                index: RowIndex::Temporal(dates),
            });
        }
        log::warn!(
            "column {header:?} matched a date keyword but its values are not dates; \
             keeping positional index"
        );
    }

    Ok(NormalizedDataset {
        values: df.clone(),
        index: RowIndex::Positional,
    })
}

/// Convert a column to calendar dates. Returns `None` unless every value
/// is present and convertible.
fn column_as_dates(col: &Column) -> Option<Vec<NaiveDate>> {
    match col.dtype() {
        DataType::Date => {
            let days = col.cast(&DataType::Int32).ok()?;
            let ca = days.i32().ok()?;
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
            ca.into_iter()
                .map(|d| d.map(|d| epoch + chrono::Duration::days(d as i64)))
                .collect()
        }
        DataType::Datetime(_, _) => {
            let as_date = col.cast(&DataType::Date).ok()?;
            column_as_dates(&as_date)
        }
        DataType::String => {
            let ca = col.str().ok()?;
            ca.into_iter().map(|s| s.and_then(parse_date)).collect()
        }
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Extract a numeric column as `Option<f64>` per row, or `None` for a
/// non-numeric column. NaN entries count as missing.
fn numeric_values(col: &Column) -> Result<Option<Vec<Option<f64>>>, AnalysisError> {
    if !is_numeric_dtype(col.dtype()) {
        return Ok(None);
    }
    let casted = col.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(Some(
        ca.into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect(),
    ))
}

pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Compute describe-style statistics over non-null values.
fn describe(name: &str, values: &[f64]) -> ColumnSummary {
    let n = values.len();
    if n == 0 {
        return ColumnSummary::degenerate(name);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = values.iter().sum::<f64>() / n as f64;
    // Sample standard deviation (n - 1), undefined for a single value.
    let std = if n > 1 {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    ColumnSummary {
        name: name.to_string(),
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        q75: percentile(&sorted, 75.0),
        max: sorted[n - 1],
    }
}

/// Percentile with linear interpolation (NumPy compatible).
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(cols: Vec<Column>) -> DataFrame {
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn detector_matches_keywords_and_sentinel() {
        let detector = DateDetector::default();
        assert!(detector.matches("Date"));
        assert!(detector.matches("order_date"));
        assert!(detector.matches("Дата"));
        assert!(detector.matches(UNNAMED_INDEX_SENTINEL));
        assert!(!detector.matches("Product_1"));
    }

    #[test]
    fn date_column_is_promoted_to_index() {
        let df = frame(vec![
            Column::new(
                "Date".into(),
                vec!["2020-01-01", "2020-02-01", "2020-03-01"],
            ),
            Column::new("Product_1".into(), vec![1000.0, 1200.0, 1100.0]),
        ]);

        let (_, normalized) = analyze(&df, &DateDetector::default()).unwrap();
        assert!(normalized.is_temporal());
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.values.width(), 1);
        assert_eq!(normalized.row_label(1), "2020-02-01");
    }

    #[test]
    fn unparseable_date_values_fall_back_to_positional() {
        let df = frame(vec![
            Column::new("Date".into(), vec!["first", "second"]),
            Column::new("A".into(), vec![1.0, 2.0]),
        ]);

        let (_, normalized) = analyze(&df, &DateDetector::default()).unwrap();
        assert!(!normalized.is_temporal());
        assert_eq!(normalized.values.width(), 2);
        assert_eq!(normalized.row_label(0), "0");
    }

    #[test]
    fn describe_matches_known_values() {
        let summary = describe("x", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q75, 4.0);
        assert_eq!(summary.max, 5.0);
        // Sample std of 1..5 is sqrt(2.5).
        assert!((summary.std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 25.0), 17.5);
        assert_eq!(percentile(&sorted, 50.0), 25.0);
        assert_eq!(percentile(&sorted, 100.0), 40.0);
    }

    #[test]
    fn single_value_column_has_undefined_std() {
        let summary = describe("x", &[42.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert!(summary.std.is_nan());
    }

    #[test]
    fn all_null_column_sums_to_zero_and_never_wins() {
        let df = frame(vec![
            Column::new("Empty".into(), vec![None::<f64>, None, None]),
            Column::new("A".into(), vec![Some(1.0), Some(2.0), Some(3.0)]),
        ]);

        let (result, _) = analyze(&df, &DateDetector::default()).unwrap();
        assert_eq!(result.total_per_series[0], ("Empty".to_string(), 0.0));
        assert!(result.average_per_series[0].1.is_nan());
        assert_eq!(result.series_with_max_total.as_deref(), Some("A"));
    }

    #[test]
    fn text_columns_are_excluded_from_reductions() {
        let df = frame(vec![
            Column::new("Label".into(), vec!["a", "b"]),
            Column::new("A".into(), vec![5.0, 7.0]),
        ]);

        let (result, _) = analyze(&df, &DateDetector::default()).unwrap();
        assert_eq!(result.basic_stats.len(), 1);
        assert_eq!(result.total_per_series, vec![("A".to_string(), 12.0)]);
        assert_eq!(result.total_per_row, vec![5.0, 7.0]);
    }

    #[test]
    fn dataset_of_only_text_columns_yields_empty_rankings() {
        let df = frame(vec![Column::new("Label".into(), vec!["a", "b"])]);

        let (result, _) = analyze(&df, &DateDetector::default()).unwrap();
        assert!(result.basic_stats.is_empty());
        assert_eq!(result.series_with_max_total, None);
        assert_eq!(result.row_with_max_total, None);
    }

    #[test]
    fn lone_date_column_is_a_shape_error() {
        let df = frame(vec![Column::new(
            "Date".into(),
            vec!["2020-01-01", "2020-02-01"],
        )]);

        assert!(matches!(
            analyze(&df, &DateDetector::default()),
            Err(AnalysisError::NoColumns)
        ));
    }
}
