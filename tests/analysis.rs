//! Integration tests for the analysis core: aggregation semantics, shape
//! invariants, tie-breaking and purity.

use polars::prelude::*;

use salescope::analysis::{analyze, AnalysisError, DateDetector};
use salescope::data::sample_sales_data;

fn frame(cols: Vec<Column>) -> DataFrame {
    DataFrame::new(cols).unwrap()
}

fn default_analyze(df: &DataFrame) -> (salescope::analysis::AnalysisResult, salescope::analysis::NormalizedDataset) {
    analyze(df, &DateDetector::default()).unwrap()
}

#[test]
fn sample_fixture_picks_the_second_product() {
    let df = sample_sales_data().unwrap();
    let (result, normalized) = default_analyze(&df);

    // Date column promoted: one fewer value column, same row count.
    assert!(normalized.is_temporal());
    assert_eq!(normalized.len(), 12);
    assert_eq!(normalized.values.width(), 3);

    let p1 = result
        .total_per_series
        .iter()
        .find(|(name, _)| name == "Продукт_1")
        .unwrap();
    assert_eq!(p1.1, 16400.0);
    assert_eq!(result.series_with_max_total.as_deref(), Some("Продукт_2"));
    assert_eq!(result.row_with_max_total.as_deref(), Some("2020-12-01"));
}

#[test]
fn single_row_totals_and_winner() {
    let df = frame(vec![
        Column::new("A".into(), vec![100.0]),
        Column::new("B".into(), vec![200.0]),
        Column::new("C".into(), vec![300.0]),
    ]);
    let (result, _) = default_analyze(&df);

    assert_eq!(
        result.total_per_series,
        vec![
            ("A".to_string(), 100.0),
            ("B".to_string(), 200.0),
            ("C".to_string(), 300.0),
        ]
    );
    assert_eq!(result.total_per_row, vec![600.0]);
    assert_eq!(result.series_with_max_total.as_deref(), Some("C"));
}

#[test]
fn zero_columns_is_a_shape_error() {
    let df = DataFrame::empty();
    assert!(matches!(
        analyze(&df, &DateDetector::default()),
        Err(AnalysisError::NoColumns)
    ));
}

#[test]
fn single_numeric_column_yields_one_entry() {
    let df = frame(vec![Column::new(
        "values".into(),
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
    )]);
    let (result, normalized) = default_analyze(&df);

    assert!(!normalized.is_temporal());
    assert_eq!(result.total_per_series, vec![("values".to_string(), 15.0)]);
    assert_eq!(result.basic_stats.len(), 1);
    assert_eq!(result.series_with_max_total.as_deref(), Some("values"));
}

#[test]
fn null_entries_are_excluded_from_counts_and_sums() {
    let df = frame(vec![Column::new(
        "A".into(),
        vec![Some(10.0), None, Some(30.0), None, Some(50.0)],
    )]);
    let (result, _) = default_analyze(&df);

    assert_eq!(result.basic_stats[0].count, 3);
    assert_eq!(result.total_per_series[0].1, 90.0);
    assert_eq!(result.average_per_series[0].1, 30.0);
    // Null rows contribute nothing to the row totals.
    assert_eq!(result.total_per_row, vec![10.0, 0.0, 30.0, 0.0, 50.0]);
}

#[test]
fn row_totals_sum_algebraically() {
    let df = frame(vec![
        Column::new("A".into(), vec![-100.0, -5.0]),
        Column::new("B".into(), vec![100.0, 2.0]),
        Column::new("C".into(), vec![0.0, 4.0]),
    ]);
    let (result, _) = default_analyze(&df);

    assert_eq!(result.total_per_row, vec![0.0, 1.0]);
    assert_eq!(result.row_with_max_total.as_deref(), Some("1"));
}

#[test]
fn per_series_totals_match_column_sums() {
    let df = frame(vec![
        Column::new("A".into(), vec![Some(1.5), Some(2.5), None]),
        Column::new("B".into(), vec![Some(10.0), None, Some(20.0)]),
    ]);
    let (result, _) = default_analyze(&df);

    assert_eq!(
        result.total_per_series,
        vec![("A".to_string(), 4.0), ("B".to_string(), 30.0)]
    );
}

#[test]
fn normalization_preserves_row_count_without_a_date_column() {
    let df = frame(vec![
        Column::new("A".into(), vec![1.0, 2.0, 3.0]),
        Column::new("B".into(), vec![4.0, 5.0, 6.0]),
    ]);
    let (_, normalized) = default_analyze(&df);

    assert_eq!(normalized.len(), df.height());
    assert_eq!(normalized.values.width(), df.width());
}

#[test]
fn analysis_is_idempotent() {
    let df = frame(vec![
        Column::new("Date".into(), vec!["2021-01-01", "2021-02-01", "2021-03-01"]),
        Column::new("A".into(), vec![Some(1.0), None, Some(3.0)]),
        Column::new("B".into(), vec![Some(9.0), Some(8.0), Some(7.0)]),
    ]);

    let (first, _) = default_analyze(&df);
    let (second, _) = default_analyze(&df);
    assert_eq!(first, second);
}

#[test]
fn analysis_does_not_mutate_the_input() {
    let df = frame(vec![
        Column::new("Date".into(), vec!["2021-01-01", "2021-02-01"]),
        Column::new("A".into(), vec![Some(1.0), None]),
    ]);
    let before = df.clone();

    let _ = default_analyze(&df);
    assert!(df.equals_missing(&before));
    assert_eq!(df.get_column_names(), before.get_column_names());
}

#[test]
fn equal_series_totals_pick_the_first_column() {
    let df = frame(vec![
        Column::new("First".into(), vec![60.0, 40.0]),
        Column::new("Second".into(), vec![50.0, 50.0]),
        Column::new("Third".into(), vec![10.0, 20.0]),
    ]);

    // Repeated runs stay deterministic.
    for _ in 0..5 {
        let (result, _) = default_analyze(&df);
        assert_eq!(result.series_with_max_total.as_deref(), Some("First"));
    }
}

#[test]
fn equal_row_totals_pick_the_first_row() {
    let df = frame(vec![
        Column::new("Date".into(), vec!["2021-01-01", "2021-02-01"]),
        Column::new("A".into(), vec![70.0, 30.0]),
        Column::new("B".into(), vec![30.0, 70.0]),
    ]);
    let (result, _) = default_analyze(&df);

    assert_eq!(result.total_per_row, vec![100.0, 100.0]);
    assert_eq!(result.row_with_max_total.as_deref(), Some("2021-01-01"));
}

#[test]
fn custom_keywords_drive_detection() {
    let df = frame(vec![
        Column::new("Периода".into(), vec!["2021-01-01", "2021-02-01"]),
        Column::new("A".into(), vec![1.0, 2.0]),
    ]);

    let (_, with_default) = analyze(&df, &DateDetector::default()).unwrap();
    assert!(!with_default.is_temporal());

    let detector = DateDetector {
        keywords: vec!["период".to_string()],
    };
    let (_, with_custom) = analyze(&df, &detector).unwrap();
    assert!(with_custom.is_temporal());
}
