//! Pairwise Pearson correlation between the numeric value columns.
//! The maximum off-diagonal coefficient feeds the textual report.

use polars::prelude::*;
use serde::Serialize;

use super::engine::is_numeric_dtype;

/// Square correlation matrix over named series.
///
/// `values[i][j]` is the Pearson coefficient between series `i` and `j`
/// computed over their non-null overlap; the diagonal is 1.0. Pairs with
/// fewer than two overlapping points, or zero variance on either side,
/// hold NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute the matrix from the numeric columns of a normalized frame.
    pub fn compute(df: &DataFrame) -> Result<Self, PolarsError> {
        let mut names: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = Vec::new();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }
            let casted = col.cast(&DataType::Float64)?;
            let ca = casted.f64()?;
            names.push(col.name().to_string());
            columns.push(ca.into_iter().map(|v| v.filter(|v| !v.is_nan())).collect());
        }

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Largest coefficient between two distinct series, NaN pairs skipped.
    pub fn max_off_diagonal(&self) -> Option<f64> {
        let mut best: Option<f64> = None;
        for i in 0..self.len() {
            for j in 0..self.len() {
                if i == j {
                    continue;
                }
                let r = self.values[i][j];
                if r.is_nan() {
                    continue;
                }
                if best.is_none_or(|b| r > b) {
                    best = Some(r);
                }
            }
        }
        best
    }
}

/// Pearson coefficient over the rows where both series hold a value.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| x.zip(*y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_correlated_series() {
        let a = vec![Some(1.0), Some(2.0), Some(3.0)];
        let b = vec![Some(2.0), Some(4.0), Some(6.0)];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn anti_correlated_series() {
        let a = vec![Some(1.0), Some(2.0), Some(3.0)];
        let b = vec![Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_ignores_rows_with_missing_values() {
        let a = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let b = vec![Some(2.0), Some(9.0), Some(6.0), None];
        // Overlap is rows 0 and 2 only: two points, exactly linear.
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_has_no_defined_correlation() {
        let a = vec![Some(5.0), Some(5.0), Some(5.0)];
        let b = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson(&a, &b).is_nan());
    }

    #[test]
    fn matrix_and_max_off_diagonal() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![1.0, 2.0, 3.0, 4.0]),
            Column::new("b".into(), vec![2.0, 4.0, 6.0, 8.0]),
            Column::new("c".into(), vec![4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();

        let matrix = CorrelationMatrix::compute(&df).unwrap();
        assert_eq!(matrix.len(), 3);
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
        assert!((matrix.values[0][2] + 1.0).abs() < 1e-12);
        assert!((matrix.max_off_diagonal().unwrap() - 1.0).abs() < 1e-12);
    }
}
