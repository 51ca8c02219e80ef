//! Spreadsheet Loader Module
//! Loads Excel workbooks (via calamine) and CSV files (via Polars) into a
//! DataFrame, inferring each column as numeric, date or text.

use calamine::{open_workbook_auto, DataType as Cell, Reader};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("unsupported file type: {0:?}")]
    UnsupportedExtension(String),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no usable sheet")]
    EmptyWorkbook,
    #[error("failed to build table: {0}")]
    Table(#[from] PolarsError),
    #[error("no data loaded")]
    NoData,
}

/// Holds the current dataset and where it came from.
pub struct SpreadsheetLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for SpreadsheetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadsheetLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Read a spreadsheet file, dispatching on the extension.
    pub fn read_file(path: &Path) -> Result<DataFrame, LoaderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" => Self::read_workbook(path),
            "csv" => Self::read_csv(path),
            other => Err(LoaderError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Load a file and keep it as the current dataset.
    pub fn load(&mut self, path: &Path) -> Result<&DataFrame, LoaderError> {
        let df = Self::read_file(path)?;
        log::info!(
            "loaded {:?}: {} rows, {} columns",
            path.file_name().unwrap_or_default(),
            df.height(),
            df.width()
        );
        self.file_path = Some(path.to_path_buf());
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read the first sheet of an Excel workbook. The first row names the
    /// columns; unnamed header cells get the pandas `Unnamed: {i}` label.
    fn read_workbook(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&sheet)?;

        let mut rows = range.rows();
        let header_row = rows.next().ok_or(LoaderError::EmptyWorkbook)?;
        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = cell.to_string().trim().to_string();
                if text.is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    text
                }
            })
            .collect();

        // Short rows are padded with empty cells; cells past the header
        // width are ignored.
        let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        for row in rows {
            for (i, column) in cells.iter_mut().enumerate() {
                column.push(row.get(i).cloned().unwrap_or(Cell::Empty));
            }
        }

        let columns = headers
            .iter()
            .zip(&cells)
            .map(|(name, cells)| build_column(name, cells))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Load a CSV file using Polars.
    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path.to_string_lossy().as_ref())
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Get list of column names from the loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.df.as_ref().map(|df| df.width()).unwrap_or(0)
    }

    /// Total missing values across all columns.
    pub fn missing_count(&self) -> usize {
        self.df
            .as_ref()
            .map(|df| df.get_columns().iter().map(|c| c.null_count()).sum())
            .unwrap_or(0)
    }

    /// First `n` rows rendered as display strings for the preview table.
    pub fn head_rows(&self, n: usize) -> Vec<Vec<String>> {
        let Some(df) = &self.df else {
            return Vec::new();
        };

        (0..df.height().min(n))
            .map(|row| {
                df.get_columns()
                    .iter()
                    .map(|col| match col.get(row) {
                        Ok(value) if !value.is_null() => {
                            value.to_string().trim_matches('"').to_string()
                        }
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect()
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set DataFrame directly (used for async loading and sample data).
    pub fn set_dataframe(&mut self, df: DataFrame, path: Option<PathBuf>) {
        self.df = Some(df);
        self.file_path = path;
    }
}

/// Build one Polars column from raw cells: Float64 when every non-empty
/// cell is numeric, Date when every non-empty cell is a date, String
/// otherwise.
fn build_column(name: &str, cells: &[Cell]) -> Result<Column, LoaderError> {
    let non_empty: Vec<&Cell> = cells.iter().filter(|c| !is_empty_cell(c)).collect();

    if !non_empty.is_empty() && non_empty.iter().all(|c| numeric_cell(c).is_some()) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| if is_empty_cell(c) { None } else { numeric_cell(c) })
            .collect();
        return Ok(Column::new(name.into(), values));
    }

    if !non_empty.is_empty() && non_empty.iter().all(|c| date_cell(c).is_some()) {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
        let days: Vec<Option<i32>> = cells
            .iter()
            .map(|c| {
                if is_empty_cell(c) {
                    None
                } else {
                    date_cell(c).map(|d| d.signed_duration_since(epoch).num_days() as i32)
                }
            })
            .collect();
        return Ok(Column::new(name.into(), days).cast(&DataType::Date)?);
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|c| {
            if is_empty_cell(c) {
                None
            } else {
                Some(c.to_string())
            }
        })
        .collect();
    Ok(Column::new(name.into(), values))
}

fn is_empty_cell(cell: &Cell) -> bool {
    match cell {
        Cell::Empty | Cell::Error(_) => true,
        Cell::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn numeric_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Float(f) => Some(*f),
        Cell::Int(i) => Some(*i as f64),
        Cell::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(_) | Cell::DateTimeIso(_) => cell.as_datetime().map(|dt| dt.date()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_become_a_float_column() {
        let cells = vec![
            Cell::Float(1.5),
            Cell::Int(2),
            Cell::String("3.25".to_string()),
            Cell::Empty,
        ];
        let col = build_column("A", &cells).unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.len(), 4);
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn mixed_cells_become_a_string_column() {
        let cells = vec![Cell::Float(1.0), Cell::String("widget".to_string())];
        let col = build_column("A", &cells).unwrap();
        assert_eq!(col.dtype(), &DataType::String);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let cells = vec![
            Cell::Float(1.0),
            Cell::String("  ".to_string()),
            Cell::Float(3.0),
        ];
        let col = build_column("A", &cells).unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.null_count(), 1);
    }

    #[test]
    fn all_empty_cells_stay_textual() {
        let cells = vec![Cell::Empty, Cell::Empty];
        let col = build_column("A", &cells).unwrap();
        assert_eq!(col.dtype(), &DataType::String);
        assert_eq!(col.null_count(), 2);
    }

    #[test]
    fn metrics_reflect_the_current_dataset() {
        let df = DataFrame::new(vec![
            Column::new("A".into(), vec![Some(1.0), None, Some(3.0)]),
            Column::new("B".into(), vec![Some(4.0), Some(5.0), None]),
        ])
        .unwrap();

        let mut loader = SpreadsheetLoader::new();
        loader.set_dataframe(df, None);
        assert_eq!(loader.row_count(), 3);
        assert_eq!(loader.column_count(), 2);
        assert_eq!(loader.missing_count(), 2);
        assert_eq!(loader.head_rows(2).len(), 2);
    }
}
