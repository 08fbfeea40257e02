//! Data loading utilities

use crate::error::{MaintenanceError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// CSV loader for equipment/sensor records
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
    /// Field separator
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
            delimiter: b',',
        }
    }

    /// Set number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows.max(1);
        self
    }

    /// Set the field separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a headered CSV file.
    ///
    /// A missing or unreadable file surfaces as `IoError`; a file that cannot
    /// be parsed as CSV surfaces as `DataError`.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                MaintenanceError::DataError(format!(
                    "failed to parse {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })
    }
}

/// Load a CSV file with default options
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    DataLoader::new().load_csv(path)
}

/// Column names of a frame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Extract every column of a frame into a row-major `Array2<f64>`.
///
/// String columns are rejected: they must be encoded or dropped first.
/// Nulls are rejected with a `DataError` naming the column and row.
pub fn frame_to_array2(df: &DataFrame) -> Result<Array2<f64>> {
    columns_to_array2(df, &column_names(df))
}

/// Extract named columns into a row-major `Array2<f64>`.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| MaintenanceError::FeatureNotFound(col_name.clone()))?;
            if matches!(column.dtype(), DataType::String) {
                return Err(MaintenanceError::DataError(format!(
                    "column '{}' is not numeric; encode it or drop it first",
                    col_name
                )));
            }
            let series_f64 = column.as_materialized_series().cast(&DataType::Float64)?;
            let values: Vec<f64> = series_f64
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.ok_or_else(|| {
                        MaintenanceError::DataError(format!(
                            "column '{}' has a missing value at row {}",
                            col_name, row
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

/// Rebuild a frame of `Float64` columns from a row-major matrix
pub fn array2_to_frame(x: &Array2<f64>, col_names: &[String]) -> Result<DataFrame> {
    if x.ncols() != col_names.len() {
        return Err(MaintenanceError::ShapeError {
            expected: format!("{} columns", col_names.len()),
            actual: format!("{} columns", x.ncols()),
        });
    }

    let columns: Vec<Column> = col_names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let values: Vec<f64> = x.column(j).to_vec();
            Column::new(name.as_str().into(), values)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Read an integer label column into an `Array1<i64>`
pub fn series_to_labels(series: &Series) -> Result<Array1<i64>> {
    let labels = series.cast(&DataType::Int64)?;
    labels
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                MaintenanceError::DataError(format!("missing label at row {}", i))
            })
        })
        .collect::<Result<Vec<i64>>>()
        .map(Array1::from_vec)
}
