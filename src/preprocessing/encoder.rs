//! Categorical encoding

use crate::error::{MaintenanceError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Categories learned for one source column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnCategories {
    name: String,
    /// Sorted, de-duplicated
    categories: Vec<String>,
}

/// One-hot encoder.
///
/// Each fitted column is replaced by one `Float64` indicator column per
/// category, named `<column>_<category>` and appended after the remaining
/// columns. Values not seen during fitting (and nulls) encode as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encoder {
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns.clear();

        for col_name in columns {
            let series = string_series(df, col_name)?;
            let categories: BTreeSet<String> = series
                .str()?
                .into_iter()
                .flatten()
                .map(|v| v.to_string())
                .collect();

            self.columns.push(ColumnCategories {
                name: col_name.to_string(),
                categories: categories.into_iter().collect(),
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(MaintenanceError::ModelNotFitted);
        }

        let mut indicators: Vec<Column> = Vec::new();
        for fitted in &self.columns {
            let series = string_series(df, &fitted.name)?;
            let values = series.str()?;

            for category in &fitted.categories {
                let indicator: Vec<f64> = values
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                let name = format!("{}_{}", fitted.name, category);
                indicators.push(Column::new(name.into(), indicator));
            }
        }

        let mut result = df.drop_many(self.columns.iter().map(|c| c.name.as_str()));
        for column in indicators {
            result.with_column(column)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Names of the indicator columns this encoder produces, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| {
                c.categories
                    .iter()
                    .map(move |category| format!("{}_{}", c.name, category))
            })
            .collect()
    }

    /// Source columns the encoder was fitted on
    pub fn source_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

fn string_series(df: &DataFrame, col_name: &str) -> Result<Series> {
    let column = df
        .column(col_name)
        .map_err(|_| MaintenanceError::FeatureNotFound(col_name.to_string()))?;
    Ok(column.as_materialized_series().cast(&DataType::String)?)
}

/// One-hot encode categorical columns, fitting on the training partition only.
///
/// Only columns present in both frames are encoded. When none are, both frames
/// come back unchanged and no encoder is returned.
pub fn fit_encode<S: AsRef<str>>(
    x_train: &DataFrame,
    x_test: &DataFrame,
    categorical_cols: &[S],
) -> Result<(DataFrame, DataFrame, Option<Encoder>)> {
    let present: Vec<&str> = categorical_cols
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| x_train.column(c).is_ok() && x_test.column(c).is_ok())
        .collect();

    if present.is_empty() {
        return Ok((x_train.clone(), x_test.clone(), None));
    }

    info!("Encoding categorical columns: {:?}", present);

    let mut encoder = Encoder::new();
    let train = encoder.fit_transform(x_train, &present)?;
    let test = encoder.transform(x_test)?;

    Ok((train, test, Some(encoder)))
}
