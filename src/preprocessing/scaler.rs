//! Feature scaling

use crate::error::{MaintenanceError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    #[default]
    Standard,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    center: f64, // mean
    scale: f64,  // population std, 1.0 when constant
}

/// Feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler on every column of `df`
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.params.clear();

        for column in df.get_columns() {
            let series = column.as_materialized_series().cast(&DataType::Float64)?;
            let params = self.compute_params(&series)?;
            self.params.push(params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    ///
    /// Every column comes back as `Float64`; fitted columns are scaled with the
    /// stored parameters, anything else is only cast.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(MaintenanceError::ModelNotFitted);
        }

        if let Some(missing) = self
            .params
            .iter()
            .find(|p| df.column(&p.column).is_err())
        {
            return Err(MaintenanceError::FeatureNotFound(missing.column.clone()));
        }

        let columns: Vec<Column> = df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series().cast(&DataType::Float64)?;
                match self.params.iter().find(|p| p.column == series.name().as_str()) {
                    Some(params) => Ok(self.scale_series(&series, params)?.into_column()),
                    None => Ok(series.into_column()),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn compute_params(&self, series: &Series) -> Result<ScalerParams> {
        let ca = series.f64()?;

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(1.0);
                Ok(ScalerParams {
                    column: series.name().to_string(),
                    center: mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                })
            }
        }
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series.f64()?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.center) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

/// Standardize features, fitting on the training partition only
pub fn fit_scale(
    x_train: &DataFrame,
    x_test: &DataFrame,
    scaler_type: ScalerType,
) -> Result<(DataFrame, DataFrame, Scaler)> {
    let mut scaler = Scaler::new(scaler_type);
    let train = scaler.fit_transform(x_train)?;
    let test = scaler.transform(x_test)?;
    Ok((train, test, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn test_standard_scaler() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), &[1.0, 2.0, 3.0, 4.0, 5.0]).into(),
        ])
        .unwrap();

        let mut scaler = Scaler::new(ScalerType::Standard);
        let result = scaler.fit_transform(&df).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        assert!(col.mean().unwrap().abs() < 1e-10);
        assert!((col.std(0).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_test_partition_uses_train_params() {
        let train = df!("a" => &[0.0, 2.0, 4.0]).unwrap();
        let test = df!("a" => &[2.0, 6.0]).unwrap();

        let (_, test_scaled, _) = fit_scale(&train, &test, ScalerType::Standard).unwrap();

        // train mean 2, population std sqrt(8/3)
        let std = (8.0f64 / 3.0).sqrt();
        let values = column_values(&test_scaled, "a");
        assert!(values[0].abs() < 1e-10);
        assert!((values[1] - 4.0 / std).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_and_int_cast() {
        let df = df!("c" => &[3i64, 3, 3], "x" => &[1i64, 2, 3]).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        let result = scaler.fit_transform(&df).unwrap();

        assert_eq!(result.column("c").unwrap().dtype(), &DataType::Float64);
        assert_eq!(column_values(&result, "c"), vec![0.0, 0.0, 0.0]);
        assert_eq!(result.get_column_names(), df.get_column_names());
    }

    #[test]
    fn test_missing_fitted_column() {
        let train = df!("a" => &[1.0, 2.0]).unwrap();
        let test = df!("b" => &[1.0]).unwrap();
        let err = fit_scale(&train, &test, ScalerType::Standard).unwrap_err();
        assert!(matches!(err, MaintenanceError::FeatureNotFound(_)));
    }
}
