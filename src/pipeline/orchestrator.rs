//! End-to-end preprocessing run

use super::PipelineConfig;
use crate::error::Result;
use crate::preprocessing::{
    binarize_target, clean, drop_columns, fit_encode, fit_scale, stratified_split, Encoder, Scaler,
};
use crate::synthetic::{balance, class_counts};
use crate::utils::{column_names, frame_to_array2};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::time::Instant;
use tracing::info;

/// Model-ready partitions plus the transformers fitted on the training rows
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Array1<i64>,
    pub y_test: Array1<i64>,
    /// `None` when no categorical column was present
    pub encoder: Option<Encoder>,
    /// `None` when scaling is disabled
    pub scaler: Option<Scaler>,
}

impl PipelineOutput {
    pub fn train_matrix(&self) -> Result<Array2<f64>> {
        frame_to_array2(&self.x_train)
    }

    pub fn test_matrix(&self) -> Result<Array2<f64>> {
        frame_to_array2(&self.x_test)
    }

    pub fn feature_names(&self) -> Vec<String> {
        column_names(&self.x_train)
    }
}

/// Run the preprocessing stages on a raw table.
///
/// Stages run in a fixed order: clean, drop identifiers, binarize target,
/// stratified split, one-hot encode, balance, scale. Encoding, balancing and
/// scaling only ever fit on the training partition.
pub fn run_pipeline(df: &DataFrame, config: &PipelineConfig) -> Result<PipelineOutput> {
    let start = Instant::now();
    info!("Running pipeline on {} rows x {} columns", df.height(), df.width());

    let df = clean(df)?;

    let df = drop_columns(&df, &config.drop_cols)?;
    info!("Dropped identifier columns {:?}", config.drop_cols);

    let df = binarize_target(&df, &config.target_col, &config.negative_label)?;

    let (x_train, x_test, y_train, y_test) = stratified_split(
        &df,
        &config.target_col,
        config.split.test_size,
        config.split.seed,
    )?;
    info!(
        "Split: {} train / {} test rows, train classes {:?}",
        x_train.height(),
        x_test.height(),
        class_counts(&y_train)
    );

    let (x_train, x_test, encoder) = fit_encode(&x_train, &x_test, &config.categorical_cols)?;

    let (x_train, y_train) = if config.balancing.enabled {
        balance(&x_train, &y_train, &config.balancing.method)?
    } else {
        info!("Balancing disabled");
        (x_train, y_train)
    };

    let (x_train, x_test, scaler) = if config.scaling.enabled {
        let (train, test, scaler) = fit_scale(&x_train, &x_test, config.scaling.scaler)?;
        info!("Scaled {} features ({:?})", train.width(), config.scaling.scaler);
        (train, test, Some(scaler))
    } else {
        info!("Scaling disabled");
        (x_train, x_test, None)
    };

    info!(
        "Pipeline finished in {:.2?}: x_train {:?}, x_test {:?}",
        start.elapsed(),
        x_train.shape(),
        x_test.shape()
    );

    Ok(PipelineOutput {
        x_train,
        x_test,
        y_train,
        y_test,
        encoder,
        scaler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaintenanceError;

    fn raw_frame() -> DataFrame {
        df!(
            "UDI" => &[1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20],
            "Product ID" => &["M1", "L2", "L3", "L4", "M5", "M6", "H7", "L8", "L9", "M10",
                              "L11", "H12", "L13", "M14", "L15", "L16", "M17", "H18", "L19", "L20"],
            "Type" => &["M", "L", "L", "L", "M", "M", "H", "L", "L", "M",
                        "L", "H", "L", "M", "L", "L", "M", "H", "L", "L"],
            "Torque [Nm]" => &[42.8, 46.3, 49.4, 39.5, 40.0, 41.9, 42.4, 40.2, 28.6, 28.0,
                               33.4, 39.1, 38.7, 45.0, 36.2, 44.1, 65.2, 68.0, 70.3, 66.1],
            "Tool wear [min]" => &[0i64, 3, 5, 7, 9, 11, 14, 16, 18, 21,
                                   24, 29, 34, 37, 40, 42, 200, 210, 215, 230],
            "Failure Type" => &["No Failure", "No Failure", "No Failure", "No Failure", "No Failure",
                                "No Failure", "No Failure", "No Failure", "No Failure", "No Failure",
                                "No Failure", "No Failure", "No Failure", "No Failure", "No Failure",
                                "No Failure", "Power Failure", "Tool Wear Failure",
                                "Power Failure", "Overstrain Failure"],
        )
        .unwrap()
    }

    #[test]
    fn test_default_run() {
        let output = run_pipeline(&raw_frame(), &PipelineConfig::default()).unwrap();

        // 20 rows, 4 test rows: 3 negatives + 1 positive
        assert_eq!(output.x_test.height(), 4);
        assert_eq!(output.y_test.len(), 4);
        assert_eq!(output.y_test.iter().filter(|&&v| v == 1).count(), 1);

        // 13 negatives vs 3 positives, oversampled to 13 / 13
        let counts = class_counts(&output.y_train);
        assert_eq!(counts.get(&0), Some(&13));
        assert_eq!(counts.get(&1), Some(&13));
        assert_eq!(output.x_train.height(), 26);

        let names = output.feature_names();
        assert!(!names.iter().any(|n| n == "UDI" || n == "Product ID" || n == "Type"));
        assert!(!names.iter().any(|n| n == "Failure Type"));
        assert!(names.iter().any(|n| n == "Type_L"));
        assert_eq!(output.x_test.get_column_names(), output.x_train.get_column_names());

        assert!(output.encoder.is_some());
        assert!(output.scaler.is_some());

        let x = output.train_matrix().unwrap();
        assert_eq!(x.dim(), (26, names.len()));
    }

    #[test]
    fn test_stages_can_be_disabled() {
        let config = PipelineConfig::default()
            .with_balancing(false)
            .with_scaling(false);
        let output = run_pipeline(&raw_frame(), &config).unwrap();

        assert_eq!(output.x_train.height(), 16);
        assert!(output.scaler.is_none());

        // Unscaled tool wear keeps its raw values
        let wear = output.x_train.column("Tool wear [min]").unwrap();
        let max = wear.as_materialized_series().cast(&DataType::Float64).unwrap();
        assert!(max.f64().unwrap().max().unwrap() >= 200.0);
    }

    #[test]
    fn test_deterministic() {
        let config = PipelineConfig::default();
        let a = run_pipeline(&raw_frame(), &config).unwrap();
        let b = run_pipeline(&raw_frame(), &config).unwrap();

        assert_eq!(a.y_train, b.y_train);
        assert_eq!(a.train_matrix().unwrap(), b.train_matrix().unwrap());
        assert_eq!(a.test_matrix().unwrap(), b.test_matrix().unwrap());
    }

    #[test]
    fn test_missing_target() {
        let config = PipelineConfig::default().with_target_col("Machine failure");
        let err = run_pipeline(&raw_frame(), &config).unwrap_err();
        assert!(matches!(err, MaintenanceError::FeatureNotFound(_)));
    }
}
