//! Training and evaluation

use super::factory::Classifier;
use super::metrics::{ClassificationReport, ConfusionMatrix};
use crate::error::{MaintenanceError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Outcome of scoring a model on held-out data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
}

fn check_rows(x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(MaintenanceError::ShapeError {
            expected: format!("{} labels (one per row)", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }
    Ok(())
}

/// Fit `model` in place and hand the same handle back
pub fn train<'a>(
    model: &'a mut Classifier,
    x_train: &Array2<f64>,
    y_train: &Array1<i64>,
) -> Result<&'a mut Classifier> {
    check_rows(x_train, y_train)?;

    let start = Instant::now();
    model.fit(x_train, y_train)?;

    info!(
        "Trained {} on {} rows x {} features in {:.3}s",
        model.model_type(),
        x_train.nrows(),
        x_train.ncols(),
        start.elapsed().as_secs_f64()
    );

    Ok(model)
}

/// Score a fitted model on held-out data. The model is not modified.
pub fn evaluate(model: &Classifier, x_test: &Array2<f64>, y_test: &Array1<i64>) -> Result<Evaluation> {
    check_rows(x_test, y_test)?;

    if !model.is_fitted() {
        return Err(MaintenanceError::ModelNotFitted);
    }

    let y_pred = model.predict(x_test)?;
    let confusion_matrix = ConfusionMatrix::from_predictions(y_test, &y_pred)?;
    let report = ClassificationReport::from_confusion_matrix(&confusion_matrix);

    info!(
        "Evaluated {} on {} rows: accuracy {:.4}",
        model.model_type(),
        y_test.len(),
        report.accuracy
    );

    Ok(Evaluation {
        report,
        confusion_matrix,
    })
}
